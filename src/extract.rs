// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Path extraction from decoded JSON poll responses.
//!
//! A poll path expression is a dot-separated list of segments, each
//! optionally carrying a bracketed non-negative index, e.g.
//! `data.values[0].temp`. There is no wildcard or slicing support; a path
//! addresses exactly one value.

use serde_json::Value;

/// Resolves `path` against `value`, returning the addressed value.
///
/// Traversal walks segments left to right. A missing field, an
/// out-of-range index, a null along the way, or an empty path all yield
/// `None`; extraction never fails with an error.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use hookbridge_lib::extract::extract;
///
/// let data = json!({"a": {"b": [{"c": 5}]}});
/// assert_eq!(extract(&data, "a.b[0].c"), Some(&json!(5)));
/// assert_eq!(extract(&data, "a.x"), None);
/// ```
#[must_use]
pub fn extract<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() || value.is_null() {
        return None;
    }

    let mut current = value;
    for segment in path.split('.') {
        if current.is_null() {
            return None;
        }

        match split_index(segment) {
            Some((field, index)) => {
                current = current.get(field)?;
                if current.is_null() {
                    return None;
                }
                current = current.get(index)?;
            }
            None => {
                current = current.get(segment)?;
            }
        }
    }

    if current.is_null() { None } else { Some(current) }
}

/// Splits a segment of the form `name[index]` into its parts.
///
/// Returns `None` when the segment carries no well-formed index suffix, in
/// which case the whole segment is treated as a field name.
fn split_index(segment: &str) -> Option<(&str, usize)> {
    let rest = segment.strip_suffix(']')?;
    let (field, digits) = rest.split_once('[')?;
    if field.is_empty() || digits.is_empty() {
        return None;
    }
    let index = digits.parse::<usize>().ok()?;
    Some((field, index))
}
