// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Level type for brightness and position control.
//!
//! This module provides a type-safe representation of raw device levels,
//! ensuring values are always within the valid range of 0-254.

use std::fmt;

use crate::error::ValueError;

/// Raw device level (0-254).
///
/// Levels travel on the 0-254 scale used by the host framework's level
/// control; 0 is off/closed and 254 is full brightness/open. The template
/// engine derives percentages and hex encodings from this value.
///
/// # Examples
///
/// ```
/// use hookbridge_lib::types::Level;
///
/// let level = Level::new(127).unwrap();
/// assert_eq!(level.value(), 127);
/// assert_eq!(level.percent(), 50);
///
/// // Invalid values return error
/// assert!(Level::new(255).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Level(u8);

impl Level {
    /// Minimum level (off).
    pub const MIN: Self = Self(0);

    /// Maximum level (full).
    pub const MAX: Self = Self(254);

    /// Creates a new level value.
    ///
    /// # Arguments
    ///
    /// * `value` - The raw level (0-254)
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 254.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > 254 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 254,
                actual: u16::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a level, clamping to the valid range.
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value > 254 { Self(254) } else { Self(value) }
    }

    /// Returns the raw level value (0-254).
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the level as a whole percentage (0-100), rounded.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percent(&self) -> u8 {
        (f64::from(self.0) / 254.0 * 100.0).round() as u8
    }

    /// Returns the level as a decimal fraction string with two decimals
    /// (e.g. `"0.50"` for level 127).
    #[must_use]
    pub fn decimal_percent(&self) -> String {
        format!("{:.2}", f64::from(self.0) / 254.0)
    }

    /// Returns the percentage as two-digit lowercase hex.
    #[must_use]
    pub fn percent_hex(&self) -> String {
        format!("{:02x}", self.percent())
    }

    /// Returns the raw byte as two-digit lowercase hex.
    #[must_use]
    pub fn byte_hex(&self) -> String {
        format!("{:02x}", self.0)
    }

    /// Creates a level from a whole percentage (0-100), rounding to the
    /// nearest byte.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if percent exceeds 100.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_percent(percent: u8) -> Result<Self, ValueError> {
        if percent > 100 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: u16::from(percent),
            });
        }
        Ok(Self((f64::from(percent) / 100.0 * 254.0).round() as u8))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/254", self.0)
    }
}

impl TryFrom<u8> for Level {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
