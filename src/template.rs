// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placeholder substitution for endpoint URLs and parameters.
//!
//! Endpoint templates may embed `${...}` placeholders for the current and
//! previous device level, the commanded color, and the current time. The
//! dispatcher renders them in a fixed order (level, then time, then color)
//! so a value produced by one pass is never re-substituted by an earlier
//! one.
//!
//! All placeholders are fixed literals replaced with sequential
//! replace-all passes; anything that does not match is left verbatim, so
//! malformed placeholder syntax is never an error.
//!
//! # Level placeholders
//!
//! Both the `level.` and `intensity.` prefixes are accepted:
//!
//! - `${level.percent}` - whole percentage (0-100) of the current level
//! - `${level.decimal_percent}` - current level / 254 with two decimals
//! - `${level.byte}` - raw current level (0-254)
//! - `${level.percent.hex}` / `${level.byte.hex}` - two-digit lowercase hex
//! - `${level.previous_percent}`, `${level.previous_decimal_percent}`,
//!   `${level.previous_byte}`, `${level.previous_byte.hex}` - the same
//!   derivations of the stored previous level
//! - `${level.math(op)}` / `${level.math(op).hex}` - op in floor, ceil,
//!   round, abs, sqrt, applied to the raw current level
//! - `${brightness}` - alias for `${level.percent}`
//!
//! # Color placeholders
//!
//! - `${color.r}` / `${color.g}` / `${color.b}` - decimal RGB channels
//! - `${color.rx}` / `${color.gx}` / `${color.bx}` - two-digit hex channels
//! - `${color.rgbx}` - six-digit hex
//! - `${color.hsb}` - literal `"h,s,b"`
//! - `${color.h}` / `${color.s}` - raw hue and saturation inputs
//!
//! # Time placeholders
//!
//! - `${time.millis}` - epoch milliseconds at render time

use crate::types::{Level, rgb_from_hsv};

/// Color values accompanying a command, as raw numbers.
///
/// The host hands hue in degrees (0-360) and saturation/brightness as
/// percentages (0-100). A component the command did not carry is the -1
/// sentinel; color substitution only runs at all when at least one
/// component was supplied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorContext {
    /// Hue in degrees.
    pub hue: f64,
    /// Saturation percentage.
    pub saturation: f64,
    /// Brightness percentage.
    pub brightness: f64,
}

impl ColorContext {
    /// Builds a context from optional components.
    ///
    /// Returns `None` when no component was supplied, which suppresses the
    /// color substitution pass entirely. Missing components default to -1.
    #[must_use]
    pub fn from_parts(
        hue: Option<f64>,
        saturation: Option<f64>,
        brightness: Option<f64>,
    ) -> Option<Self> {
        if hue.is_none() && saturation.is_none() && brightness.is_none() {
            return None;
        }
        Some(Self {
            hue: hue.unwrap_or(-1.0),
            saturation: saturation.unwrap_or(-1.0),
            brightness: brightness.unwrap_or(-1.0),
        })
    }
}

/// Formats a float the way the configuration language expects: integral
/// values without a trailing fraction, everything else as the shortest
/// round-trip representation.
fn fmt_number(value: f64) -> String {
    #[allow(clippy::cast_possible_truncation)]
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Replaces a placeholder under both the `level.` and `intensity.` prefixes.
fn replace_both_prefixes(text: &str, suffix: &str, value: &str) -> String {
    text.replace(&format!("${{level.{suffix}}}"), value)
        .replace(&format!("${{intensity.{suffix}}}"), value)
}

/// Substitutes level placeholders in `text`.
///
/// `current` is the level being applied by the command in flight;
/// `previous` is the last level the device accepted before it.
#[must_use]
pub fn render_level(text: &str, current: Level, previous: Level) -> String {
    let mut result = text.to_string();

    let percent = current.percent().to_string();
    result = replace_both_prefixes(&result, "percent", &percent);
    result = result.replace("${brightness}", &percent);
    result = replace_both_prefixes(&result, "decimal_percent", &current.decimal_percent());
    result = replace_both_prefixes(&result, "byte", &current.value().to_string());
    result = replace_both_prefixes(&result, "percent.hex", &current.percent_hex());
    result = replace_both_prefixes(&result, "byte.hex", &current.byte_hex());

    result = replace_both_prefixes(&result, "previous_percent", &previous.percent().to_string());
    result = replace_both_prefixes(
        &result,
        "previous_decimal_percent",
        &previous.decimal_percent(),
    );
    result = replace_both_prefixes(&result, "previous_byte", &previous.value().to_string());
    result = replace_both_prefixes(&result, "previous_byte.hex", &previous.byte_hex());

    // Math functions operate on the raw level, not the percentage
    let raw = f64::from(current.value());
    for (op, value) in [
        ("floor", raw.floor()),
        ("ceil", raw.ceil()),
        ("round", raw.round()),
        ("abs", raw.abs()),
        ("sqrt", raw.sqrt()),
    ] {
        result = replace_both_prefixes(&result, &format!("math({op})"), &fmt_number(value));
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let hex = format!("{:02x}", value.round() as u64);
        result = replace_both_prefixes(&result, &format!("math({op}).hex"), &hex);
    }

    result
}

/// Substitutes color placeholders in `text`.
#[must_use]
pub fn render_color(text: &str, color: &ColorContext) -> String {
    let rgb = rgb_from_hsv(color.hue, color.saturation / 100.0, color.brightness / 100.0);

    let hsb = format!(
        "{},{},{}",
        fmt_number(color.hue),
        fmt_number(color.saturation),
        fmt_number(color.brightness)
    );

    text.replace("${color.r}", &rgb.r.to_string())
        .replace("${color.g}", &rgb.g.to_string())
        .replace("${color.b}", &rgb.b.to_string())
        .replace("${color.rx}", &format!("{:02x}", rgb.r))
        .replace("${color.gx}", &format!("{:02x}", rgb.g))
        .replace("${color.bx}", &format!("{:02x}", rgb.b))
        .replace("${color.rgbx}", &rgb.to_hex())
        .replace("${color.hsb}", &hsb)
        .replace("${color.h}", &fmt_number(color.hue))
        .replace("${color.s}", &fmt_number(color.saturation))
}

/// Substitutes time placeholders in `text`.
#[must_use]
pub fn render_time(text: &str) -> String {
    text.replace(
        "${time.millis}",
        &chrono::Utc::now().timestamp_millis().to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(v: u8) -> Level {
        Level::new(v).unwrap()
    }

    #[test]
    fn percent_placeholder() {
        let out = render_level("http://h/set?b=${level.percent}", level(127), level(0));
        assert_eq!(out, "http://h/set?b=50");
    }

    #[test]
    fn intensity_prefix_is_equivalent() {
        let a = render_level("v=${level.byte}", level(200), level(0));
        let b = render_level("v=${intensity.byte}", level(200), level(0));
        assert_eq!(a, b);
    }

    #[test]
    fn brightness_alias() {
        let out = render_level("b=${brightness}", level(254), level(0));
        assert_eq!(out, "b=100");
    }

    #[test]
    fn decimal_percent_placeholder() {
        let out = render_level("f=${level.decimal_percent}", level(127), level(0));
        assert_eq!(out, "f=0.50");
    }

    #[test]
    fn hex_placeholders() {
        let out = render_level(
            "p=${level.percent.hex}&b=${level.byte.hex}",
            level(127),
            level(0),
        );
        assert_eq!(out, "p=32&b=7f");
    }

    #[test]
    fn hex_matches_percent_for_all_levels() {
        for v in 0..=254u8 {
            let out = render_level("${level.percent.hex}", level(v), level(0));
            assert_eq!(out, format!("{:02x}", level(v).percent()));
        }
    }

    #[test]
    fn previous_placeholders() {
        let out = render_level(
            "p=${level.previous_percent}&d=${level.previous_decimal_percent}&b=${level.previous_byte}&h=${level.previous_byte.hex}",
            level(0),
            level(127),
        );
        assert_eq!(out, "p=50&d=0.50&b=127&h=7f");
    }

    #[test]
    fn math_placeholders_on_raw_level() {
        let out = render_level("v=${level.math(floor)}", level(127), level(0));
        assert_eq!(out, "v=127");

        let out = render_level("v=${level.math(sqrt)}", level(100), level(0));
        assert_eq!(out, "v=10");

        // Non-integral sqrt keeps its fraction
        let out = render_level("v=${level.math(sqrt)}", level(2), level(0));
        assert!(out.starts_with("v=1.41421"));
    }

    #[test]
    fn math_hex_rounds_before_encoding() {
        // sqrt(127) = 11.269..., rounds to 11 = 0x0b
        let out = render_level("v=${level.math(sqrt).hex}", level(127), level(0));
        assert_eq!(out, "v=0b");
    }

    #[test]
    fn unrecognized_placeholders_pass_through() {
        let out = render_level("v=${level.bogus}&w=${unknown}", level(10), level(0));
        assert_eq!(out, "v=${level.bogus}&w=${unknown}");
    }

    #[test]
    fn color_channel_placeholders() {
        let ctx = ColorContext {
            hue: 0.0,
            saturation: 100.0,
            brightness: 100.0,
        };
        let out = render_color("r=${color.r}&g=${color.g}&b=${color.b}", &ctx);
        assert_eq!(out, "r=255&g=0&b=0");
    }

    #[test]
    fn color_hex_placeholders() {
        let ctx = ColorContext {
            hue: 120.0,
            saturation: 100.0,
            brightness: 100.0,
        };
        let out = render_color("${color.rx}${color.gx}${color.bx}|${color.rgbx}", &ctx);
        assert_eq!(out, "00ff00|00ff00");
    }

    #[test]
    fn color_hsb_and_raw_inputs() {
        let ctx = ColorContext {
            hue: 240.0,
            saturation: 50.0,
            brightness: 75.0,
        };
        let out = render_color("${color.hsb}|${color.h}|${color.s}", &ctx);
        assert_eq!(out, "240,50,75|240|50");
    }

    #[test]
    fn color_context_missing_components_default_to_sentinel() {
        let ctx = ColorContext::from_parts(Some(120.0), None, None).unwrap();
        assert_eq!(ctx.saturation, -1.0);
        assert_eq!(ctx.brightness, -1.0);

        assert!(ColorContext::from_parts(None, None, None).is_none());
    }

    #[test]
    fn time_millis_renders_a_timestamp() {
        let out = render_time("t=${time.millis}");
        let digits = out.strip_prefix("t=").unwrap();
        assert!(digits.len() >= 13);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn composition_order_is_stable() {
        // A level-produced value must not be consumed by a later pass
        let ctx = ColorContext {
            hue: 0.0,
            saturation: 0.0,
            brightness: 100.0,
        };
        let step1 = render_level("${level.percent}/${color.rgbx}", level(254), level(0));
        let step2 = render_time(&step1);
        let step3 = render_color(&step2, &ctx);
        assert_eq!(step3, "100/ffffff");
    }
}
