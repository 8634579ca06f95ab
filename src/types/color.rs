// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Color types for light control.
//!
//! This module provides the HSB color triple used by color-capable webhook
//! devices and its conversion to RGB for placeholder rendering.

use std::fmt;

use crate::error::ValueError;

/// HSB color representation (Hue, Saturation, Brightness).
///
/// Hue is in degrees (0-360), saturation and brightness are percentages
/// (0-100).
///
/// # Examples
///
/// ```
/// use hookbridge_lib::types::HsbColor;
///
/// let red = HsbColor::new(0, 100, 100).unwrap();
/// assert_eq!(red.to_rgb(), hookbridge_lib::types::Rgb::new(255, 0, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HsbColor {
    hue: u16,
    saturation: u8,
    brightness: u8,
}

impl HsbColor {
    /// Maximum hue value (wraps at 360).
    pub const MAX_HUE: u16 = 360;

    /// Maximum saturation value.
    pub const MAX_SATURATION: u8 = 100;

    /// Maximum brightness value.
    pub const MAX_BRIGHTNESS: u8 = 100;

    /// Creates a new HSB color.
    ///
    /// # Arguments
    ///
    /// * `hue` - Color hue (0-360 degrees, where 0/360 is red)
    /// * `saturation` - Color saturation (0-100%)
    /// * `brightness` - Color brightness (0-100%)
    ///
    /// # Errors
    ///
    /// Returns error if any value is outside its valid range.
    pub fn new(hue: u16, saturation: u8, brightness: u8) -> Result<Self, ValueError> {
        if hue > Self::MAX_HUE {
            return Err(ValueError::InvalidHue(hue));
        }
        if saturation > Self::MAX_SATURATION {
            return Err(ValueError::InvalidSaturation(saturation));
        }
        if brightness > Self::MAX_BRIGHTNESS {
            return Err(ValueError::InvalidBrightness(brightness));
        }
        Ok(Self {
            hue,
            saturation,
            brightness,
        })
    }

    /// Returns the hue value (0-360).
    #[must_use]
    pub const fn hue(&self) -> u16 {
        self.hue
    }

    /// Returns the saturation value (0-100).
    #[must_use]
    pub const fn saturation(&self) -> u8 {
        self.saturation
    }

    /// Returns the brightness value (0-100).
    #[must_use]
    pub const fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Converts the color to RGB using the standard HSV sector algorithm.
    ///
    /// Chroma `c = v*s`, `x = c*(1 - |((h/60) mod 6) mod 2 - 1|)`,
    /// `m = v - c`; the 60-degree sector selects (r, g, b) before adding
    /// `m`. Channels are rounded and clamped to 0-255.
    #[must_use]
    pub fn to_rgb(&self) -> Rgb {
        rgb_from_hsv(
            f64::from(self.hue),
            f64::from(self.saturation) / 100.0,
            f64::from(self.brightness) / 100.0,
        )
    }
}

impl fmt::Display for HsbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HSB({}, {}%, {}%)",
            self.hue, self.saturation, self.brightness
        )
    }
}

/// An RGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel (0-255).
    pub r: u8,
    /// Green channel (0-255).
    pub g: u8,
    /// Blue channel (0-255).
    pub b: u8,
}

impl Rgb {
    /// Creates an RGB color from channel values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Returns the color as a six-digit lowercase hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// HSV to RGB conversion on raw floats.
///
/// Used by the template engine, which has to accept out-of-range sentinel
/// inputs; channel values are clamped so the output is always a valid RGB
/// triple.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn rgb_from_hsv(hue: f64, s: f64, v: f64) -> Rgb {
    let c = v * s;
    let hh = (hue / 60.0).rem_euclid(6.0);
    let x = c * (1.0 - ((hh % 2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if hh < 1.0 {
        (c, x, 0.0)
    } else if hh < 2.0 {
        (x, c, 0.0)
    } else if hh < 3.0 {
        (0.0, c, x)
    } else if hh < 4.0 {
        (0.0, x, c)
    } else if hh < 5.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    let channel = |f: f64| ((f + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb::new(channel(r), channel(g), channel(b))
}
