// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types used across the webhook engine.

mod color;
mod level;

pub use color::{HsbColor, Rgb};
pub use level::Level;

pub(crate) use color::rgb_from_hsv;
