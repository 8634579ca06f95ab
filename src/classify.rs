// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device type taxonomy and classification.
//!
//! An externally described device (name, declared type, capability flags)
//! is mapped onto one tag of a closed taxonomy. The same cascade serves
//! live configuration loading and the offline migration converter, so both
//! stay behaviorally consistent.

use serde::{Deserialize, Serialize};

use crate::config::CommandSlot;

/// The closed set of supported virtual device types.
///
/// The type determines which command slots are meaningful for a device and
/// which polling-to-attribute conversion applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    /// On/off outlet.
    Outlet,
    /// On/off switch.
    Switch,
    /// One-shot scene trigger.
    Scene,
    /// On/off light.
    Light,
    /// Light with brightness control.
    DimmableLight,
    /// Light with brightness and color temperature control.
    ColorTemperatureLight,
    /// Light with brightness, color and color temperature control.
    ExtendedColorLight,
    /// Open/closed contact sensor.
    ContactSensor,
    /// Occupancy sensor.
    MotionSensor,
    /// Light level sensor.
    IlluminanceSensor,
    /// Temperature sensor.
    TemperatureSensor,
    /// Relative humidity sensor.
    HumiditySensor,
    /// Barometric pressure sensor.
    PressureSensor,
    /// Combined temperature/humidity/pressure sensor.
    ClimateSensor,
    /// Cover with lift control.
    CoverLift,
    /// Cover with lift and tilt control.
    CoverLiftTilt,
    /// Door lock.
    DoorLock,
    /// Thermostat with heating and cooling setpoints.
    ThermostatAuto,
    /// Heating-only thermostat.
    ThermostatHeat,
    /// Cooling-only thermostat.
    ThermostatCool,
    /// Generic mode selector.
    ModeSelect,
    /// Wall-mounted on/off switch.
    OnOffMountedSwitch,
    /// Wall-mounted dimmer switch.
    DimmerMountedSwitch,
}

/// Polling-to-attribute conversion applied to values extracted from a poll
/// response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollConversion {
    /// Boolean contact state.
    Contact,
    /// Boolean occupancy state.
    Motion,
    /// Lux reading, encoded as `10000 * log10(lux)`.
    Illuminance,
    /// Degrees Celsius, scaled by 100.
    Temperature,
    /// Relative humidity percentage, scaled by 100.
    Humidity,
    /// Pressure, scaled by 10.
    Pressure,
    /// Combined temperature/humidity/pressure object.
    Climate,
    /// No poll conversion for this device type.
    None,
}

impl DeviceType {
    /// Returns the command slots applicable to this device type.
    #[must_use]
    pub fn supported_slots(&self) -> &'static [CommandSlot] {
        use CommandSlot as S;
        match self {
            Self::Outlet | Self::Switch | Self::Light | Self::OnOffMountedSwitch => {
                &[S::On, S::Off]
            }
            Self::Scene => &[S::On],
            Self::DimmableLight | Self::DimmerMountedSwitch => &[S::On, S::Off, S::Brightness],
            Self::ColorTemperatureLight => &[S::On, S::Off, S::Brightness, S::ColorTemperature],
            Self::ExtendedColorLight => &[
                S::On,
                S::Off,
                S::Brightness,
                S::ColorTemperature,
                S::ColorHue,
                S::ColorSaturation,
            ],
            Self::ContactSensor
            | Self::MotionSensor
            | Self::IlluminanceSensor
            | Self::TemperatureSensor
            | Self::HumiditySensor
            | Self::PressureSensor
            | Self::ClimateSensor => &[S::PollState],
            Self::CoverLift => &[S::CoverPosition],
            Self::CoverLiftTilt => &[S::CoverPosition, S::CoverTilt],
            Self::DoorLock => &[S::Lock, S::Unlock],
            Self::ThermostatAuto => &[S::SetHeatingPoint, S::SetCoolingPoint, S::SetMode],
            Self::ThermostatHeat => &[S::SetHeatingPoint, S::SetMode],
            Self::ThermostatCool => &[S::SetCoolingPoint, S::SetMode],
            Self::ModeSelect => &[S::SetModeValue],
        }
    }

    /// Returns the poll conversion applied to extracted values.
    #[must_use]
    pub fn poll_conversion(&self) -> PollConversion {
        match self {
            Self::ContactSensor => PollConversion::Contact,
            Self::MotionSensor => PollConversion::Motion,
            Self::IlluminanceSensor => PollConversion::Illuminance,
            Self::TemperatureSensor => PollConversion::Temperature,
            Self::HumiditySensor => PollConversion::Humidity,
            Self::PressureSensor => PollConversion::Pressure,
            Self::ClimateSensor => PollConversion::Climate,
            _ => PollConversion::None,
        }
    }

    /// Returns true for the color-capable light types.
    #[must_use]
    pub fn has_color(&self) -> bool {
        matches!(self, Self::ExtendedColorLight | Self::ColorTemperatureLight)
    }

    /// Returns true for the cover types.
    #[must_use]
    pub fn is_cover(&self) -> bool {
        matches!(self, Self::CoverLift | Self::CoverLiftTilt)
    }
}

/// An externally supplied description of a device to classify.
///
/// Immutable input to [`classify`]; typically distilled from a legacy
/// configuration record.
#[derive(Debug, Clone, Default)]
pub struct DeviceDescriptor {
    /// Human-chosen device name.
    pub name: String,
    /// Declared type string, if the source provides one.
    pub declared_type: Option<String>,
    /// Whether the device exposes a dimming/position action.
    pub has_dimming: bool,
    /// Whether the device exposes a color action.
    pub has_color: bool,
    /// Free-form auxiliary identifier (e.g. a map id) that may carry
    /// position hints.
    pub map_id: Option<String>,
}

/// Name fragments that mark a scene trigger.
const SCENE_HINTS: &[&str] = &["scene", "scena"];

/// Name fragments that mark a vacuum; vacuums get on/off-only control.
const VACUUM_HINTS: &[&str] = &["vacuum", "deebot"];

/// Name fragments that mark a cover, blind or curtain.
const COVER_HINTS: &[&str] = &[
    "blind",
    "cover",
    "curtain",
    "shutter",
    "tapparella",
    "tenda",
    "tende",
    "lamelle",
];

/// Name fragments that mark an outlet.
const OUTLET_HINTS: &[&str] = &["outlet", "plug", "presa"];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Classifies a device descriptor into the supported taxonomy.
///
/// Deterministic ordered cascade, first match wins. Name-based hints take
/// priority over declared-type fields: legacy data sources frequently
/// mis-tag the device type but encode true intent in human-chosen names.
#[must_use]
pub fn classify(descriptor: &DeviceDescriptor) -> DeviceType {
    let name = descriptor.name.to_lowercase();

    if contains_any(&name, SCENE_HINTS) {
        return DeviceType::Scene;
    }
    if contains_any(&name, VACUUM_HINTS) {
        return DeviceType::Switch;
    }
    if contains_any(&name, COVER_HINTS) {
        return DeviceType::CoverLift;
    }
    if contains_any(&name, OUTLET_HINTS) {
        return DeviceType::Outlet;
    }

    let declared = descriptor.declared_type.as_deref().unwrap_or("");

    if declared == "scene" {
        return DeviceType::Scene;
    }

    if descriptor.has_color {
        return DeviceType::ExtendedColorLight;
    }

    if descriptor.has_dimming {
        // Could be a dimmer, a blind, or a light; the auxiliary identifier
        // disambiguates
        if descriptor
            .map_id
            .as_deref()
            .is_some_and(|m| contains_any(m, &["position", "blind", "cover"]))
        {
            return DeviceType::CoverLift;
        }
        return DeviceType::DimmableLight;
    }

    match declared {
        "switch" => DeviceType::Switch,
        "outlet" => DeviceType::Outlet,
        "light" => DeviceType::Light,
        "dimmer" => DeviceType::DimmableLight,
        "cover" | "blind" => DeviceType::CoverLift,
        "lock" => DeviceType::DoorLock,
        "thermostat" => DeviceType::ThermostatAuto,
        _ => DeviceType::Switch,
    }
}
