// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Webhook configuration model.
//!
//! Mirrors the persisted JSON configuration document: a device-name-keyed
//! map of per-device configuration, where each named command slot holds one
//! HTTP command or an ordered list of them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::classify::DeviceType;

/// HTTP methods supported by webhook commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HttpMethod {
    /// HTTP GET; parameters travel in the query string.
    #[default]
    #[serde(rename = "GET")]
    Get,
    /// HTTP POST; parameters travel in a JSON body.
    #[serde(rename = "POST")]
    Post,
    /// HTTP PUT; parameters travel in a JSON body.
    #[serde(rename = "PUT")]
    Put,
}

impl HttpMethod {
    /// Returns true for GET.
    #[must_use]
    pub fn is_get(&self) -> bool {
        matches!(self, Self::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        };
        f.write_str(s)
    }
}

/// A single HTTP command: method, URL template, optional static parameters.
///
/// The URL may contain `${...}` placeholders rendered at dispatch time and
/// `{key}` literals filled from the parameter set for POST/PUT requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpCommand {
    /// The HTTP method.
    #[serde(default)]
    pub method: HttpMethod,
    /// The URL template.
    pub url: String,
    /// Static parameters merged with the per-action parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
}

impl HttpCommand {
    /// Creates a command with no static parameters.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: None,
        }
    }
}

/// A command slot value: one command or an ordered list executed in
/// sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HttpEndpoint {
    /// A single command.
    Single(HttpCommand),
    /// An ordered list of commands.
    Sequence(Vec<HttpCommand>),
}

impl HttpEndpoint {
    /// Returns the commands in execution order.
    #[must_use]
    pub fn commands(&self) -> &[HttpCommand] {
        match self {
            Self::Single(command) => std::slice::from_ref(command),
            Self::Sequence(commands) => commands,
        }
    }

    /// Returns the first command, if any.
    #[must_use]
    pub fn first(&self) -> Option<&HttpCommand> {
        self.commands().first()
    }
}

impl From<HttpCommand> for HttpEndpoint {
    fn from(command: HttpCommand) -> Self {
        Self::Single(command)
    }
}

/// The closed set of named device actions a webhook can wire up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandSlot {
    /// Turn the device on.
    On,
    /// Turn the device off.
    Off,
    /// Set brightness (level 0-254).
    Brightness,
    /// Set color temperature (mireds).
    ColorTemperature,
    /// Set color hue (degrees).
    ColorHue,
    /// Set color saturation (percent).
    ColorSaturation,
    /// Move a cover to a lift position (percent).
    CoverPosition,
    /// Tilt a cover (percent).
    CoverTilt,
    /// Lock a door lock.
    Lock,
    /// Unlock a door lock.
    Unlock,
    /// Set the heating setpoint (degrees).
    SetHeatingPoint,
    /// Set the cooling setpoint (degrees).
    SetCoolingPoint,
    /// Set the thermostat mode.
    SetMode,
    /// Change a mode-select device's mode.
    SetModeValue,
    /// Read-only state poll endpoint.
    PollState,
}

impl CommandSlot {
    /// Returns the slot's configuration key.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Brightness => "brightness",
            Self::ColorTemperature => "colorTemperature",
            Self::ColorHue => "colorHue",
            Self::ColorSaturation => "colorSaturation",
            Self::CoverPosition => "coverPosition",
            Self::CoverTilt => "coverTilt",
            Self::Lock => "lock",
            Self::Unlock => "unlock",
            Self::SetHeatingPoint => "setHeatingPoint",
            Self::SetCoolingPoint => "setCoolingPoint",
            Self::SetMode => "setMode",
            Self::SetModeValue => "setModeValue",
            Self::PollState => "pollState",
        }
    }
}

impl fmt::Display for CommandSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selectable mode for mode-select devices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeOption {
    /// Human-readable label.
    pub label: String,
    /// Numeric mode value.
    pub mode: u8,
}

/// Per-device webhook configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    /// The virtual device type. Optional in the document only for legacy
    /// single-URL entries; normalized to `Some` at registry load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<DeviceType>,

    /// Stable unique identifier, carried over by the migration converter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,

    /// Turn-on endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<HttpEndpoint>,
    /// Turn-off endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub off: Option<HttpEndpoint>,
    /// Brightness endpoint for dimmable lights.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<HttpEndpoint>,
    /// Color temperature endpoint (mireds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_temperature: Option<HttpEndpoint>,
    /// Hue endpoint for color lights (0-360).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_hue: Option<HttpEndpoint>,
    /// Saturation endpoint for color lights (0-100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_saturation: Option<HttpEndpoint>,
    /// Cover lift position endpoint (0-100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_position: Option<HttpEndpoint>,
    /// Cover tilt endpoint (0-100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_tilt: Option<HttpEndpoint>,
    /// Lock endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock: Option<HttpEndpoint>,
    /// Unlock endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlock: Option<HttpEndpoint>,
    /// Heating setpoint endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_heating_point: Option<HttpEndpoint>,
    /// Cooling setpoint endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_cooling_point: Option<HttpEndpoint>,
    /// Thermostat mode endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_mode: Option<HttpEndpoint>,
    /// Mode-select endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_mode_value: Option<HttpEndpoint>,

    /// Read-only poll endpoint for sensors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_state: Option<HttpEndpoint>,
    /// Poll interval in seconds (default 60).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval: Option<u64>,
    /// Path expression extracting the value from the poll response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_template: Option<String>,

    /// Request timeout override in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Selectable modes for mode-select devices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modes: Option<Vec<ModeOption>>,

    /// Deprecated single-URL field from the legacy format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_url: Option<String>,
    /// Deprecated method field from the legacy format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
}

impl WebhookConfig {
    /// Returns the endpoint configured for a slot, if any.
    #[must_use]
    pub fn endpoint(&self, slot: CommandSlot) -> Option<&HttpEndpoint> {
        match slot {
            CommandSlot::On => self.on.as_ref(),
            CommandSlot::Off => self.off.as_ref(),
            CommandSlot::Brightness => self.brightness.as_ref(),
            CommandSlot::ColorTemperature => self.color_temperature.as_ref(),
            CommandSlot::ColorHue => self.color_hue.as_ref(),
            CommandSlot::ColorSaturation => self.color_saturation.as_ref(),
            CommandSlot::CoverPosition => self.cover_position.as_ref(),
            CommandSlot::CoverTilt => self.cover_tilt.as_ref(),
            CommandSlot::Lock => self.lock.as_ref(),
            CommandSlot::Unlock => self.unlock.as_ref(),
            CommandSlot::SetHeatingPoint => self.set_heating_point.as_ref(),
            CommandSlot::SetCoolingPoint => self.set_cooling_point.as_ref(),
            CommandSlot::SetMode => self.set_mode.as_ref(),
            CommandSlot::SetModeValue => self.set_mode_value.as_ref(),
            CommandSlot::PollState => self.poll_state.as_ref(),
        }
    }

    /// Sets the endpoint for a slot.
    pub fn set_endpoint(&mut self, slot: CommandSlot, endpoint: HttpEndpoint) {
        let field = match slot {
            CommandSlot::On => &mut self.on,
            CommandSlot::Off => &mut self.off,
            CommandSlot::Brightness => &mut self.brightness,
            CommandSlot::ColorTemperature => &mut self.color_temperature,
            CommandSlot::ColorHue => &mut self.color_hue,
            CommandSlot::ColorSaturation => &mut self.color_saturation,
            CommandSlot::CoverPosition => &mut self.cover_position,
            CommandSlot::CoverTilt => &mut self.cover_tilt,
            CommandSlot::Lock => &mut self.lock,
            CommandSlot::Unlock => &mut self.unlock,
            CommandSlot::SetHeatingPoint => &mut self.set_heating_point,
            CommandSlot::SetCoolingPoint => &mut self.set_cooling_point,
            CommandSlot::SetMode => &mut self.set_mode,
            CommandSlot::SetModeValue => &mut self.set_mode_value,
            CommandSlot::PollState => &mut self.poll_state,
        };
        *field = Some(endpoint);
    }
}

/// The persisted platform configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
    /// Platform name.
    #[serde(default)]
    pub name: String,
    /// Platform kind tag.
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Document version.
    #[serde(default)]
    pub version: String,
    /// Device names explicitly allowed (empty = all).
    #[serde(default)]
    pub white_list: Vec<String>,
    /// Device names explicitly excluded.
    #[serde(default)]
    pub black_list: Vec<String>,
    /// Default request timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Deprecated platform-wide device type used when upgrading legacy
    /// single-URL entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<DeviceType>,
    /// Device-name-keyed webhook map.
    #[serde(default)]
    pub webhooks: BTreeMap<String, WebhookConfig>,
}
