// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ha-bridge migration.
//!
//! Converts exported ha-bridge `device.db` records into a platform
//! configuration document. Conversion is best-effort per record: inactive
//! devices, devices without any actionable URL and records that fail to
//! parse are skipped, never fatal.

use serde::Deserialize;

use crate::classify::{self, DeviceDescriptor, DeviceType};
use crate::config::{CommandSlot, HttpCommand, HttpMethod, PlatformConfig, WebhookConfig};
use crate::registry::DEFAULT_TIMEOUT;

/// One raw device record from a ha-bridge `device.db` export.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyDevice {
    /// Device name; records without one fall back to `Device <id>`.
    #[serde(default)]
    pub name: Option<String>,
    /// Numeric record id, used only for the name fallback.
    #[serde(default)]
    pub id: Option<u64>,
    /// Inactive records are skipped.
    #[serde(default)]
    pub inactive: bool,
    /// Declared ha-bridge device type (`switch`, `dimmer`, ...).
    #[serde(default)]
    pub device_type: Option<String>,
    /// Turn-on URL list, stored as a JSON-encoded string.
    #[serde(default)]
    pub on_url: Option<String>,
    /// Turn-off URL list.
    #[serde(default)]
    pub off_url: Option<String>,
    /// Dimming URL list.
    #[serde(default)]
    pub dim_url: Option<String>,
    /// Color URL list.
    #[serde(default)]
    pub color_url: Option<String>,
    /// Backend mapping id, substituted into `${device.mapId}` placeholders.
    #[serde(default)]
    pub map_id: Option<String>,
    /// Stable ha-bridge identifier.
    #[serde(default, rename = "uniqueid")]
    pub unique_id: Option<String>,
}

impl LegacyDevice {
    fn display_name(&self) -> String {
        match (&self.name, self.id) {
            (Some(name), _) if !name.is_empty() => name.clone(),
            (_, Some(id)) => format!("Device {id}"),
            _ => "Device".to_string(),
        }
    }
}

/// The outcome of one migration run.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    /// The generated platform configuration.
    pub config: PlatformConfig,
    /// Records converted into webhooks.
    pub converted: usize,
    /// Records skipped (inactive, no URLs, or unparseable).
    pub skipped: usize,
}

/// Converts a list of ha-bridge records into a platform configuration.
///
/// Device types come from the same heuristic cascade used for live
/// configuration, fed with the record's name, declared type and URL
/// capabilities. One bad record skips that record only.
#[must_use]
pub fn convert(devices: &[LegacyDevice]) -> MigrationReport {
    let mut config = PlatformConfig {
        name: "hookbridge".to_string(),
        kind: "DynamicPlatform".to_string(),
        version: "1.0.0".to_string(),
        timeout: Some(u64::try_from(DEFAULT_TIMEOUT.as_millis()).unwrap_or(5000)),
        ..PlatformConfig::default()
    };

    let mut converted = 0;
    let mut skipped = 0;

    for device in devices {
        let name = device.display_name();

        if device.inactive {
            tracing::info!(%name, "Skipping inactive device");
            skipped += 1;
            continue;
        }

        let descriptor = DeviceDescriptor {
            name: name.clone(),
            declared_type: device.device_type.clone(),
            has_dimming: device.dim_url.is_some(),
            has_color: device.color_url.is_some(),
            map_id: device.map_id.clone(),
        };
        let device_type = classify::classify(&descriptor);

        let on_url = first_url(device.on_url.as_deref());
        let off_url = first_url(device.off_url.as_deref());
        let dim_url = first_url(device.dim_url.as_deref());
        let color_url = first_url(device.color_url.as_deref());

        // Color alone drives nothing without an on/off or dim action
        if on_url.is_none() && off_url.is_none() && dim_url.is_none() {
            tracing::info!(%name, "Skipping device without action URLs");
            skipped += 1;
            continue;
        }

        let mut webhook = WebhookConfig {
            device_type: Some(device_type),
            unique_id: Some(unique_id_for(device, &name)),
            ..WebhookConfig::default()
        };

        if let Some(url) = on_url {
            webhook.set_endpoint(CommandSlot::On, parse_endpoint(&url, device).into());
        }
        if let Some(url) = off_url {
            webhook.set_endpoint(CommandSlot::Off, parse_endpoint(&url, device).into());
        }
        if let Some(url) = dim_url {
            if device_type == DeviceType::DimmableLight {
                webhook.set_endpoint(CommandSlot::Brightness, parse_endpoint(&url, device).into());
            } else if device_type.is_cover() {
                webhook
                    .set_endpoint(CommandSlot::CoverPosition, parse_endpoint(&url, device).into());
            }
        }
        if let Some(url) = color_url
            && device_type.has_color()
        {
            webhook.set_endpoint(CommandSlot::ColorHue, parse_endpoint(&url, device).into());
        }

        tracing::info!(%name, ?device_type, "Converted device");
        config.webhooks.insert(name, webhook);
        converted += 1;
    }

    MigrationReport {
        config,
        converted,
        skipped,
    }
}

/// Derives the stable unique id for a record.
///
/// A ha-bridge `uniqueid` is carried over with its colons stripped under a
/// `habridge-` prefix; otherwise an id is hashed from the device name.
fn unique_id_for(device: &LegacyDevice, name: &str) -> String {
    match &device.unique_id {
        Some(id) if !id.is_empty() => format!("habridge-{}", id.replace(':', "")),
        _ => generate_unique_id(name),
    }
}

/// Generates a `webhook-` prefixed id from a rolling hash of the name.
///
/// The hash runs over UTF-16 code units with wrapping 32-bit arithmetic so
/// ids stay stable for names containing non-ASCII characters.
#[must_use]
pub fn generate_unique_id(name: &str) -> String {
    let mut hash: u32 = 0;
    for unit in name.encode_utf16() {
        hash = hash.wrapping_mul(31).wrapping_add(u32::from(unit));
    }
    format!("webhook-{hash:08x}")
}

/// Extracts the first URL from a ha-bridge URL list.
///
/// The list is a JSON-encoded string holding an array of objects whose
/// `item` field carries the URL. Anything that fails to parse yields no
/// URL.
fn first_url(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let parsed: serde_json::Value = serde_json::from_str(raw).ok()?;
    let first = parsed.as_array()?.first()?;
    first.get("item")?.as_str().map(str::to_string)
}

/// Turns one raw URL item into an HTTP command.
///
/// Percent-decodes the URL (keeping the raw text when decoding fails),
/// substitutes `${device.mapId}` and detects an explicit `httpVerb` marker
/// in the raw text; ha-bridge defaults to GET.
fn parse_endpoint(url: &str, device: &LegacyDevice) -> HttpCommand {
    let trimmed = url.trim();
    let mut clean = match urlencoding::decode(trimmed) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => trimmed.to_string(),
    };

    if let Some(map_id) = &device.map_id
        && clean.contains("${device.mapId}")
    {
        clean = clean.replace("${device.mapId}", map_id);
    }

    let method = if url.contains(r#""httpVerb":"POST""#) || url.contains("'httpVerb':'POST'") {
        HttpMethod::Post
    } else if url.contains(r#""httpVerb":"PUT""#) || url.contains("'httpVerb':'PUT'") {
        HttpMethod::Put
    } else {
        HttpMethod::Get
    };

    HttpCommand::new(method, clean)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(name: &str) -> LegacyDevice {
        LegacyDevice {
            name: Some(name.to_string()),
            ..LegacyDevice::default()
        }
    }

    fn url_list(url: &str) -> String {
        serde_json::json!([{"item": url, "type": "httpDevice"}]).to_string()
    }

    #[test]
    fn hash_id_is_stable_and_hex() {
        let id = generate_unique_id("Lamp");
        assert!(id.starts_with("webhook-"));
        assert_eq!(id.len(), "webhook-".len() + 8);
        assert_eq!(id, generate_unique_id("Lamp"));
        assert_ne!(id, generate_unique_id("Lamp 2"));
    }

    #[test]
    fn habridge_id_strips_colons() {
        let mut d = device("Lamp");
        d.unique_id = Some("00:17:88:5e:d3:01-0b".to_string());
        assert_eq!(unique_id_for(&d, "Lamp"), "habridge-0017885ed301-0b");
    }

    #[test]
    fn url_list_takes_first_item() {
        let raw = serde_json::json!([
            {"item": "http://h/on", "type": "httpDevice"},
            {"item": "http://h/other"}
        ])
        .to_string();
        assert_eq!(first_url(Some(&raw)).as_deref(), Some("http://h/on"));
        assert_eq!(first_url(Some("not json")), None);
        assert_eq!(first_url(Some("[]")), None);
        assert_eq!(first_url(None), None);
    }

    #[test]
    fn endpoint_decodes_and_substitutes_map_id() {
        let mut d = device("Blind");
        d.map_id = Some("42".to_string());
        let command = parse_endpoint("http://h/set%3Fpos=$%7Bdevice.mapId%7D", &d);
        assert_eq!(command.url, "http://h/set?pos=42");
        assert!(command.method.is_get());
    }

    #[test]
    fn endpoint_detects_http_verb_markers() {
        let d = device("x");
        let post = parse_endpoint(r#"http://h/on#"httpVerb":"POST""#, &d);
        assert_eq!(post.method, HttpMethod::Post);
        let put = parse_endpoint("http://h/on#'httpVerb':'PUT'", &d);
        assert_eq!(put.method, HttpMethod::Put);
    }

    #[test]
    fn converts_simple_switch() {
        let mut d = device("Fan");
        d.on_url = Some(url_list("http://h/fan/on"));
        d.off_url = Some(url_list("http://h/fan/off"));

        let report = convert(&[d]);
        assert_eq!(report.converted, 1);
        assert_eq!(report.skipped, 0);

        let webhook = &report.config.webhooks["Fan"];
        assert_eq!(webhook.device_type, Some(DeviceType::Switch));
        assert!(webhook.unique_id.as_deref().unwrap().starts_with("webhook-"));
        assert_eq!(
            webhook.endpoint(CommandSlot::On).unwrap().first().unwrap().url,
            "http://h/fan/on"
        );
    }

    #[test]
    fn dim_url_maps_to_position_for_covers() {
        let mut d = device("Tapparella studio");
        d.on_url = Some(url_list("http://h/up"));
        d.dim_url = Some(url_list("http://h/pos?v=${intensity.percent}"));

        let report = convert(&[d]);
        let webhook = &report.config.webhooks["Tapparella studio"];
        assert_eq!(webhook.device_type, Some(DeviceType::CoverLift));
        assert!(webhook.endpoint(CommandSlot::Brightness).is_none());
        assert!(webhook.endpoint(CommandSlot::CoverPosition).is_some());
    }

    #[test]
    fn dim_url_maps_to_brightness_for_lights() {
        let mut d = device("Desk lamp");
        d.on_url = Some(url_list("http://h/on"));
        d.dim_url = Some(url_list("http://h/dim?v=${intensity.byte}"));

        let report = convert(&[d]);
        let webhook = &report.config.webhooks["Desk lamp"];
        assert_eq!(webhook.device_type, Some(DeviceType::DimmableLight));
        assert!(webhook.endpoint(CommandSlot::Brightness).is_some());
    }

    #[test]
    fn color_url_adds_hue_endpoint() {
        let mut d = device("Strip");
        d.on_url = Some(url_list("http://h/on"));
        d.color_url = Some(url_list("http://h/rgb?hex=${color.rgbx}"));

        let report = convert(&[d]);
        let webhook = &report.config.webhooks["Strip"];
        assert_eq!(webhook.device_type, Some(DeviceType::ExtendedColorLight));
        assert!(webhook.endpoint(CommandSlot::ColorHue).is_some());
    }

    #[test]
    fn inactive_and_url_less_records_are_skipped() {
        let mut inactive = device("Old switch");
        inactive.inactive = true;
        inactive.on_url = Some(url_list("http://h/on"));

        // A color URL alone is not an actionable endpoint
        let mut color_only = device("Mood light");
        color_only.color_url = Some(url_list("http://h/rgb"));

        let report = convert(&[inactive, color_only]);
        assert_eq!(report.converted, 0);
        assert_eq!(report.skipped, 2);
        assert!(report.config.webhooks.is_empty());
    }

    #[test]
    fn name_falls_back_to_record_id() {
        let d = LegacyDevice {
            id: Some(7),
            on_url: Some(url_list("http://h/on")),
            ..LegacyDevice::default()
        };

        let report = convert(&[d]);
        assert!(report.config.webhooks.contains_key("Device 7"));
    }

    #[test]
    fn report_config_has_platform_defaults() {
        let report = convert(&[]);
        assert_eq!(report.config.name, "hookbridge");
        assert_eq!(report.config.kind, "DynamicPlatform");
        assert_eq!(report.config.timeout, Some(5000));
    }
}
