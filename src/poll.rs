// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State polling.
//!
//! Runs one interval task per polled device, fetches the device's state
//! endpoint, extracts values by template path and converts them into
//! attribute updates for the host framework.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use tokio::task::JoinHandle;

use crate::classify::{DeviceType, PollConversion};
use crate::config::{CommandSlot, WebhookConfig};
use crate::extract;
use crate::protocol::HttpClient;
use crate::registry::WebhookRegistry;

/// Default polling interval when a webhook does not set one.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// One attribute write destined for the host framework.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeUpdate {
    pub cluster: &'static str,
    pub attribute: &'static str,
    pub value: Value,
}

impl AttributeUpdate {
    fn new(cluster: &'static str, attribute: &'static str, value: Value) -> Self {
        Self {
            cluster,
            attribute,
            value,
        }
    }
}

/// Receives attribute updates produced by poll ticks.
///
/// The host framework implements this to write into its own device model.
pub trait AttributeSink: Send + Sync {
    fn set_attribute(&self, device: &str, update: AttributeUpdate);
}

/// Per-device interval polling over the registry's webhooks.
///
/// Each started device owns one tokio task; stopping or shutting down
/// aborts the task. Poll failures are logged and skipped, the interval
/// keeps running.
pub struct Poller {
    client: HttpClient,
    registry: Arc<WebhookRegistry>,
    sink: Arc<dyn AttributeSink>,
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl Poller {
    /// Creates a poller delivering updates to the given sink.
    #[must_use]
    pub fn new(registry: Arc<WebhookRegistry>, sink: Arc<dyn AttributeSink>) -> Self {
        Self {
            client: HttpClient::new(),
            registry,
            sink,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Starts the interval task for one device.
    ///
    /// A device without a `pollState` endpoint is skipped. Starting an
    /// already-started device replaces its task.
    pub fn start(&self, device: &str, webhook: &WebhookConfig) {
        let Some(endpoint) = webhook.endpoint(CommandSlot::PollState) else {
            tracing::debug!(%device, "No pollState endpoint, not polling");
            return;
        };
        let Some(command) = endpoint.first().cloned() else {
            tracing::debug!(%device, "Empty pollState endpoint, not polling");
            return;
        };

        // A zero interval would panic the interval timer; treat it as unset
        let interval = webhook
            .poll_interval
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_POLL_INTERVAL, Duration::from_secs);
        let timeout = self.registry.timeout_for(webhook);
        let device_type = webhook.device_type.unwrap_or(DeviceType::Switch);
        let template = webhook.poll_template.clone();
        let client = self.client.clone();
        let sink = Arc::clone(&self.sink);
        let name = device.to_string();

        tracing::info!(%device, interval_secs = interval.as_secs(), "Starting poll task");
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick fires immediately, giving an initial state read
            loop {
                ticker.tick().await;
                let params = command.params.clone().unwrap_or_default();
                let state = match client.call(&command.url, command.method, &params, timeout).await
                {
                    Ok(state) => state,
                    Err(err) => {
                        tracing::warn!(device = %name, error = %err, "Poll request failed");
                        continue;
                    }
                };
                for update in updates_from_state(&state, template.as_deref(), device_type) {
                    tracing::debug!(
                        device = %name,
                        cluster = update.cluster,
                        attribute = update.attribute,
                        "Poll update"
                    );
                    sink.set_attribute(&name, update);
                }
            }
        });

        if let Some(old) = self.tasks.lock().insert(device.to_string(), handle) {
            old.abort();
        }
    }

    /// Starts poll tasks for every registry webhook with a state endpoint.
    pub fn start_all(&self) {
        for name in self.registry.names() {
            if let Some(webhook) = self.registry.get(&name) {
                self.start(&name, &webhook);
            }
        }
    }

    /// Stops the poll task for one device, if running.
    pub fn stop(&self, device: &str) {
        if let Some(handle) = self.tasks.lock().remove(device) {
            tracing::info!(%device, "Stopping poll task");
            handle.abort();
        }
    }

    /// Aborts all poll tasks.
    pub fn shutdown(&self) {
        let mut tasks = self.tasks.lock();
        for (device, handle) in tasks.drain() {
            tracing::debug!(%device, "Aborting poll task");
            handle.abort();
        }
    }

    /// Number of devices currently being polled.
    #[must_use]
    pub fn active(&self) -> usize {
        self.tasks.lock().len()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Derives attribute updates from one polled state document.
///
/// With a template the value at the template path goes through the
/// device type's conversion. Without one the device type selects a set of
/// well-known top-level field aliases to read instead, first present
/// alias wins per group; fields belonging to other sensor types are
/// ignored.
fn updates_from_state(
    state: &Value,
    template: Option<&str>,
    device_type: DeviceType,
) -> Vec<AttributeUpdate> {
    let conversion = device_type.poll_conversion();

    if let Some(template) = template {
        let Some(value) = extract::extract(state, template) else {
            tracing::warn!(%template, "Poll template matched nothing");
            return Vec::new();
        };
        return convert(value, conversion);
    }

    let Some(fields) = state.as_object() else {
        return Vec::new();
    };
    match conversion {
        PollConversion::Contact => fallback(fields, &["state", "contact"], conversion),
        PollConversion::Motion => fallback(fields, &["occupied", "motion"], conversion),
        PollConversion::Illuminance => fallback(fields, &["illuminance", "lux"], conversion),
        PollConversion::Temperature => fallback(fields, &["temperature"], conversion),
        PollConversion::Humidity => fallback(fields, &["humidity"], conversion),
        PollConversion::Pressure => fallback(fields, &["pressure"], conversion),
        PollConversion::Climate => {
            let mut updates = Vec::new();
            if let Some(t) = fields.get("temperature") {
                updates.extend(scaled(t, "temperatureMeasurement", 100.0));
            }
            if let Some(h) = fields.get("humidity") {
                updates.extend(scaled(h, "relativeHumidityMeasurement", 100.0));
            }
            if let Some(p) = fields.get("pressure") {
                updates.extend(scaled(p, "pressureMeasurement", 10.0));
            }
            updates
        }
        PollConversion::None => Vec::new(),
    }
}

fn fallback(
    fields: &Map<String, Value>,
    aliases: &[&str],
    conversion: PollConversion,
) -> Vec<AttributeUpdate> {
    first_alias(fields, aliases).map_or_else(Vec::new, |value| convert(value, conversion))
}

fn first_alias<'a>(fields: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|alias| fields.get(*alias))
}

/// Converts one extracted value into attribute updates per the device
/// type's measurement semantics.
#[allow(clippy::cast_possible_truncation)]
fn convert(value: &Value, conversion: PollConversion) -> Vec<AttributeUpdate> {
    match conversion {
        PollConversion::Contact => as_bool(value)
            .map(|closed| {
                AttributeUpdate::new("booleanState", "stateValue", Value::Bool(closed))
            })
            .into_iter()
            .collect(),
        PollConversion::Motion => as_bool(value)
            .map(|occupied| {
                AttributeUpdate::new("occupancySensing", "occupancy", json!({ "occupied": occupied }))
            })
            .into_iter()
            .collect(),
        PollConversion::Illuminance => as_f64(value)
            .map(|lux| {
                let measured = if lux <= 0.0 {
                    0.0
                } else {
                    (10_000.0 * lux.log10()).round()
                };
                AttributeUpdate::new(
                    "illuminanceMeasurement",
                    "measuredValue",
                    json!(measured as i64),
                )
            })
            .into_iter()
            .collect(),
        PollConversion::Temperature => scaled(value, "temperatureMeasurement", 100.0),
        PollConversion::Humidity => scaled(value, "relativeHumidityMeasurement", 100.0),
        PollConversion::Pressure => scaled(value, "pressureMeasurement", 10.0),
        PollConversion::Climate => match value {
            // A bare number on a climate device reads as a temperature
            Value::Number(_) => scaled(value, "temperatureMeasurement", 100.0),
            Value::Object(fields) => {
                let mut updates = Vec::new();
                if let Some(t) = fields.get("temperature") {
                    updates.extend(scaled(t, "temperatureMeasurement", 100.0));
                }
                if let Some(h) = fields.get("humidity") {
                    updates.extend(scaled(h, "relativeHumidityMeasurement", 100.0));
                }
                if let Some(p) = fields.get("pressure") {
                    updates.extend(scaled(p, "pressureMeasurement", 10.0));
                }
                updates
            }
            _ => Vec::new(),
        },
        PollConversion::None => Vec::new(),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn scaled(value: &Value, cluster: &'static str, factor: f64) -> Vec<AttributeUpdate> {
    as_f64(value)
        .map(|v| {
            AttributeUpdate::new(cluster, "measuredValue", json!((v * factor).round() as i64))
        })
        .into_iter()
        .collect()
}

/// Boolean coercion for polled values: accepts native booleans, the
/// strings "true"/"false"/"on"/"off"/"open"/"closed" and 0/1 numbers.
fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "on" | "open" | "1" => Some(true),
            "false" | "off" | "closed" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Numeric coercion for polled values: native numbers or numeric strings.
fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
