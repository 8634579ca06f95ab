// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command dispatch.
//!
//! Translates one semantic action on a device into the HTTP command(s) its
//! webhook wires up for that slot: placeholder rendering, parameter
//! routing, sequential execution, and per-device level tracking.
//!
//! This is the only component that mutates per-device level state and the
//! only one issuing action-driven HTTP calls.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::config::{CommandSlot, HttpMethod};
use crate::error::{ConfigError, Error};
use crate::protocol::HttpClient;
use crate::registry::WebhookRegistry;
use crate::template::{self, ColorContext};
use crate::types::Level;

/// Values accompanying a semantic action.
///
/// The level drives the `${level.*}` placeholders; the color components,
/// when any is present, enable the color substitution pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandContext {
    /// Target level (0-254) for level-changing actions.
    pub level: Option<Level>,
    /// Hue in degrees (0-360).
    pub hue: Option<f64>,
    /// Saturation percentage (0-100).
    pub saturation: Option<f64>,
    /// Brightness percentage (0-100).
    pub brightness: Option<f64>,
}

impl CommandContext {
    /// Context without level or color values.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Context carrying a target level.
    #[must_use]
    pub fn with_level(level: Level) -> Self {
        Self {
            level: Some(level),
            ..Self::default()
        }
    }

    /// Adds color values to the context.
    #[must_use]
    pub fn and_color(mut self, hue: f64, saturation: f64, brightness: f64) -> Self {
        self.hue = Some(hue);
        self.saturation = Some(saturation);
        self.brightness = Some(brightness);
        self
    }
}

/// Executes semantic actions against webhook endpoints.
///
/// Owns the per-device level map: the last level applied to each device,
/// kept for the lifetime of the process to back the `previous_*`
/// placeholders. Concurrent dispatch to the same device is last-write-wins
/// on that cell; the host framework serializes commands per device.
pub struct CommandDispatcher {
    client: HttpClient,
    registry: Arc<WebhookRegistry>,
    levels: Mutex<HashMap<String, Level>>,
}

impl CommandDispatcher {
    /// Creates a dispatcher over a webhook registry.
    #[must_use]
    pub fn new(registry: Arc<WebhookRegistry>) -> Self {
        Self {
            client: HttpClient::new(),
            registry,
            levels: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the last level applied to a device, if any.
    #[must_use]
    pub fn last_level(&self, device: &str) -> Option<Level> {
        self.levels.lock().get(device).copied()
    }

    /// Executes the commands configured in a device's command slot.
    ///
    /// Commands run sequentially and in order; the first failure aborts
    /// the remaining commands in the slot. An undefined slot is a logged
    /// no-op, never an error. If the context carried a level, it is
    /// persisted as the device's previous level exactly once, after the
    /// whole slot succeeded.
    ///
    /// # Errors
    ///
    /// Returns a config error for an unknown device and a protocol/parse
    /// error for the first failing command.
    pub async fn execute(
        &self,
        device: &str,
        slot: CommandSlot,
        params: Map<String, Value>,
        ctx: CommandContext,
    ) -> Result<(), Error> {
        let webhook = self
            .registry
            .get(device)
            .ok_or_else(|| ConfigError::UnknownDevice(device.to_string()))?;

        let Some(endpoint) = webhook.endpoint(slot) else {
            tracing::info!(%device, %slot, "No endpoint configured, skipping");
            return Ok(());
        };

        let previous = self.last_level(device).unwrap_or_default();
        let current = ctx.level.unwrap_or(previous);
        let color = ColorContext::from_parts(ctx.hue, ctx.saturation, ctx.brightness);
        let timeout = self.registry.timeout_for(&webhook);

        for command in endpoint.commands() {
            // Level first, then time, then color: a value produced by one
            // pass must not be consumed by an earlier one
            let mut url = template::render_level(&command.url, current, previous);
            url = template::render_time(&url);
            if let Some(color) = &color {
                url = template::render_color(&url, color);
            }

            // Static command parameters first, action parameters override
            let mut merged = command.params.clone().unwrap_or_default();
            merged.extend(params.clone());

            // Render string parameters before routing so values substituted
            // into the URL are already resolved
            for value in merged.values_mut() {
                if let Value::String(text) = value {
                    let mut rendered = template::render_level(text, current, previous);
                    if let Some(color) = &color {
                        rendered = template::render_color(&rendered, color);
                    }
                    *value = Value::String(rendered);
                }
            }

            let (url, remaining) = route_params(url, command.method, merged);

            if let Err(err) = self.client.call(&url, command.method, &remaining, timeout).await {
                tracing::error!(%device, %slot, %url, error = %err, "Command failed, aborting slot");
                return Err(err);
            }
            tracing::debug!(%device, %slot, %url, "Command succeeded");
        }

        if let Some(level) = ctx.level {
            self.levels.lock().insert(device.to_string(), level);
        }

        Ok(())
    }
}

/// Routes parameters between the URL and the request payload.
///
/// For GET every parameter becomes part of the query. For POST/PUT a
/// parameter whose key appears as a `{key}` literal in the URL is
/// substituted there and removed; the rest form the request body.
fn route_params(
    url: String,
    method: HttpMethod,
    params: Map<String, Value>,
) -> (String, Map<String, Value>) {
    if method.is_get() {
        return (url, params);
    }

    let mut url = url;
    let mut remaining = Map::new();
    for (key, value) in params {
        let placeholder = format!("{{{key}}}");
        if url.contains(&placeholder) {
            url = url.replace(&placeholder, &value_literal(&value));
        } else {
            remaining.insert(key, value);
        }
    }
    (url, remaining)
}

/// Plain string form of a parameter value for URL substitution.
fn value_literal(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
