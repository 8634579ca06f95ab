// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Webhook registry.
//!
//! Holds the per-device webhook configuration for the lifetime of the
//! process. Built once from the persisted document at startup, read by the
//! dispatcher and poller, and mutated only through an explicit add/replace
//! action.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::RwLock;

use crate::classify::DeviceType;
use crate::config::{HttpCommand, HttpEndpoint, PlatformConfig, WebhookConfig};

/// Platform default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Registry of named webhook configurations.
#[derive(Debug)]
pub struct WebhookRegistry {
    default_timeout: Duration,
    webhooks: RwLock<HashMap<String, WebhookConfig>>,
}

impl WebhookRegistry {
    /// Builds a registry from a persisted configuration document.
    ///
    /// Legacy single-URL entries (bare `httpUrl` + `method`, no `on` and no
    /// device type) are upgraded to an `on` endpoint here, using the
    /// document's deprecated platform-wide device type, falling back to
    /// `Outlet`.
    #[must_use]
    pub fn from_config(config: &PlatformConfig) -> Self {
        let default_timeout = config.timeout.map_or(DEFAULT_TIMEOUT, Duration::from_millis);

        let mut webhooks = HashMap::with_capacity(config.webhooks.len());
        for (name, webhook) in &config.webhooks {
            let mut webhook = webhook.clone();
            upgrade_legacy(&mut webhook, config.device_type);
            tracing::debug!(
                device = %name,
                device_type = ?webhook.device_type,
                "Loading webhook"
            );
            webhooks.insert(name.clone(), webhook);
        }

        Self {
            default_timeout,
            webhooks: RwLock::new(webhooks),
        }
    }

    /// Creates an empty registry with the platform default timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_timeout: DEFAULT_TIMEOUT,
            webhooks: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the platform default request timeout.
    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Returns the effective timeout for a webhook: its own override when
    /// configured, else the platform default.
    #[must_use]
    pub fn timeout_for(&self, webhook: &WebhookConfig) -> Duration {
        webhook
            .timeout
            .map_or(self.default_timeout, Duration::from_millis)
    }

    /// Returns a copy of the configuration for a device, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<WebhookConfig> {
        self.webhooks.read().get(name).cloned()
    }

    /// Returns all configured device names.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.webhooks.read().keys().cloned().collect()
    }

    /// Returns the number of configured webhooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.webhooks.read().len()
    }

    /// Returns true if no webhooks are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.webhooks.read().is_empty()
    }

    /// Adds a webhook or replaces an existing one under the same name.
    ///
    /// This is the only mutation path after startup. A replaced device's
    /// type change only takes effect when the device is re-created by the
    /// host framework.
    pub fn add_or_replace(&self, name: impl Into<String>, mut webhook: WebhookConfig) {
        upgrade_legacy(&mut webhook, None);
        let name = name.into();
        tracing::info!(device = %name, "Registering webhook");
        self.webhooks.write().insert(name, webhook);
    }
}

impl Default for WebhookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Upgrades a legacy single-URL entry in place.
fn upgrade_legacy(webhook: &mut WebhookConfig, platform_default: Option<DeviceType>) {
    if webhook.on.is_none()
        && webhook.device_type.is_none()
        && let (Some(url), Some(method)) = (webhook.http_url.clone(), webhook.method)
    {
        webhook.device_type = Some(platform_default.unwrap_or(DeviceType::Outlet));
        webhook.on = Some(HttpEndpoint::Single(HttpCommand::new(method, url)));
    }
}
