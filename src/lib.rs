// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `HookBridge` Lib - A Rust library to expose HTTP endpoints as virtual
//! smart-home devices.
//!
//! Each configured webhook turns a plain HTTP API into a typed device:
//! semantic actions (on/off, brightness, color, cover position, lock,
//! thermostat setpoints) become outgoing HTTP requests with placeholder
//! substitution, and optional state polling reads sensor values back.
//!
//! # Supported Features
//!
//! - **Command dispatch**: One semantic action per named command slot,
//!   each backed by one HTTP command or an ordered sequence of them
//! - **Placeholder templates**: Level, color and time values rendered
//!   into URLs and string parameters (`${level.percent}`, `${color.rgbx}`,
//!   `${time.millis}`, ...)
//! - **Device classification**: A heuristic cascade mapping a device's
//!   name, declared type and capabilities onto a closed device taxonomy
//! - **State polling**: Per-device interval polling with path extraction
//!   and per-type measurement conversions
//! - **ha-bridge migration**: Converts exported `device.db` records into
//!   a ready-to-edit configuration document
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use serde_json::Map;
//! use hookbridge_lib::{
//!     CommandContext, CommandDispatcher, CommandSlot, Level, PlatformConfig, WebhookRegistry,
//! };
//!
//! #[tokio::main]
//! async fn main() -> hookbridge_lib::Result<()> {
//!     let document = r#"{
//!         "name": "hookbridge",
//!         "type": "DynamicPlatform",
//!         "version": "1.0.0",
//!         "webhooks": {
//!             "Lamp": {
//!                 "deviceType": "DimmableLight",
//!                 "on": { "method": "GET", "url": "http://lamp.local/on" },
//!                 "off": { "method": "GET", "url": "http://lamp.local/off" },
//!                 "brightness": {
//!                     "method": "GET",
//!                     "url": "http://lamp.local/set?b=${level.percent}"
//!                 }
//!             }
//!         }
//!     }"#;
//!     let config: PlatformConfig =
//!         serde_json::from_str(document).map_err(hookbridge_lib::ParseError::from)?;
//!
//!     let registry = Arc::new(WebhookRegistry::from_config(&config));
//!     let dispatcher = CommandDispatcher::new(registry);
//!
//!     // Turn a device on
//!     dispatcher
//!         .execute("Lamp", CommandSlot::On, Map::new(), CommandContext::none())
//!         .await?;
//!
//!     // Dim it to half brightness
//!     dispatcher
//!         .execute(
//!             "Lamp",
//!             CommandSlot::Brightness,
//!             Map::new(),
//!             CommandContext::with_level(Level::new(127)?),
//!         )
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Polling
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use hookbridge_lib::poll::{AttributeSink, AttributeUpdate, Poller};
//! use hookbridge_lib::WebhookRegistry;
//!
//! struct LogSink;
//!
//! impl AttributeSink for LogSink {
//!     fn set_attribute(&self, device: &str, update: AttributeUpdate) {
//!         println!("{device}: {}.{} = {}", update.cluster, update.attribute, update.value);
//!     }
//! }
//!
//! # fn demo(registry: Arc<WebhookRegistry>) {
//! let poller = Poller::new(registry, Arc::new(LogSink));
//! poller.start_all();
//! # }
//! ```

pub mod classify;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod migrate;
pub mod poll;
pub mod protocol;
pub mod registry;
pub mod template;
pub mod types;

pub use classify::{DeviceDescriptor, DeviceType, PollConversion, classify};
pub use config::{
    CommandSlot, HttpCommand, HttpEndpoint, HttpMethod, ModeOption, PlatformConfig, WebhookConfig,
};
pub use dispatch::{CommandContext, CommandDispatcher};
pub use error::{ConfigError, Error, ParseError, ProtocolError, Result, ValueError};
pub use extract::extract;
pub use migrate::{LegacyDevice, MigrationReport, convert, generate_unique_id};
pub use poll::{AttributeSink, AttributeUpdate, Poller};
pub use registry::WebhookRegistry;
pub use types::{HsbColor, Level, Rgb};
