// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for command dispatch using wiremock.

use std::sync::Arc;

use serde_json::{Map, Value, json};

use hookbridge_lib::{
    CommandContext, CommandDispatcher, CommandSlot, Error, HttpCommand, HttpEndpoint, HttpMethod,
    Level, WebhookConfig, WebhookRegistry,
};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dispatcher_with(name: &str, webhook: WebhookConfig) -> CommandDispatcher {
    let registry = Arc::new(WebhookRegistry::new());
    registry.add_or_replace(name, webhook);
    CommandDispatcher::new(registry)
}

fn get_command(url: String) -> HttpEndpoint {
    HttpCommand::new(HttpMethod::Get, url).into()
}

fn params(value: Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

#[tokio::test]
async fn on_command_fires_single_get() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/on"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let webhook = WebhookConfig {
        on: Some(get_command(format!("{}/on", server.uri()))),
        ..WebhookConfig::default()
    };
    let dispatcher = dispatcher_with("Lamp", webhook);

    dispatcher
        .execute("Lamp", CommandSlot::On, Map::new(), CommandContext::none())
        .await
        .unwrap();
}

#[tokio::test]
async fn brightness_renders_level_percent_into_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/set"))
        .and(query_param("b", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let webhook = WebhookConfig {
        brightness: Some(get_command(format!(
            "{}/set?b=${{level.percent}}",
            server.uri()
        ))),
        ..WebhookConfig::default()
    };
    let dispatcher = dispatcher_with("Lamp", webhook);

    // level 127 of 254 is 50 percent
    dispatcher
        .execute(
            "Lamp",
            CommandSlot::Brightness,
            Map::new(),
            CommandContext::with_level(Level::new(127).unwrap()),
        )
        .await
        .unwrap();

    assert_eq!(dispatcher.last_level("Lamp"), Some(Level::new(127).unwrap()));
}

#[tokio::test]
async fn previous_level_feeds_next_command() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/set"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fade"))
        .and(query_param("from", "50"))
        .and(query_param("to", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let webhook = WebhookConfig {
        brightness: Some(get_command(format!("{}/set", server.uri()))),
        on: Some(get_command(format!(
            "{}/fade?from=${{level.previous_percent}}&to=${{level.percent}}",
            server.uri()
        ))),
        ..WebhookConfig::default()
    };
    let dispatcher = dispatcher_with("Lamp", webhook);

    dispatcher
        .execute(
            "Lamp",
            CommandSlot::Brightness,
            Map::new(),
            CommandContext::with_level(Level::new(127).unwrap()),
        )
        .await
        .unwrap();
    dispatcher
        .execute(
            "Lamp",
            CommandSlot::On,
            Map::new(),
            CommandContext::with_level(Level::MAX),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn get_params_travel_in_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/set"))
        .and(query_param("zone", "A"))
        .and(query_param("value", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let webhook = WebhookConfig {
        on: Some(get_command(format!("{}/set", server.uri()))),
        ..WebhookConfig::default()
    };
    let dispatcher = dispatcher_with("Zoned", webhook);

    dispatcher
        .execute(
            "Zoned",
            CommandSlot::On,
            params(json!({"zone": "A", "value": 7})),
            CommandContext::none(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn post_substitutes_url_literal_and_sends_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/zones/A/set"))
        .and(body_json(json!({"value": 7})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let webhook = WebhookConfig {
        on: Some(
            HttpCommand::new(
                HttpMethod::Post,
                format!("{}/zones/{{zone}}/set", server.uri()),
            )
            .into(),
        ),
        ..WebhookConfig::default()
    };
    let dispatcher = dispatcher_with("Zoned", webhook);

    dispatcher
        .execute(
            "Zoned",
            CommandSlot::On,
            params(json!({"zone": "A", "value": 7})),
            CommandContext::none(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn string_params_get_level_substitution() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/set"))
        .and(body_json(json!({"brightness": "50"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let webhook = WebhookConfig {
        brightness: Some(
            HttpCommand::new(HttpMethod::Post, format!("{}/set", server.uri())).into(),
        ),
        ..WebhookConfig::default()
    };
    let dispatcher = dispatcher_with("Lamp", webhook);

    dispatcher
        .execute(
            "Lamp",
            CommandSlot::Brightness,
            params(json!({"brightness": "${level.percent}"})),
            CommandContext::with_level(Level::new(127).unwrap()),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn color_placeholders_render_rgb_hex() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rgb"))
        .and(query_param("hex", "ff0000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let webhook = WebhookConfig {
        color_hue: Some(get_command(format!(
            "{}/rgb?hex=${{color.rgbx}}",
            server.uri()
        ))),
        ..WebhookConfig::default()
    };
    let dispatcher = dispatcher_with("Strip", webhook);

    dispatcher
        .execute(
            "Strip",
            CommandSlot::ColorHue,
            Map::new(),
            CommandContext::none().and_color(0.0, 100.0, 100.0),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn sequence_runs_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/first"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/second"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let webhook = WebhookConfig {
        on: Some(HttpEndpoint::Sequence(vec![
            HttpCommand::new(HttpMethod::Get, format!("{}/first", server.uri())),
            HttpCommand::new(HttpMethod::Get, format!("{}/second", server.uri())),
        ])),
        ..WebhookConfig::default()
    };
    let dispatcher = dispatcher_with("Combo", webhook);

    dispatcher
        .execute("Combo", CommandSlot::On, Map::new(), CommandContext::none())
        .await
        .unwrap();
}

#[tokio::test]
async fn sequence_aborts_on_first_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/first"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/second"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let webhook = WebhookConfig {
        on: Some(HttpEndpoint::Sequence(vec![
            HttpCommand::new(HttpMethod::Get, format!("{}/first", server.uri())),
            HttpCommand::new(HttpMethod::Get, format!("{}/second", server.uri())),
        ])),
        ..WebhookConfig::default()
    };
    let dispatcher = dispatcher_with("Combo", webhook);

    let err = dispatcher
        .execute(
            "Combo",
            CommandSlot::On,
            Map::new(),
            CommandContext::with_level(Level::MAX),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Protocol(_)));

    // A failed slot must not persist the level
    assert_eq!(dispatcher.last_level("Combo"), None);
}

#[tokio::test]
async fn undefined_slot_is_a_no_op() {
    let webhook = WebhookConfig {
        on: Some(get_command("http://127.0.0.1:9/on".to_string())),
        ..WebhookConfig::default()
    };
    let dispatcher = dispatcher_with("Lamp", webhook);

    // No off endpoint configured; nothing is called and nothing fails
    dispatcher
        .execute("Lamp", CommandSlot::Off, Map::new(), CommandContext::none())
        .await
        .unwrap();
}

#[tokio::test]
async fn unknown_device_is_a_config_error() {
    let dispatcher = CommandDispatcher::new(Arc::new(WebhookRegistry::new()));

    let err = dispatcher
        .execute("Ghost", CommandSlot::On, Map::new(), CommandContext::none())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert_eq!(err.to_string(), "config error: no webhook configured for device 'Ghost'");
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/on"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let webhook = WebhookConfig {
        on: Some(get_command(format!("{}/on", server.uri()))),
        ..WebhookConfig::default()
    };
    let dispatcher = dispatcher_with("Lamp", webhook);

    let err = dispatcher
        .execute("Lamp", CommandSlot::On, Map::new(), CommandContext::none())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("status code 404"));
}
