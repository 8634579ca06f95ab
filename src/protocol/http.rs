// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Low-level HTTP primitive.
//!
//! Every outbound call, action-driven or poll-driven, goes through
//! [`HttpClient::call`]: GET requests serialize their parameters into the
//! query string, POST/PUT requests send them as a JSON body, responses must
//! be JSON, and any status at or above 300 is a failure.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::{Map, Value};

use crate::config::HttpMethod;
use crate::error::{Error, ParseError, ProtocolError};

/// HTTP client for webhook endpoints.
///
/// A thin wrapper over a shared `reqwest::Client`; timeouts are applied
/// per call because each device may carry its own override.
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a single HTTP request and decodes the JSON response.
    ///
    /// # Arguments
    ///
    /// * `url` - The fully rendered request URL
    /// * `method` - GET, POST or PUT
    /// * `params` - Parameters; query string for GET, JSON body otherwise
    /// * `timeout` - Per-request timeout
    ///
    /// # Errors
    ///
    /// Returns a protocol error on connection failure, timeout, or a
    /// status code of 300 or above, and a parse error if the response body
    /// is not valid JSON.
    pub async fn call(
        &self,
        url: &str,
        method: HttpMethod,
        params: &Map<String, Value>,
        timeout: Duration,
    ) -> Result<Value, Error> {
        tracing::debug!(%url, %method, ?timeout, "Sending HTTP request");

        let request = match method {
            HttpMethod::Get => {
                let query: Vec<(String, String)> = params
                    .iter()
                    .map(|(key, value)| (key.clone(), query_value(value)))
                    .collect();
                self.client.get(url).query(&query)
            }
            HttpMethod::Post => self.client.post(url).json(params),
            HttpMethod::Put => self.client.put(url).json(params),
        };

        let response = request
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .timeout(timeout)
            .send()
            .await
            .map_err(ProtocolError::Http)?;

        let status = response.status();
        if status.as_u16() >= 300 {
            tracing::debug!(%url, status = status.as_u16(), "Request failed");
            return Err(ProtocolError::Status(status.as_u16()).into());
        }

        let body = response.text().await.map_err(ProtocolError::Http)?;
        tracing::debug!(body = %body, "Received HTTP response");

        let value = serde_json::from_str(&body).map_err(ParseError::Json)?;
        Ok(value)
    }
}

/// Serializes a parameter value for the query string.
///
/// Nulls become empty strings, nested objects and arrays are JSON-encoded,
/// everything else is its plain string form.
fn query_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) => value.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_value_serialization() {
        assert_eq!(query_value(&Value::Null), "");
        assert_eq!(query_value(&json!("on")), "on");
        assert_eq!(query_value(&json!(42)), "42");
        assert_eq!(query_value(&json!(true)), "true");
        assert_eq!(query_value(&json!({"a": 1})), "{\"a\":1}");
        assert_eq!(query_value(&json!([1, 2])), "[1,2]");
    }
}
