// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Turns an engine result string into typed data or an error.
//!
//! | payload | outcome |
//! |---|---|
//! | not JSON, or not an object | [`BridgeError::Decode`] |
//! | `success: true` with `data` | `data` as `T` ([`BridgeError::Decode`] on shape mismatch) |
//! | `success: true` without `data` | [`BridgeError::MalformedSuccess`] |
//! | `success` false or missing | [`BridgeError::Engine`] with `errorMessage`, or `"Unknown error."` |

use crate::errors::{BridgeError, BridgeResult, UNKNOWN_ENGINE_ERROR};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Parse `raw` and deserialize its `data` into `T`.
pub fn parse<T: DeserializeOwned>(raw: &str) -> BridgeResult<T> {
    let data = parse_envelope(raw)?;
    serde_json::from_value(data)
        .map_err(|e| BridgeError::decode(format!("unexpected data shape: {e}")))
}

/// Parse `raw` and return its `data` untyped.
///
/// An explicit `"data": null` counts as present and comes back as
/// `Value::Null`; only a missing key is malformed.
pub fn parse_envelope(raw: &str) -> BridgeResult<Value> {
    if raw.trim().is_empty() {
        return Err(BridgeError::decode("empty response"));
    }

    let value: Value = serde_json::from_str(raw)?;
    let Value::Object(mut envelope) = value else {
        return Err(BridgeError::decode("response is not a JSON object"));
    };

    if succeeded(&envelope) {
        return envelope
            .remove("data")
            .ok_or(BridgeError::MalformedSuccess);
    }

    let message = envelope
        .get("errorMessage")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_ENGINE_ERROR);
    Err(BridgeError::engine(message))
}

fn succeeded(envelope: &Map<String, Value>) -> bool {
    envelope
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
