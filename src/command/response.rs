// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Envelope wrapping every engine result.
///
/// `data` is present only on success, `error_message` only on failure. Both are
/// omitted from the JSON when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Response<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            error_message: None,
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
            data: None,
        }
    }

    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::error(err.to_string()),
        }
    }
}

impl<T: Serialize> Response<T> {
    /// Render the envelope as the engine's result string.
    ///
    /// Falls back to a hand-built error envelope if `data` cannot be
    /// serialized, so the receiver always gets valid JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| {
            let fallback: Response<()> = Response::error(format!("Failed to serialize response: {err}"));
            serde_json::to_string(&fallback)
                .unwrap_or_else(|_| r#"{"success":false}"#.to_string())
        })
    }
}
