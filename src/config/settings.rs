// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_API_URL, DEFAULT_DEVICE_TYPE, DEFAULT_IDENTITY_URL, DEFAULT_USER_AGENT,
};
use serde::{Deserialize, Serialize};

/// Settings handed to the engine's `init` entry point as JSON.
///
/// Every field has a default, so an empty `settings:` block in the config file
/// targets the public cloud endpoints.
///
/// # Example
/// ```yaml
/// settings:
///   apiUrl: https://vault.example.com/api
///   identityUrl: https://vault.example.com/identity
///   statePath: /var/lib/vault-bridge/state.json
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientSettings {
    pub identity_url: String,
    pub api_url: String,
    pub user_agent: String,
    pub device_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_path: Option<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            device_type: DEFAULT_DEVICE_TYPE.to_string(),
            state_path: None,
        }
    }
}

impl ClientSettings {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
