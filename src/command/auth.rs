// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Authentication, fingerprint and vault sync payloads.

use serde::{Deserialize, Serialize};

/// Login with email and master password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordLoginRequest {
    pub email: String,
    pub password: String,
}

/// Login with a personal API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyLoginRequest {
    pub client_id: String,
    pub client_secret: String,
    /// Master password, needed to unlock the vault after login.
    pub password: String,
}

/// Login with a machine account access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenLoginRequest {
    pub access_token: String,
    /// Where the engine persists auth state between runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_file: Option<String>,
}

/// Unlock an existing session for a known user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLoginRequest {
    pub user_id: String,
    pub password: String,
}

/// Proof of identity for `getUserApiKey`. Supply one of the two.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretVerificationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FingerprintRequest {
    pub fingerprint_material: String,
    pub public_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_subdomains: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_key_login_uses_camel_case() {
        let req = ApiKeyLoginRequest {
            client_id: "user.abc".to_string(),
            client_secret: "s3cret".to_string(),
            password: "hunter2".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"clientId": "user.abc", "clientSecret": "s3cret", "password": "hunter2"})
        );
    }

    #[test]
    fn test_secret_verification_with_only_otp() {
        let req = SecretVerificationRequest {
            master_password: None,
            otp: Some("123456".to_string()),
        };
        assert_eq!(serde_json::to_value(&req).unwrap(), json!({"otp": "123456"}));
    }
}
