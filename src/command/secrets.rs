// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// Secrets manager operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SecretsCommand {
    Get(SecretGetRequest),
    GetByIds(SecretsGetRequest),
    Create(SecretCreateRequest),
    List(SecretIdentifiersRequest),
    Update(SecretPutRequest),
    Delete(SecretsDeleteRequest),
    Sync(SecretsSyncRequest),
}

impl SecretsCommand {
    pub fn name(&self) -> &'static str {
        match self {
            SecretsCommand::Get(_) => "secrets.get",
            SecretsCommand::GetByIds(_) => "secrets.getByIds",
            SecretsCommand::Create(_) => "secrets.create",
            SecretsCommand::List(_) => "secrets.list",
            SecretsCommand::Update(_) => "secrets.update",
            SecretsCommand::Delete(_) => "secrets.delete",
            SecretsCommand::Sync(_) => "secrets.sync",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretGetRequest {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretsGetRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretCreateRequest {
    pub organization_id: String,
    pub key: String,
    pub value: String,
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretIdentifiersRequest {
    pub organization_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretPutRequest {
    pub id: String,
    pub organization_id: String,
    pub key: String,
    pub value: String,
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretsDeleteRequest {
    pub ids: Vec<String>,
}

/// Fetch secrets changed since `last_synced_date` (RFC 3339), or all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretsSyncRequest {
    pub organization_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use serde_json::json;

    #[test]
    fn test_create_without_projects() {
        let cmd = Command::Secrets(SecretsCommand::Create(SecretCreateRequest {
            organization_id: "org".to_string(),
            key: "DB_PASSWORD".to_string(),
            value: "pw".to_string(),
            note: "".to_string(),
            project_ids: None,
        }));

        assert_eq!(
            serde_json::to_value(&cmd).unwrap(),
            json!({"secrets": {"create": {
                "organizationId": "org",
                "key": "DB_PASSWORD",
                "value": "pw",
                "note": ""
            }}})
        );
    }

    #[test]
    fn test_get_by_ids_variant_name() {
        let cmd = SecretsCommand::GetByIds(SecretsGetRequest {
            ids: vec!["a".into(), "b".into()],
        });
        assert_eq!(
            serde_json::to_value(&cmd).unwrap(),
            json!({"getByIds": {"ids": ["a", "b"]}})
        );
    }

    #[test]
    fn test_sync_with_date() {
        let cmd = SecretsCommand::Sync(SecretsSyncRequest {
            organization_id: "org".to_string(),
            last_synced_date: Some("2024-01-01T00:00:00Z".to_string()),
        });
        assert_eq!(
            serde_json::to_value(&cmd).unwrap(),
            json!({"sync": {"organizationId": "org", "lastSyncedDate": "2024-01-01T00:00:00Z"}})
        );
    }
}
