// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The command envelope sent to the native engine and the response envelope
//! it sends back.
//!
//! A [`Command`] is a closed sum type. Serde's externally tagged representation
//! renders the chosen variant as the single populated key at each nesting
//! level, so the wire form always names exactly one leaf operation:
//!
//! ```
//! use vault_bridge::command::{Command, SecretGetRequest, SecretsCommand};
//!
//! let cmd = Command::Secrets(SecretsCommand::Get(SecretGetRequest {
//!     id: "5f1c".to_string(),
//! }));
//! assert_eq!(
//!     serde_json::to_string(&cmd).unwrap(),
//!     r#"{"secrets":{"get":{"id":"5f1c"}}}"#
//! );
//! ```
//!
//! Optional fields that are unset are left out of the payload entirely; the
//! engine never sees an explicit `null`.

mod auth;
mod debug;
mod folders;
mod generators;
mod projects;
mod response;
mod secrets;

pub use auth::{
    AccessTokenLoginRequest, ApiKeyLoginRequest, FingerprintRequest, PasswordLoginRequest,
    SecretVerificationRequest, SessionLoginRequest, SyncRequest,
};
pub use debug::{CancellationTestRequest, DebugCommand};
pub use folders::{FolderCreateRequest, FolderDeleteRequest, FolderUpdateRequest, FoldersCommand};
pub use generators::{GeneratorsCommand, PasswordGeneratorRequest};
pub use projects::{
    ProjectCreateRequest, ProjectGetRequest, ProjectUpdateRequest, ProjectsCommand,
    ProjectsDeleteRequest, ProjectsListRequest,
};
pub use response::Response;
pub use secrets::{
    SecretCreateRequest, SecretGetRequest, SecretIdentifiersRequest, SecretPutRequest,
    SecretsCommand, SecretsDeleteRequest, SecretsGetRequest, SecretsSyncRequest,
};

use serde::{Deserialize, Serialize};

/// Placeholder payload for operations that take no arguments.
///
/// Serializes as `{}` rather than `null`, which is what the engine expects for
/// argument-less leaves such as `folders.list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyRequest {}

/// A single engine operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    PasswordLogin(PasswordLoginRequest),
    ApiKeyLogin(ApiKeyLoginRequest),
    AccessTokenLogin(AccessTokenLoginRequest),
    SessionLogin(SessionLoginRequest),
    GetUserApiKey(SecretVerificationRequest),
    Fingerprint(FingerprintRequest),
    Sync(SyncRequest),
    Secrets(SecretsCommand),
    Projects(ProjectsCommand),
    Folders(FoldersCommand),
    Generators(GeneratorsCommand),
    Debug(DebugCommand),
}

impl Command {
    /// Dotted operation name used in log output, e.g. `secrets.get`.
    pub fn name(&self) -> &'static str {
        match self {
            Command::PasswordLogin(_) => "passwordLogin",
            Command::ApiKeyLogin(_) => "apiKeyLogin",
            Command::AccessTokenLogin(_) => "accessTokenLogin",
            Command::SessionLogin(_) => "sessionLogin",
            Command::GetUserApiKey(_) => "getUserApiKey",
            Command::Fingerprint(_) => "fingerprint",
            Command::Sync(_) => "sync",
            Command::Secrets(cmd) => cmd.name(),
            Command::Projects(cmd) => cmd.name(),
            Command::Folders(cmd) => cmd.name(),
            Command::Generators(cmd) => cmd.name(),
            Command::Debug(cmd) => cmd.name(),
        }
    }

    /// Serialize to the JSON text handed to the engine.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
