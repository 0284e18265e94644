// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Client facade over one engine handle.
//!
//! ```no_run
//! use std::sync::Arc;
//! use vault_bridge::backends::stub::StubEngine;
//! use vault_bridge::client::VaultClient;
//! use vault_bridge::command::{Command, SecretGetRequest, SecretsCommand};
//! use vault_bridge::config::ClientSettings;
//!
//! # async fn demo() -> vault_bridge::errors::BridgeResult<()> {
//! let client = VaultClient::new(Arc::new(StubEngine::new()), &ClientSettings::default())?;
//! let cmd = Command::Secrets(SecretsCommand::Get(SecretGetRequest { id: "5f1c".into() }));
//! let data: serde_json::Value = client.run_command_async(&cmd, None).await?;
//! # Ok(())
//! # }
//! ```

mod handle;

pub use handle::EngineHandle;

use crate::backends::open_engine;
use crate::command::{CancellationTestRequest, Command, DebugCommand, EmptyRequest};
use crate::config::{BridgeConfig, ClientSettings};
use crate::dispatch;
use crate::errors::BridgeResult;
use crate::traits::{CommandRunner, NativeEngine};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Runs commands on one engine client and parses their results.
pub struct VaultClient {
    handle: EngineHandle,
}

impl VaultClient {
    pub fn new(engine: Arc<dyn NativeEngine>, settings: &ClientSettings) -> BridgeResult<Self> {
        Ok(Self {
            handle: EngineHandle::open(engine, settings)?,
        })
    }

    /// Open the engine the config names and create a client on it.
    pub fn from_config(config: &BridgeConfig) -> BridgeResult<Self> {
        let engine = open_engine(config)?;
        Self::new(engine, &config.settings)
    }

    pub fn handle(&self) -> &EngineHandle {
        &self.handle
    }

    /// Run `command` on the calling thread and parse its `data` as `T`.
    pub fn run_command<T: DeserializeOwned>(&self, command: &Command) -> BridgeResult<T> {
        let raw = dispatch::run(&self.handle, command)?;
        dispatch::parse(&raw)
    }

    /// Run `command` without blocking and parse its `data` as `T`.
    ///
    /// Resolves to [`crate::errors::BridgeError::Cancelled`] if `cancel`
    /// fires before the engine completes.
    pub async fn run_command_async<T: DeserializeOwned>(
        &self,
        command: &Command,
        cancel: Option<CancellationToken>,
    ) -> BridgeResult<T> {
        let raw = dispatch::run_async(&self.handle, command, cancel).await?;
        dispatch::parse(&raw)
    }

    /// Ask a debug engine to hold an async call open for `duration`.
    pub async fn cancellation_test(
        &self,
        duration: Duration,
        cancel: Option<CancellationToken>,
    ) -> BridgeResult<Value> {
        let command = Command::Debug(DebugCommand::CancellationTest(CancellationTestRequest {
            duration_millis: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        }));
        self.run_command_async(&command, cancel).await
    }

    /// Ask a debug engine for its canned failure.
    pub fn error_test(&self) -> BridgeResult<Value> {
        self.run_command(&Command::Debug(DebugCommand::ErrorTest(EmptyRequest::default())))
    }

    /// Release the engine client.
    pub fn close(self) {
        self.handle.close();
    }
}

#[async_trait]
impl CommandRunner for VaultClient {
    fn run(&self, command: &Command) -> BridgeResult<Value> {
        self.run_command(command)
    }

    async fn run_async(
        &self,
        command: &Command,
        cancel: Option<CancellationToken>,
    ) -> BridgeResult<Value> {
        self.run_command_async(command, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{CompletionMode, StubEngine, ERROR_TEST_MESSAGE};
    use crate::command::{FolderCreateRequest, FoldersCommand};
    use crate::errors::BridgeError;
    use serde_json::json;

    fn client(stub: &Arc<StubEngine>) -> VaultClient {
        VaultClient::new(stub.clone(), &ClientSettings::default()).unwrap()
    }

    #[test]
    fn test_run_command_returns_typed_data() {
        let stub = Arc::new(StubEngine::new());
        let client = client(&stub);
        let command = Command::Folders(FoldersCommand::Create(FolderCreateRequest {
            name: "Work".to_string(),
        }));

        let data: Value = client.run_command(&command).unwrap();

        assert_eq!(data, json!({"folders": {"create": {"name": "Work"}}}));
    }

    #[test]
    fn test_error_test_surfaces_engine_message() {
        let stub = Arc::new(StubEngine::new());
        let client = client(&stub);

        match client.error_test() {
            Err(BridgeError::Engine { message }) => assert_eq!(message, ERROR_TEST_MESSAGE),
            other => panic!("Expected engine error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_success_through_client() {
        let stub = Arc::new(StubEngine::new().with_response(r#"{"success":true}"#));
        let client = client(&stub);

        let err = client.error_test().unwrap_err();

        assert!(matches!(err, BridgeError::MalformedSuccess));
    }

    #[tokio::test]
    async fn test_cancellation_test_completes_when_not_cancelled() {
        let stub = Arc::new(StubEngine::new().with_completion(CompletionMode::Threaded {
            delay: Duration::from_millis(1),
        }));
        let client = client(&stub);

        let data = client
            .cancellation_test(Duration::from_millis(10), Some(CancellationToken::new()))
            .await
            .unwrap();

        assert_eq!(
            data,
            json!({"debug": {"cancellationTest": {"durationMillis": 10}}})
        );
        assert_eq!(stub.ledger().handles_freed, 1);
    }

    #[tokio::test]
    async fn test_cancellation_test_duration_saturates() {
        let stub = Arc::new(StubEngine::new());
        let client = client(&stub);

        let data = client.cancellation_test(Duration::MAX, None).await.unwrap();

        assert_eq!(
            data,
            json!({"debug": {"cancellationTest": {"durationMillis": u64::MAX}}})
        );
    }

    #[tokio::test]
    async fn test_runner_trait_object() {
        let stub = Arc::new(StubEngine::new());
        let runner: Box<dyn CommandRunner> = Box::new(client(&stub));
        let command = Command::Folders(FoldersCommand::List(EmptyRequest::default()));

        let sync = runner.run(&command).unwrap();
        let async_result = runner.run_async(&command, None).await.unwrap();

        assert_eq!(sync, async_result);
        assert_eq!(stub.ledger().sync_calls, 1);
        assert_eq!(stub.ledger().async_calls, 1);
    }

    #[test]
    fn test_close_releases_client() {
        let stub = Arc::new(StubEngine::new());
        client(&stub).close();
        assert_eq!(stub.ledger().clients_released, 1);
    }
}
