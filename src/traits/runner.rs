// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::command::Command;
use crate::errors::BridgeResult;

/// Executes commands against an engine and yields the parsed `data` payload.
///
/// Higher-level clients (secrets, projects, folders) are written against this
/// trait so they can run over any engine, or over a fake in tests.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command, blocking the calling thread until the engine answers.
    fn run(&self, command: &Command) -> BridgeResult<Value>;

    /// Run a command without blocking. `None` for `cancel` means the call can
    /// not be cancelled.
    async fn run_async(
        &self,
        command: &Command,
        cancel: Option<CancellationToken>,
    ) -> BridgeResult<Value>;
}
