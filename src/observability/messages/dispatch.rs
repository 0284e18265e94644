// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for command dispatch events.
//!
//! This module contains message types for logging events related to:
//! * Handing a command to the engine, blocking or async
//! * Settlement of async operations by completion or cancellation
//! * Abort handles that arrive after their operation settled
//! * Faults caught at the native boundary

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Command handed to the engine.
///
/// # Log Level
/// `debug!` - Per-command detail
///
/// # Example
/// ```
/// use vault_bridge::observability::messages::dispatch::CommandDispatched;
///
/// let msg = CommandDispatched {
///     command: "secrets.get",
///     mode: "async",
///     cancellable: true,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct CommandDispatched<'a> {
    pub command: &'a str,
    pub mode: &'a str,
    pub cancellable: bool,
}

impl Display for CommandDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dispatching {} command {} (cancellable={})",
            self.mode, self.command, self.cancellable
        )
    }
}

impl StructuredLog for CommandDispatched<'_> {
    fn log(&self) {
        tracing::debug!(
            command = self.command,
            mode = self.mode,
            cancellable = self.cancellable,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "dispatch",
            span_name = name,
            command = self.command,
            mode = self.mode,
            cancellable = self.cancellable,
        )
    }
}

/// Command failed before or while reaching the engine.
///
/// # Log Level
/// `warn!` - Operation failed, caller receives the error
pub struct CommandFailed<'a> {
    pub command: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for CommandFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Command {} failed: {}", self.command, self.error)
    }
}

impl StructuredLog for CommandFailed<'_> {
    fn log(&self) {
        tracing::warn!(command = self.command, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("command_failed", span_name = name, command = self.command)
    }
}

/// Cancellation was already requested, so the engine was never invoked.
///
/// # Log Level
/// `debug!` - Expected control flow
pub struct CancelledBeforeDispatch<'a> {
    pub command: &'a str,
}

impl Display for CancelledBeforeDispatch<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Command {} cancelled before dispatch; engine not invoked",
            self.command
        )
    }
}

impl StructuredLog for CancelledBeforeDispatch<'_> {
    fn log(&self) {
        tracing::debug!(command = self.command, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("cancelled_before_dispatch", span_name = name, command = self.command)
    }
}

/// Async operation settled by completion or cancellation.
///
/// # Log Level
/// `debug!` - Per-command detail
///
/// # Example
/// ```
/// use vault_bridge::observability::messages::dispatch::OperationSettled;
///
/// let msg = OperationSettled {
///     operation_id: 42,
///     command: "debug.cancellationTest",
///     outcome: "cancelled",
///     released_handle: true,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct OperationSettled<'a> {
    pub operation_id: usize,
    pub command: &'a str,
    pub outcome: &'a str,
    pub released_handle: bool,
}

impl Display for OperationSettled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Operation {} ({}) settled as {}; abort handle released={}",
            self.operation_id, self.command, self.outcome, self.released_handle
        )
    }
}

impl StructuredLog for OperationSettled<'_> {
    fn log(&self) {
        tracing::debug!(
            operation_id = self.operation_id,
            command = self.command,
            outcome = self.outcome,
            released_handle = self.released_handle,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "operation_settled",
            span_name = name,
            operation_id = self.operation_id,
            command = self.command,
            outcome = self.outcome,
        )
    }
}

/// Abort handle returned after its operation had already settled.
///
/// # Log Level
/// `debug!` - Expected when the engine calls back before returning
pub struct LateHandleReleased<'a> {
    pub operation_id: usize,
    pub release: &'a str,
}

impl Display for LateHandleReleased<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Operation {} settled before its abort handle arrived; released it via {}",
            self.operation_id, self.release
        )
    }
}

impl StructuredLog for LateHandleReleased<'_> {
    fn log(&self) {
        tracing::debug!(
            operation_id = self.operation_id,
            release = self.release,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "late_handle_released",
            span_name = name,
            operation_id = self.operation_id,
        )
    }
}

/// Completion callback arrived on a slot with no operation waiting.
///
/// # Log Level
/// `debug!` - Expected when the engine reports back after an abort
pub struct StrayCallback {
    pub slot: usize,
}

impl Display for StrayCallback {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Ignoring completion on slot {}: no operation waiting",
            self.slot
        )
    }
}

impl StructuredLog for StrayCallback {
    fn log(&self) {
        tracing::debug!(slot = self.slot, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("stray_callback", span_name = name, slot = self.slot)
    }
}

/// A panic crossed the native boundary and was caught.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct NativeFault<'a> {
    pub command: &'a str,
    pub detail: &'a str,
}

impl Display for NativeFault<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Native boundary fault during {}: {}",
            self.command, self.detail
        )
    }
}

impl StructuredLog for NativeFault<'_> {
    fn log(&self) {
        tracing::error!(command = self.command, detail = self.detail, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("native_fault", span_name = name, command = self.command)
    }
}
