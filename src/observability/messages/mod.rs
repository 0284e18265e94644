// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit that line at its documented level together with
//! machine-readable fields.
//!
//! # Organization
//!
//! * `engine` - library loading and client lifecycle events
//! * `dispatch` - command dispatch, settlement and cancellation events
//!
//! # Usage Pattern
//!
//! ```rust
//! use vault_bridge::observability::messages::engine::ClientInitialized;
//! use vault_bridge::observability::messages::StructuredLog;
//!
//! let msg = ClientInitialized {
//!     engine: "stub",
//!     api_url: "https://api.bitwarden.com",
//! };
//!
//! msg.log();
//! ```

pub mod dispatch;
pub mod engine;

use tracing::Span;

/// A message that knows its own log level and structured fields.
pub trait StructuredLog {
    /// Emit the message as a `tracing` event.
    fn log(&self);

    /// Open a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
