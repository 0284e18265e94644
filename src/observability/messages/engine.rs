// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for engine library loading and client lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Opening a native engine library and resolving its entry points
//! * Creating a client with `init`
//! * Releasing a client with `free_mem`

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Native engine library opened and all entry points resolved.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use vault_bridge::observability::messages::engine::LibraryLoaded;
///
/// let msg = LibraryLoaded {
///     library_path: "/usr/lib/libbitwarden_c.so",
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct LibraryLoaded<'a> {
    pub library_path: &'a str,
}

impl Display for LibraryLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Loaded engine library: {}", self.library_path)
    }
}

impl StructuredLog for LibraryLoaded<'_> {
    fn log(&self) {
        tracing::info!(library_path = self.library_path, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "library_loaded",
            span_name = name,
            library_path = self.library_path,
        )
    }
}

/// Native engine library could not be opened or is missing an entry point.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct LibraryLoadFailed<'a> {
    pub library_path: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for LibraryLoadFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to load engine library '{}': {}",
            self.library_path, self.error
        )
    }
}

impl StructuredLog for LibraryLoadFailed<'_> {
    fn log(&self) {
        tracing::error!(
            library_path = self.library_path,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "library_load_failed",
            span_name = name,
            library_path = self.library_path,
        )
    }
}

/// Client created by the engine's `init` entry point.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use vault_bridge::observability::messages::engine::ClientInitialized;
///
/// let msg = ClientInitialized {
///     engine: "libbitwarden_c.so",
///     api_url: "https://api.bitwarden.com",
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ClientInitialized<'a> {
    pub engine: &'a str,
    pub api_url: &'a str,
}

impl Display for ClientInitialized<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Initialized engine client on {} for {}",
            self.engine, self.api_url
        )
    }
}

impl StructuredLog for ClientInitialized<'_> {
    fn log(&self) {
        tracing::info!(engine = self.engine, api_url = self.api_url, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "client",
            span_name = name,
            engine = self.engine,
            api_url = self.api_url,
        )
    }
}

/// `init` returned a null client.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ClientInitFailed<'a> {
    pub engine: &'a str,
}

impl Display for ClientInitFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Engine {} returned a null client from init", self.engine)
    }
}

impl StructuredLog for ClientInitFailed<'_> {
    fn log(&self) {
        tracing::error!(engine = self.engine, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("client_init_failed", span_name = name, engine = self.engine)
    }
}

/// Client released with `free_mem`.
///
/// # Log Level
/// `debug!` - Routine lifecycle event
pub struct ClientReleased<'a> {
    pub engine: &'a str,
}

impl Display for ClientReleased<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Released engine client on {}", self.engine)
    }
}

impl StructuredLog for ClientReleased<'_> {
    fn log(&self) {
        tracing::debug!(engine = self.engine, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("client_released", span_name = name, engine = self.engine)
    }
}

/// Client released while async operations were still outstanding.
///
/// The engine may still call back for those operations; whether it tolerates
/// that after `free_mem` is up to the engine.
///
/// # Log Level
/// `warn!` - Potential problem
///
/// # Example
/// ```
/// use vault_bridge::observability::messages::engine::ReleasedWithPendingOperations;
///
/// let msg = ReleasedWithPendingOperations {
///     engine: "stub",
///     pending: 2,
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct ReleasedWithPendingOperations<'a> {
    pub engine: &'a str,
    pub pending: usize,
}

impl Display for ReleasedWithPendingOperations<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Releasing engine client on {} with {} async operation(s) still pending",
            self.engine, self.pending
        )
    }
}

impl StructuredLog for ReleasedWithPendingOperations<'_> {
    fn log(&self) {
        tracing::warn!(engine = self.engine, pending = self.pending, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "released_with_pending",
            span_name = name,
            engine = self.engine,
            pending = self.pending,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_initialized_display() {
        let msg = ClientInitialized {
            engine: "stub",
            api_url: "https://api.example.com",
        };
        assert_eq!(
            msg.to_string(),
            "Initialized engine client on stub for https://api.example.com"
        );
    }

    #[test]
    fn test_released_with_pending_display() {
        let msg = ReleasedWithPendingOperations {
            engine: "stub",
            pending: 3,
        };
        assert_eq!(
            msg.to_string(),
            "Releasing engine client on stub with 3 async operation(s) still pending"
        );
    }
}
