// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for the command bridge.
//!
//! Every failure a caller can observe while talking to the native engine maps
//! to exactly one [`BridgeError`] variant. Variants are grouped into coarse
//! [`ErrorKind`]s so callers can branch on the category (decode vs engine vs
//! cancellation) without matching on individual variants.

use std::path::PathBuf;
use thiserror::Error;

/// Message used when the engine reports failure without an `errorMessage`.
pub const UNKNOWN_ENGINE_ERROR: &str = "Unknown error.";

/// Errors raised by the bridge between the host and the native engine.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// `init` returned a null client handle.
    #[error("Failed to construct engine client: {0}")]
    Construction(String),

    /// The native library could not be opened.
    #[error("Failed to load engine library '{}': {source}", .path.display())]
    LibraryLoad {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// A required entry point is missing from the native library.
    #[error("Engine library does not export '{symbol}': {source}")]
    SymbolNotFound {
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    /// The command could not be turned into a request buffer.
    #[error("Failed to encode command: {0}")]
    Encode(String),

    /// The engine returned nothing usable: a null buffer, invalid UTF-8,
    /// malformed JSON, or data of the wrong shape.
    #[error("Failed to decode engine response: {0}")]
    Decode(String),

    /// `success` was true but the response carried no `data`.
    #[error("Missing 'data' in successful response.")]
    MalformedSuccess,

    /// The engine reported a failure.
    #[error("{message}")]
    Engine { message: String },

    /// An async command could not be handed to the engine: every completion
    /// slot is taken, or there is no runtime to watch for cancellation.
    #[error("Failed to dispatch command: {0}")]
    Dispatch(String),

    /// The caller cancelled the operation before it completed.
    #[error("Operation was cancelled")]
    Cancelled,

    /// A panic or other fault crossed the native boundary.
    #[error("Native boundary fault: {0}")]
    NativeBoundary(String),
}

/// Coarse classification of a [`BridgeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Construction,
    Encode,
    Decode,
    Dispatch,
    Engine,
    Cancelled,
    NativeBoundary,
}

impl BridgeError {
    pub fn decode(msg: impl Into<String>) -> Self {
        BridgeError::Decode(msg.into())
    }

    pub fn dispatch(msg: impl Into<String>) -> Self {
        BridgeError::Dispatch(msg.into())
    }

    pub fn engine(message: impl Into<String>) -> Self {
        BridgeError::Engine {
            message: message.into(),
        }
    }

    pub fn native_boundary(msg: impl Into<String>) -> Self {
        BridgeError::NativeBoundary(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::Construction(_)
            | BridgeError::LibraryLoad { .. }
            | BridgeError::SymbolNotFound { .. } => ErrorKind::Construction,
            BridgeError::Encode(_) => ErrorKind::Encode,
            BridgeError::Decode(_) | BridgeError::MalformedSuccess => ErrorKind::Decode,
            BridgeError::Dispatch(_) => ErrorKind::Dispatch,
            BridgeError::Engine { .. } => ErrorKind::Engine,
            BridgeError::Cancelled => ErrorKind::Cancelled,
            BridgeError::NativeBoundary(_) => ErrorKind::NativeBoundary,
        }
    }

    /// Malformed-success counts as a decode failure.
    pub fn is_decode(&self) -> bool {
        self.kind() == ErrorKind::Decode
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, BridgeError::Cancelled)
    }

    /// Construction and native-boundary faults leave the client unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Construction | ErrorKind::NativeBoundary
        )
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Decode(err.to_string())
    }
}

impl From<std::ffi::NulError> for BridgeError {
    fn from(err: std::ffi::NulError) -> Self {
        BridgeError::Encode(err.to_string())
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_success_is_decode_kind() {
        assert!(BridgeError::MalformedSuccess.is_decode());
        assert!(BridgeError::decode("bad json").is_decode());
        assert!(!BridgeError::engine("nope").is_decode());
    }

    #[test]
    fn test_engine_error_displays_message_verbatim() {
        let err = BridgeError::engine("Invalid credentials");
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(err.kind(), ErrorKind::Engine);
    }

    #[test]
    fn test_cancelled_is_distinct_outcome() {
        let err = BridgeError::Cancelled;
        assert!(err.is_cancelled());
        assert!(!err.is_decode());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_fatal_kinds() {
        assert!(BridgeError::Construction("null client".into()).is_fatal());
        assert!(BridgeError::native_boundary("panic").is_fatal());
        assert!(!BridgeError::Encode("nul byte".into()).is_fatal());
        assert!(!BridgeError::dispatch("no free completion slot").is_fatal());
    }

    #[test]
    fn test_nul_error_maps_to_encode() {
        let err: BridgeError = std::ffi::CString::new("a\0b").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Encode);
    }
}
