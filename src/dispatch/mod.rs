// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Command dispatch across the native boundary.
//!
//! * [`blocking::run`] - one `run_command` call on the caller's thread
//! * [`pending::run_async`] - `run_command_async` with a completion callback,
//!   raced against an optional cancellation token
//! * [`parser::parse`] - result envelope to typed data or error
//!
//! Both dispatchers return the engine's raw result string; parsing is a
//! separate step so callers can choose the target type.

pub mod blocking;
mod operation;
pub mod parser;
pub mod pending;
mod registry;


pub use blocking::run;
pub use parser::{parse, parse_envelope};
pub use pending::{run_async, PendingCommand};

use crate::command::Command;
use crate::errors::{BridgeError, BridgeResult};
use std::any::Any;
use std::ffi::CString;

/// Serialize a command into the NUL-terminated buffer the engine reads.
fn encode(command: &Command) -> BridgeResult<CString> {
    let json = command
        .to_json()
        .map_err(|e| BridgeError::Encode(e.to_string()))?;
    Ok(CString::new(json)?)
}

/// Best-effort text of a caught panic payload.
fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
