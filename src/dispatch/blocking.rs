// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Synchronous dispatch: one call to `run_command`, blocking the caller.

use crate::client::EngineHandle;
use crate::command::Command;
use crate::dispatch::{encode, panic_detail};
use crate::errors::{BridgeError, BridgeResult};
use crate::observability::messages::dispatch::{CommandDispatched, CommandFailed, NativeFault};
use crate::observability::messages::StructuredLog;
use std::ffi::CStr;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Run `command` and return the engine's raw result string.
///
/// The engine's buffer is copied before returning; the caller owns the
/// returned `String`. Blocks the calling thread for the duration of the
/// engine call.
pub fn run(handle: &EngineHandle, command: &Command) -> BridgeResult<String> {
    let name = command.name();
    let result = dispatch(handle, command);
    if let Err(err) = &result {
        CommandFailed {
            command: name,
            error: err,
        }
        .log();
    }
    result
}

fn dispatch(handle: &EngineHandle, command: &Command) -> BridgeResult<String> {
    let request = encode(command)?;
    CommandDispatched {
        command: command.name(),
        mode: "sync",
        cancellable: false,
    }
    .log();

    let engine = handle.engine();
    let client = handle.client_ptr();

    let copied = catch_unwind(AssertUnwindSafe(|| unsafe {
        let raw = engine.run_command(request.as_ptr(), client);
        if raw.is_null() {
            return Err(BridgeError::decode("engine returned a null result"));
        }
        CStr::from_ptr(raw)
            .to_str()
            .map(str::to_owned)
            .map_err(|e| BridgeError::decode(format!("result is not valid UTF-8: {e}")))
    }));

    copied.unwrap_or_else(|payload| {
        let detail = panic_detail(payload.as_ref());
        NativeFault {
            command: command.name(),
            detail: &detail,
        }
        .log();
        Err(BridgeError::native_boundary(detail))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::StubEngine;
    use crate::command::{ProjectGetRequest, ProjectsCommand, SyncRequest};
    use crate::config::ClientSettings;
    use std::sync::Arc;

    fn open(stub: &Arc<StubEngine>) -> EngineHandle {
        EngineHandle::open(stub.clone(), &ClientSettings::default()).unwrap()
    }

    #[test]
    fn test_round_trip_through_echo_engine() {
        let stub = Arc::new(StubEngine::new());
        let handle = open(&stub);
        let command = Command::Projects(ProjectsCommand::Get(ProjectGetRequest {
            id: "p-1".to_string(),
        }));

        let raw = run(&handle, &command).unwrap();

        assert_eq!(
            raw,
            r#"{"success":true,"data":{"projects":{"get":{"id":"p-1"}}}}"#
        );
        assert_eq!(stub.ledger().sync_calls, 1);
    }

    #[test]
    fn test_null_result_is_decode_error() {
        let stub = Arc::new(StubEngine::new().with_null_results());
        let handle = open(&stub);

        let err = run(&handle, &Command::Sync(SyncRequest::default())).unwrap_err();

        assert!(matches!(err, BridgeError::Decode(_)));
    }

    #[test]
    fn test_result_outlives_next_call() {
        let stub = Arc::new(StubEngine::new());
        let handle = open(&stub);

        let first = run(&handle, &Command::Sync(SyncRequest::default())).unwrap();
        let second = run(
            &handle,
            &Command::Sync(SyncRequest {
                exclude_subdomains: Some(true),
            }),
        )
        .unwrap();
        drop(handle);

        assert_eq!(first, r#"{"success":true,"data":{"sync":{}}}"#);
        assert!(second.contains("excludeSubdomains"));
    }
}
