// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Owned engine client pointer.

use crate::config::ClientSettings;
use crate::errors::{BridgeError, BridgeResult};
use crate::observability::messages::engine::{
    ClientInitFailed, ClientInitialized, ClientReleased, ReleasedWithPendingOperations,
};
use crate::observability::messages::StructuredLog;
use crate::traits::NativeEngine;
use std::ffi::{c_void, CString};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// One engine client created by `init` and released by `free_mem`.
///
/// The handle is not `Clone`: exactly one owner exists, and `free_mem` runs
/// exactly once when that owner is dropped, whichever path it leaves by.
/// [`EngineHandle::close`] is the explicit form of the same release.
pub struct EngineHandle {
    engine: Arc<dyn NativeEngine>,
    client: NonNull<c_void>,
    in_flight: Arc<AtomicUsize>,
}

impl EngineHandle {
    /// Create a client on `engine` with the given settings.
    pub fn open(engine: Arc<dyn NativeEngine>, settings: &ClientSettings) -> BridgeResult<Self> {
        let json = settings
            .to_json()
            .map_err(|e| BridgeError::Encode(e.to_string()))?;
        let json = CString::new(json)?;

        let raw = unsafe { engine.init(json.as_ptr()) };
        let Some(client) = NonNull::new(raw) else {
            ClientInitFailed {
                engine: engine.name(),
            }
            .log();
            return Err(BridgeError::Construction(format!(
                "engine '{}' returned a null client from init",
                engine.name()
            )));
        };

        ClientInitialized {
            engine: engine.name(),
            api_url: &settings.api_url,
        }
        .log();

        Ok(Self {
            engine,
            client,
            in_flight: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn engine(&self) -> &Arc<dyn NativeEngine> {
        &self.engine
    }

    pub(crate) fn client_ptr(&self) -> *mut c_void {
        self.client.as_ptr()
    }

    /// Counter of async operations dispatched on this client that have not
    /// settled yet.
    pub(crate) fn in_flight(&self) -> &Arc<AtomicUsize> {
        &self.in_flight
    }

    pub fn pending_operations(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Release the client now.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        let pending = self.pending_operations();
        if pending > 0 {
            ReleasedWithPendingOperations {
                engine: self.engine.name(),
                pending,
            }
            .log();
        }

        unsafe { self.engine.free_mem(self.client.as_ptr()) };
        ClientReleased {
            engine: self.engine.name(),
        }
        .log();
    }
}

// The engine tolerates concurrent calls on one client, and the pointer is
// only released in Drop, which needs exclusive ownership.
unsafe impl Send for EngineHandle {}
unsafe impl Sync for EngineHandle {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::StubEngine;
    use crate::errors::ErrorKind;

    #[test]
    fn test_open_and_drop_releases_once() {
        let stub = Arc::new(StubEngine::new());
        {
            let _handle = EngineHandle::open(stub.clone(), &ClientSettings::default()).unwrap();
            assert_eq!(stub.ledger().live_clients(), 1);
        }

        let ledger = stub.ledger();
        assert_eq!(ledger.clients_opened, 1);
        assert_eq!(ledger.clients_released, 1);
        assert_eq!(ledger.double_releases, 0);
    }

    #[test]
    fn test_close_releases_once() {
        let stub = Arc::new(StubEngine::new());
        let handle = EngineHandle::open(stub.clone(), &ClientSettings::default()).unwrap();

        handle.close();

        assert_eq!(stub.ledger().clients_released, 1);
        assert_eq!(stub.ledger().double_releases, 0);
    }

    #[test]
    fn test_null_client_is_construction_error() {
        let stub = Arc::new(StubEngine::new().with_failing_init());

        match EngineHandle::open(stub.clone(), &ClientSettings::default()) {
            Err(err) => {
                assert_eq!(err.kind(), ErrorKind::Construction);
                assert!(err.is_fatal());
            }
            Ok(_) => panic!("Expected construction error"),
        }
        assert_eq!(stub.ledger().clients_released, 0);
    }

    #[test]
    fn test_release_on_panic_unwind() {
        let stub = Arc::new(StubEngine::new());
        let engine: Arc<dyn NativeEngine> = stub.clone();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _handle = EngineHandle::open(engine, &ClientSettings::default()).unwrap();
            panic!("owner failed");
        }));

        assert!(result.is_err());
        assert_eq!(stub.ledger().clients_released, 1);
    }

    #[test]
    fn test_handle_moves_across_threads() {
        let stub = Arc::new(StubEngine::new());
        let handle = EngineHandle::open(stub.clone(), &ClientSettings::default()).unwrap();

        std::thread::spawn(move || drop(handle)).join().unwrap();

        assert_eq!(stub.ledger().clients_released, 1);
    }
}
