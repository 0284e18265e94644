// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process engine that implements the native contract without a shared
//! library.
//!
//! The stub echoes every command back as the `data` of a success envelope,
//! answers `debug.errorTest` with an engine error, and keeps a [`Ledger`] of
//! every client and abort handle it hands out and how each one was released.
//! A released client or handle is forgotten; releasing it again (or releasing
//! an id never issued) is counted in the ledger rather than freeing memory
//! twice, so tests can assert on it.
//!
//! Client and abort handles are opaque ids cast to pointers; they are never
//! dereferenced.

use crate::command::{Command, DebugCommand, Response};
use crate::traits::engine::OnCompletedFn;
use crate::traits::NativeEngine;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::ffi::{c_char, c_void, CStr, CString};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

/// Engine error returned for `debug.errorTest`.
pub const ERROR_TEST_MESSAGE: &str = "This is an error.";

/// When the stub invokes the completion callback for an async command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionMode {
    /// Before `run_command_async` returns, on the calling thread.
    Immediate,
    /// On a separate engine thread after `delay`. `debug.cancellationTest`
    /// waits for its own duration instead when that is longer.
    Threaded { delay: Duration },
    /// Held until [`StubEngine::complete_pending`] or
    /// [`StubEngine::complete_next`] is called.
    Manual,
    /// `run_command_async` panics before issuing anything.
    Panic,
}

/// Counts of everything the stub has handed out and taken back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ledger {
    pub clients_opened: usize,
    pub clients_released: usize,
    pub sync_calls: usize,
    pub async_calls: usize,
    pub handles_issued: usize,
    pub handles_freed: usize,
    pub handles_aborted: usize,
    pub callbacks_fired: usize,
    /// Releases of a client or handle that was already released or never issued.
    pub double_releases: usize,
}

impl Ledger {
    /// Abort handles issued but not yet released by either path.
    pub fn live_handles(&self) -> usize {
        self.handles_issued
            .saturating_sub(self.handles_freed + self.handles_aborted)
    }

    pub fn live_clients(&self) -> usize {
        self.clients_opened.saturating_sub(self.clients_released)
    }
}

#[derive(Default)]
struct Counters {
    clients_opened: AtomicUsize,
    clients_released: AtomicUsize,
    sync_calls: AtomicUsize,
    async_calls: AtomicUsize,
    handles_issued: AtomicUsize,
    handles_freed: AtomicUsize,
    handles_aborted: AtomicUsize,
    callbacks_fired: AtomicUsize,
    double_releases: AtomicUsize,
}

impl Counters {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallState {
    Pending,
    Fired,
    Aborted,
}

/// One outstanding `run_command_async` call.
struct PendingCall {
    callback: OnCompletedFn,
    response: CString,
    state: Mutex<CallState>,
    counters: Arc<Counters>,
}

impl PendingCall {
    /// Invoke the callback unless the call was aborted or already fired.
    ///
    /// The call is marked fired before the callback runs, so the callback
    /// may release the call's own handle, and an abort that comes after
    /// this point does not stop it.
    fn fire(&self) -> bool {
        {
            let mut state = lock(&self.state);
            if *state != CallState::Pending {
                return false;
            }
            *state = CallState::Fired;
        }
        Counters::bump(&self.counters.callbacks_fired);
        unsafe { (self.callback)(self.response.as_ptr()) };
        true
    }

    fn abort(&self) {
        let mut state = lock(&self.state);
        if *state == CallState::Pending {
            *state = CallState::Aborted;
        }
    }
}

#[derive(Default)]
struct ClientState {
    // Result buffers stay valid until the client is released.
    results: Vec<CString>,
}

/// An in-process [`NativeEngine`] for tests and offline runs.
pub struct StubEngine {
    completion: CompletionMode,
    fail_init: bool,
    null_results: bool,
    canned_response: Option<String>,
    next_id: AtomicUsize,
    clients: Mutex<HashMap<usize, ClientState>>,
    /// Live abort handles only.
    handles: Mutex<HashMap<usize, Arc<PendingCall>>>,
    queue: Mutex<VecDeque<Arc<PendingCall>>>,
    counters: Arc<Counters>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for StubEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StubEngine {
    pub fn new() -> Self {
        Self {
            completion: CompletionMode::Immediate,
            fail_init: false,
            null_results: false,
            canned_response: None,
            next_id: AtomicUsize::new(1),
            clients: Mutex::new(HashMap::new()),
            handles: Mutex::new(HashMap::new()),
            queue: Mutex::new(VecDeque::new()),
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn with_completion(mut self, completion: CompletionMode) -> Self {
        self.completion = completion;
        self
    }

    /// Make `init` return a null client.
    pub fn with_failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Make `run_command` return a null buffer.
    pub fn with_null_results(mut self) -> Self {
        self.null_results = true;
        self
    }

    /// Answer every command, sync or async, with `raw` verbatim.
    pub fn with_response(mut self, raw: impl Into<String>) -> Self {
        self.canned_response = Some(raw.into());
        self
    }

    pub fn ledger(&self) -> Ledger {
        let c = &self.counters;
        let get = |counter: &AtomicUsize| counter.load(Ordering::SeqCst);
        Ledger {
            clients_opened: get(&c.clients_opened),
            clients_released: get(&c.clients_released),
            sync_calls: get(&c.sync_calls),
            async_calls: get(&c.async_calls),
            handles_issued: get(&c.handles_issued),
            handles_freed: get(&c.handles_freed),
            handles_aborted: get(&c.handles_aborted),
            callbacks_fired: get(&c.callbacks_fired),
            double_releases: get(&c.double_releases),
        }
    }

    /// Calls held by [`CompletionMode::Manual`] that have not been completed.
    pub fn pending_count(&self) -> usize {
        lock(&self.queue).len()
    }

    /// Complete the oldest held call. Returns whether a callback fired; an
    /// aborted call is dropped without firing.
    pub fn complete_next(&self) -> bool {
        let next = lock(&self.queue).pop_front();
        next.map(|call| call.fire()).unwrap_or(false)
    }

    /// Complete every held call and return how many callbacks fired.
    pub fn complete_pending(&self) -> usize {
        let calls: Vec<_> = lock(&self.queue).drain(..).collect();
        calls.iter().filter(|call| call.fire()).count()
    }

    fn next_id(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn double_release(&self) {
        Counters::bump(&self.counters.double_releases);
    }

    /// Build the response envelope for a command, and how long a threaded
    /// completion should wait before delivering it.
    unsafe fn respond(&self, command: *const c_char) -> (String, Option<Duration>) {
        if let Some(raw) = &self.canned_response {
            return (raw.clone(), None);
        }
        if command.is_null() {
            return (Response::<()>::error("Command is null").to_json(), None);
        }

        let text = match CStr::from_ptr(command).to_str() {
            Ok(text) => text,
            Err(err) => {
                let msg = format!("Command is not valid UTF-8: {err}");
                return (Response::<()>::error(msg).to_json(), None);
            }
        };

        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(err) => {
                let msg = format!("Invalid command: {err}");
                return (Response::<()>::error(msg).to_json(), None);
            }
        };

        match serde_json::from_value::<Command>(value.clone()) {
            Ok(Command::Debug(DebugCommand::ErrorTest(_))) => {
                (Response::<()>::error(ERROR_TEST_MESSAGE).to_json(), None)
            }
            Ok(Command::Debug(DebugCommand::CancellationTest(req))) => (
                Response::ok(value).to_json(),
                Some(Duration::from_millis(req.duration_millis)),
            ),
            Ok(_) => (Response::ok(value).to_json(), None),
            Err(err) => {
                let msg = format!("Invalid command: {err}");
                (Response::<()>::error(msg).to_json(), None)
            }
        }
    }

    fn client_is_live(&self, client: *mut c_void) -> bool {
        lock(&self.clients).contains_key(&(client as usize))
    }
}

impl NativeEngine for StubEngine {
    fn name(&self) -> &str {
        "stub"
    }

    unsafe fn init(&self, settings: *const c_char) -> *mut c_void {
        if self.fail_init || settings.is_null() {
            return std::ptr::null_mut();
        }
        let valid = CStr::from_ptr(settings)
            .to_str()
            .ok()
            .and_then(|s| serde_json::from_str::<Value>(s).ok())
            .map(|v| v.is_object())
            .unwrap_or(false);
        if !valid {
            return std::ptr::null_mut();
        }

        let id = self.next_id();
        lock(&self.clients).insert(id, ClientState::default());
        Counters::bump(&self.counters.clients_opened);
        id as *mut c_void
    }

    unsafe fn free_mem(&self, client: *mut c_void) {
        let released = lock(&self.clients).remove(&(client as usize));
        match released {
            Some(_) => Counters::bump(&self.counters.clients_released),
            None => self.double_release(),
        }
    }

    unsafe fn run_command(&self, command: *const c_char, client: *mut c_void) -> *const c_char {
        Counters::bump(&self.counters.sync_calls);
        if self.null_results {
            return std::ptr::null();
        }

        let response = if self.client_is_live(client) {
            self.respond(command).0
        } else {
            Response::<()>::error("Invalid client").to_json()
        };
        let Ok(buffer) = CString::new(response) else {
            return std::ptr::null();
        };

        let mut clients = lock(&self.clients);
        match clients.get_mut(&(client as usize)) {
            Some(state) => {
                let ptr = buffer.as_ptr();
                state.results.push(buffer);
                ptr
            }
            None => std::ptr::null(),
        }
    }

    unsafe fn run_command_async(
        &self,
        command: *const c_char,
        client: *mut c_void,
        on_completed: OnCompletedFn,
        is_cancellable: bool,
    ) -> *mut c_void {
        Counters::bump(&self.counters.async_calls);
        if self.completion == CompletionMode::Panic {
            panic!("stub engine fault in run_command_async");
        }

        let (response, duration) = if self.client_is_live(client) {
            self.respond(command)
        } else {
            (Response::<()>::error("Invalid client").to_json(), None)
        };
        let response = CString::new(response).unwrap_or_default();

        let call = Arc::new(PendingCall {
            callback: on_completed,
            response,
            state: Mutex::new(CallState::Pending),
            counters: Arc::clone(&self.counters),
        });

        let handle = if is_cancellable {
            let id = self.next_id();
            lock(&self.handles).insert(id, Arc::clone(&call));
            Counters::bump(&self.counters.handles_issued);
            id as *mut c_void
        } else {
            std::ptr::null_mut()
        };

        match self.completion {
            CompletionMode::Threaded { delay } => {
                let wait = duration.map_or(delay, |d| d.max(delay));
                thread::spawn(move || {
                    thread::sleep(wait);
                    call.fire();
                });
            }
            CompletionMode::Manual => lock(&self.queue).push_back(call),
            _ => {
                call.fire();
            }
        }

        handle
    }

    unsafe fn abort_and_free_handle(&self, handle: *mut c_void) {
        let call = lock(&self.handles).remove(&(handle as usize));
        match call {
            Some(call) => {
                Counters::bump(&self.counters.handles_aborted);
                call.abort();
            }
            None => self.double_release(),
        }
    }

    unsafe fn free_handle(&self, handle: *mut c_void) {
        let call = lock(&self.handles).remove(&(handle as usize));
        match call {
            Some(_) => Counters::bump(&self.counters.handles_freed),
            None => self.double_release(),
        }
    }
}
