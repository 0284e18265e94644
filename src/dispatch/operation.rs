// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! One in-flight async command and the one-shot settlement guard that decides
//! whether completion or cancellation gets to finish it.
//!
//! Completion (from the engine's callback thread) and cancellation (from the
//! task watching the caller's token) may run at the same time. Both start by
//! trying to flip `settled` from false to true; only the winner delivers an
//! outcome and releases the abort handle:
//!
//! ```text
//! complete ── token cancelled ─► cancel
//!          ── win ──► send Ok(result) ──► free_handle(handle)
//!          └─ lose ─► drop result
//! cancel   ── win ──► abort_and_free_handle(handle) ──► send Err(Cancelled)
//!          └─ lose ─► nothing
//! ```
//!
//! A completion that arrives after the token fired, but before the watcher
//! got to run, still settles as cancelled.
//!
//! The engine may call back before `run_command_async` has even returned the
//! abort handle. The slot therefore records which path settled, and a handle
//! attached afterwards is released the way the winner would have released it.

use crate::dispatch::registry;
use crate::errors::{BridgeError, BridgeResult};
use crate::observability::messages::dispatch::{LateHandleReleased, OperationSettled};
use crate::observability::messages::StructuredLog;
use crate::traits::NativeEngine;
use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

pub(crate) type Outcome = BridgeResult<String>;

/// How an abort handle is given back to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Release {
    Free,
    Abort,
}

impl Release {
    fn entry_point(self) -> &'static str {
        match self {
            Release::Free => "free_handle",
            Release::Abort => "abort_and_free_handle",
        }
    }
}

/// Abort handle returned by `run_command_async`.
pub(crate) struct AbortHandle(NonNull<c_void>);

impl AbortHandle {
    pub(crate) fn from_raw(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(AbortHandle)
    }
}

// Only ever passed back to the engine that issued it, from whichever thread
// settles the operation.
unsafe impl Send for AbortHandle {}

enum AbortSlot {
    /// `run_command_async` has not returned yet.
    Unset,
    /// The engine issued no handle.
    Absent,
    Live(AbortHandle),
    /// Settled; any handle has been (or will be) released this way.
    Consumed(Release),
}

pub(crate) struct Operation {
    id: usize,
    command: &'static str,
    engine: Arc<dyn NativeEngine>,
    settled: AtomicBool,
    slot: Mutex<AbortSlot>,
    sender: Mutex<Option<oneshot::Sender<Outcome>>>,
    in_flight: Arc<AtomicUsize>,
    /// Registry slot whose trampoline was handed to the engine.
    route: OnceLock<usize>,
    /// The caller's cancellation signal, if the call is cancellable.
    cancel: Option<CancellationToken>,
    /// Fired once the operation settles, by any path.
    done: CancellationToken,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Operation {
    pub(crate) fn new(
        id: usize,
        command: &'static str,
        engine: Arc<dyn NativeEngine>,
        in_flight: Arc<AtomicUsize>,
        cancel: Option<CancellationToken>,
    ) -> (Arc<Self>, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        in_flight.fetch_add(1, Ordering::SeqCst);
        let op = Arc::new(Self {
            id,
            command,
            engine,
            settled: AtomicBool::new(false),
            slot: Mutex::new(AbortSlot::Unset),
            sender: Mutex::new(Some(tx)),
            in_flight,
            route: OnceLock::new(),
            cancel,
            done: CancellationToken::new(),
        });
        (op, rx)
    }

    pub(crate) fn id(&self) -> usize {
        self.id
    }

    #[cfg(test)]
    pub(crate) fn is_settled(&self) -> bool {
        self.settled.load(Ordering::Acquire)
    }

    pub(crate) fn bind_route(&self, slot: usize) {
        let _ = self.route.set(slot);
    }

    /// Cancelled once the operation settles.
    pub(crate) fn done(&self) -> CancellationToken {
        self.done.clone()
    }

    /// Record the handle `run_command_async` returned.
    ///
    /// If the operation already settled, the handle is released right away
    /// using the winning path's release.
    pub(crate) fn attach(&self, handle: Option<AbortHandle>) {
        let late = {
            let mut guard = lock(&self.slot);
            let slot: &mut AbortSlot = &mut guard;
            match *slot {
                AbortSlot::Unset => {
                    *slot = match handle {
                        Some(h) => AbortSlot::Live(h),
                        None => AbortSlot::Absent,
                    };
                    None
                }
                AbortSlot::Consumed(release) => handle.map(|h| (h, release)),
                AbortSlot::Absent | AbortSlot::Live(_) => handle.map(|h| (h, Release::Free)),
            }
        };

        if let Some((handle, release)) = late {
            self.release(handle, release);
            LateHandleReleased {
                operation_id: self.id,
                release: release.entry_point(),
            }
            .log();
        }
    }

    /// Deliver the engine's result. Returns false if the operation had
    /// already settled, in which case nothing is released.
    ///
    /// If the caller's token has fired, the result is dropped and the
    /// operation is cancelled instead.
    pub(crate) fn complete(&self, outcome: Outcome) -> bool {
        if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            return self.cancel();
        }
        if !self.try_settle() {
            return false;
        }
        let label = if outcome.is_ok() { "completed" } else { "failed" };

        self.send(outcome);
        let released = self.consume_slot(Release::Free);
        self.log_settled(label, released);
        true
    }

    /// Cancel the operation. Returns false if it had already settled.
    pub(crate) fn cancel(&self) -> bool {
        if !self.try_settle() {
            return false;
        }

        let released = self.consume_slot(Release::Abort);
        self.send(Err(BridgeError::Cancelled));
        self.log_settled("cancelled", released);
        true
    }

    /// Settle with an error raised before the engine issued anything.
    /// No native cleanup is performed.
    pub(crate) fn fail(&self, err: BridgeError) -> bool {
        if !self.try_settle() {
            return false;
        }
        self.vacate_route();
        self.send(Err(err));
        self.log_settled("failed", false);
        true
    }

    fn try_settle(&self) -> bool {
        let won = self
            .settled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.done.cancel();
        }
        won
    }

    fn send(&self, outcome: Outcome) {
        if let Some(tx) = lock(&self.sender).take() {
            // The receiver is gone if the caller dropped the pending future.
            let _ = tx.send(outcome);
        }
    }

    /// Mark the slot settled and release a live handle. Returns whether a
    /// handle was released.
    fn consume_slot(&self, release: Release) -> bool {
        let previous = std::mem::replace(&mut *lock(&self.slot), AbortSlot::Consumed(release));
        match previous {
            AbortSlot::Live(handle) => {
                self.release(handle, release);
                true
            }
            _ => false,
        }
    }

    fn release(&self, handle: AbortHandle, release: Release) {
        let ptr = handle.0.as_ptr();
        unsafe {
            match release {
                Release::Free => self.engine.free_handle(ptr),
                Release::Abort => self.engine.abort_and_free_handle(ptr),
            }
        }
        // An aborted call never reports back.
        if release == Release::Abort {
            self.vacate_route();
        }
    }

    fn vacate_route(&self) {
        if let Some(slot) = self.route.get() {
            registry::vacate(*slot, self);
        }
    }

    fn log_settled(&self, outcome: &str, released_handle: bool) {
        OperationSettled {
            operation_id: self.id,
            command: self.command,
            outcome,
            released_handle,
        }
        .log();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::ffi::c_char;
    use std::sync::Barrier;
    use std::thread;

    /// Counts releases by entry point.
    #[derive(Default)]
    struct CountingEngine {
        frees: AtomicUsize,
        aborts: AtomicUsize,
    }

    impl CountingEngine {
        fn frees(&self) -> usize {
            self.frees.load(Ordering::SeqCst)
        }

        fn aborts(&self) -> usize {
            self.aborts.load(Ordering::SeqCst)
        }
    }

    impl NativeEngine for CountingEngine {
        fn name(&self) -> &str {
            "counting"
        }

        unsafe fn init(&self, _settings: *const c_char) -> *mut c_void {
            std::ptr::null_mut()
        }

        unsafe fn free_mem(&self, _client: *mut c_void) {}

        unsafe fn run_command(&self, _command: *const c_char, _client: *mut c_void) -> *const c_char {
            std::ptr::null()
        }

        unsafe fn run_command_async(
            &self,
            _command: *const c_char,
            _client: *mut c_void,
            _on_completed: crate::traits::engine::OnCompletedFn,
            _is_cancellable: bool,
        ) -> *mut c_void {
            std::ptr::null_mut()
        }

        unsafe fn abort_and_free_handle(&self, _handle: *mut c_void) {
            self.aborts.fetch_add(1, Ordering::SeqCst);
        }

        unsafe fn free_handle(&self, _handle: *mut c_void) {
            self.frees.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn handle() -> Option<AbortHandle> {
        AbortHandle::from_raw(0x1000 as *mut c_void)
    }

    fn new_op(
        engine: &Arc<CountingEngine>,
    ) -> (Arc<Operation>, oneshot::Receiver<Outcome>, Arc<AtomicUsize>) {
        new_op_with_token(engine, None)
    }

    fn new_op_with_token(
        engine: &Arc<CountingEngine>,
        cancel: Option<CancellationToken>,
    ) -> (Arc<Operation>, oneshot::Receiver<Outcome>, Arc<AtomicUsize>) {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let (op, rx) = Operation::new(
            registry::next_id(),
            "test",
            engine.clone(),
            in_flight.clone(),
            cancel,
        );
        (op, rx, in_flight)
    }

    #[test]
    fn test_completion_then_cancel_is_noop() {
        let engine = Arc::new(CountingEngine::default());
        let (op, mut rx, in_flight) = new_op(&engine);
        op.attach(handle());
        assert_eq!(in_flight.load(Ordering::SeqCst), 1);

        assert!(op.complete(Ok("done".to_string())));
        assert!(!op.cancel());

        assert_eq!(rx.try_recv().unwrap().unwrap(), "done");
        assert_eq!(engine.frees(), 1);
        assert_eq!(engine.aborts(), 0);
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cancel_then_completion_is_dropped() {
        let engine = Arc::new(CountingEngine::default());
        let (op, mut rx, _) = new_op(&engine);
        op.attach(handle());

        assert!(op.cancel());
        assert!(!op.complete(Ok("late".to_string())));

        assert!(rx.try_recv().unwrap().unwrap_err().is_cancelled());
        assert_eq!(engine.aborts(), 1);
        assert_eq!(engine.frees(), 0);
    }

    #[test]
    fn test_completion_before_handle_arrives_frees_late_handle() {
        let engine = Arc::new(CountingEngine::default());
        let (op, mut rx, _) = new_op(&engine);

        assert!(op.complete(Ok("early".to_string())));
        assert_eq!(engine.frees(), 0);
        op.attach(handle());

        assert_eq!(rx.try_recv().unwrap().unwrap(), "early");
        assert_eq!(engine.frees(), 1);
        assert_eq!(engine.aborts(), 0);
    }

    #[test]
    fn test_cancel_before_handle_arrives_aborts_late_handle() {
        let engine = Arc::new(CountingEngine::default());
        let (op, _rx, _) = new_op(&engine);

        assert!(op.cancel());
        op.attach(handle());

        assert_eq!(engine.aborts(), 1);
        assert_eq!(engine.frees(), 0);
    }

    #[test]
    fn test_no_handle_means_no_release() {
        let engine = Arc::new(CountingEngine::default());
        let (op, _rx, _) = new_op(&engine);
        op.attach(None);

        assert!(op.cancel());

        assert_eq!(engine.aborts(), 0);
        assert_eq!(engine.frees(), 0);
        assert!(op.is_settled());
    }

    #[test]
    fn test_fail_performs_no_native_cleanup() {
        let engine = Arc::new(CountingEngine::default());
        let (op, mut rx, in_flight) = new_op(&engine);

        assert!(op.fail(BridgeError::native_boundary("entry point panicked")));
        assert!(!op.cancel());

        assert!(matches!(
            rx.try_recv().unwrap(),
            Err(BridgeError::NativeBoundary(_))
        ));
        assert_eq!(engine.aborts() + engine.frees(), 0);
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_completion_after_token_fired_settles_cancelled() {
        let engine = Arc::new(CountingEngine::default());
        let token = CancellationToken::new();
        let (op, mut rx, in_flight) = new_op_with_token(&engine, Some(token.clone()));
        op.attach(handle());

        token.cancel();
        assert!(op.complete(Ok("too late".to_string())));

        assert!(rx.try_recv().unwrap().unwrap_err().is_cancelled());
        assert_eq!(engine.aborts(), 1);
        assert_eq!(engine.frees(), 0);
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_settling_fires_done_signal() {
        let engine = Arc::new(CountingEngine::default());
        let (op, _rx, _) = new_op(&engine);
        let done = op.done();
        assert!(!done.is_cancelled());

        op.complete(Ok("value".to_string()));

        assert!(done.is_cancelled());
    }

    #[test]
    fn test_abort_vacates_registry_slot() {
        let engine = Arc::new(CountingEngine::default());
        let (op, _rx, _) = new_op(&engine);
        let route = registry::claim(&op).unwrap();
        op.bind_route(route.slot);
        op.attach(handle());
        assert_eq!(registry::occupant(route.slot), Some(op.id()));

        op.cancel();

        assert_ne!(registry::occupant(route.slot), Some(op.id()));
    }

    #[test]
    fn test_fail_vacates_registry_slot() {
        let engine = Arc::new(CountingEngine::default());
        let (op, _rx, _) = new_op(&engine);
        let route = registry::claim(&op).unwrap();
        op.bind_route(route.slot);

        op.fail(BridgeError::native_boundary("entry point panicked"));

        assert_ne!(registry::occupant(route.slot), Some(op.id()));
    }

    #[test]
    fn test_complete_and_cancel_race_releases_exactly_once() {
        const ITERATIONS: usize = 10_000;
        let engine = Arc::new(CountingEngine::default());
        let mut completed = 0;
        let mut cancelled = 0;

        for _ in 0..ITERATIONS {
            let (op, mut rx, _) = new_op(&engine);
            op.attach(handle());
            let barrier = Arc::new(Barrier::new(2));

            let completer = {
                let op = op.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    let spins = rand::thread_rng().gen_range(0..64);
                    barrier.wait();
                    for _ in 0..spins {
                        std::hint::spin_loop();
                    }
                    op.complete(Ok("value".to_string()))
                })
            };

            let spins = rand::thread_rng().gen_range(0..64);
            barrier.wait();
            for _ in 0..spins {
                std::hint::spin_loop();
            }
            let cancel_won = op.cancel();
            let complete_won = completer.join().unwrap();

            assert!(cancel_won ^ complete_won, "exactly one path must settle");
            match rx.try_recv().unwrap() {
                Ok(value) => {
                    assert!(complete_won);
                    assert_eq!(value, "value");
                    completed += 1;
                }
                Err(err) => {
                    assert!(cancel_won);
                    assert!(err.is_cancelled());
                    cancelled += 1;
                }
            }
        }

        assert_eq!(completed + cancelled, ITERATIONS);
        assert_eq!(engine.frees(), completed);
        assert_eq!(engine.aborts(), cancelled);
    }
}
