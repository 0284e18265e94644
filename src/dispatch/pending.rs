// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Asynchronous dispatch with cooperative cancellation.

use crate::client::EngineHandle;
use crate::command::Command;
use crate::dispatch::operation::{AbortHandle, Operation, Outcome};
use crate::dispatch::{encode, panic_detail, registry};
use crate::errors::BridgeError;
use crate::observability::messages::dispatch::{
    CancelledBeforeDispatch, CommandDispatched, CommandFailed, NativeFault, StrayCallback,
};
use crate::observability::messages::StructuredLog;
use std::ffi::{c_char, CStr};
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Result of [`run_async`]: resolves to the engine's raw result string, or
/// to [`BridgeError::Cancelled`] if the token fired first.
///
/// The command is already running when this is returned, and its
/// cancellation is already registered. Dropping this future does not cancel
/// the command, but cancelling the token still aborts it.
#[must_use = "the command runs regardless, but its result is lost if this is dropped"]
pub struct PendingCommand {
    state: PendingState,
}

enum PendingState {
    Settled(Option<Outcome>),
    Waiting(oneshot::Receiver<Outcome>),
}

impl PendingCommand {
    fn settled(outcome: Outcome) -> Self {
        Self {
            state: PendingState::Settled(Some(outcome)),
        }
    }

    fn waiting(receiver: oneshot::Receiver<Outcome>) -> Self {
        Self {
            state: PendingState::Waiting(receiver),
        }
    }
}

impl Future for PendingCommand {
    type Output = Outcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Outcome> {
        match &mut self.get_mut().state {
            PendingState::Settled(outcome) => Poll::Ready(outcome.take().unwrap_or_else(|| {
                Err(BridgeError::native_boundary("pending command polled after completion"))
            })),
            PendingState::Waiting(receiver) => match Pin::new(receiver).poll(cx) {
                Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
                Poll::Ready(Err(_)) => Poll::Ready(Err(BridgeError::native_boundary(
                    "operation dropped without settling",
                ))),
                Poll::Pending => Poll::Pending,
            },
        }
    }
}

/// Completion handler behind every registry trampoline.
///
/// The result buffer is copied before returning, and no panic escapes into
/// the engine.
pub(crate) unsafe fn on_completed(slot: usize, result: *const c_char) {
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let outcome = unsafe { copy_result(result) };
        match registry::take(slot) {
            Some(op) => {
                op.complete(outcome);
            }
            None => StrayCallback { slot }.log(),
        }
    }));
}

unsafe fn copy_result(result: *const c_char) -> Outcome {
    if result.is_null() {
        return Err(BridgeError::decode("engine completed with a null result"));
    }
    CStr::from_ptr(result)
        .to_str()
        .map(str::to_owned)
        .map_err(|e| BridgeError::decode(format!("result is not valid UTF-8: {e}")))
}

/// Cancel `op` as soon as `token` fires; exit once `op` settles either way.
fn watch(runtime: &Handle, op: Arc<Operation>, token: CancellationToken) {
    let done = op.done();
    runtime.spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {
                op.cancel();
            }
            _ = done.cancelled() => {}
        }
    });
}

fn rejected(command: &'static str, err: BridgeError) -> PendingCommand {
    CommandFailed {
        command,
        error: &err,
    }
    .log();
    PendingCommand::settled(Err(err))
}

/// Start `command` on the engine without blocking.
///
/// `cancel` is the caller's cancellation signal; `None` makes the call
/// uncancellable, and the engine is told so. If the token is already
/// cancelled the engine is never invoked. Otherwise cancellation is watched
/// from a task on the current Tokio runtime, so a cancellable call must be
/// started from within one.
pub fn run_async(
    handle: &EngineHandle,
    command: &Command,
    cancel: Option<CancellationToken>,
) -> PendingCommand {
    let name = command.name();

    if cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
        CancelledBeforeDispatch { command: name }.log();
        return PendingCommand::settled(Err(BridgeError::Cancelled));
    }

    let runtime = match &cancel {
        Some(_) => match Handle::try_current() {
            Ok(runtime) => Some(runtime),
            Err(err) => {
                let err = BridgeError::dispatch(format!(
                    "cancellable commands must start on a Tokio runtime: {err}"
                ));
                return rejected(name, err);
            }
        },
        None => None,
    };

    let request = match encode(command) {
        Ok(request) => request,
        Err(err) => return rejected(name, err),
    };

    let is_cancellable = cancel.is_some();
    CommandDispatched {
        command: name,
        mode: "async",
        cancellable: is_cancellable,
    }
    .log();

    let engine = Arc::clone(handle.engine());
    let (op, receiver) = Operation::new(
        registry::next_id(),
        name,
        Arc::clone(&engine),
        Arc::clone(handle.in_flight()),
        cancel.clone(),
    );

    let Some(route) = registry::claim(&op) else {
        let err = BridgeError::dispatch(format!(
            "all {} completion slots are in use",
            registry::SLOT_COUNT
        ));
        CommandFailed {
            command: name,
            error: &err,
        }
        .log();
        op.fail(err);
        return PendingCommand::waiting(receiver);
    };
    op.bind_route(route.slot);

    let client = handle.client_ptr();
    let started = catch_unwind(AssertUnwindSafe(|| unsafe {
        engine.run_command_async(request.as_ptr(), client, route.callback, is_cancellable)
    }));

    match started {
        Ok(raw) => op.attach(AbortHandle::from_raw(raw)),
        Err(payload) => {
            let detail = panic_detail(payload.as_ref());
            NativeFault {
                command: name,
                detail: &detail,
            }
            .log();
            op.fail(BridgeError::native_boundary(detail));
            return PendingCommand::waiting(receiver);
        }
    }

    if let (Some(runtime), Some(token)) = (runtime, cancel) {
        watch(&runtime, op, token);
    }

    PendingCommand::waiting(receiver)
}
