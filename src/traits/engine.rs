// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The six entry points every native engine exposes.
//!
//! Pointer ownership across the boundary:
//!
//! * `init` returns an owned client pointer, released by `free_mem`.
//! * `run_command` returns a buffer owned by the engine; it is valid until the
//!   next call on the same client and must be copied before then.
//! * `run_command_async` returns an owned abort handle (null when the call was
//!   not cancellable). It must be released by exactly one of `free_handle` or
//!   `abort_and_free_handle`.
//! * The result buffer passed to `on_completed` is valid only for the duration
//!   of that call.
//!
//! The completion callback receives nothing but the result, so the host tells
//! concurrent calls apart by handing each one a different function pointer.

use std::ffi::{c_char, c_void};

/// `void* init(const char* settings_json)`
pub type InitFn = unsafe extern "C" fn(settings: *const c_char) -> *mut c_void;

/// `void free_mem(void* client)`
pub type FreeMemFn = unsafe extern "C" fn(client: *mut c_void);

/// `const char* run_command(const char* command_json, void* client)`
pub type RunCommandFn =
    unsafe extern "C" fn(command: *const c_char, client: *mut c_void) -> *const c_char;

/// `void on_completed(const char* result_json)`
pub type OnCompletedFn = unsafe extern "C" fn(result: *const c_char);

/// `void* run_command_async(const char*, void*, on_completed, bool is_cancellable)`
pub type RunCommandAsyncFn = unsafe extern "C" fn(
    command: *const c_char,
    client: *mut c_void,
    on_completed: OnCompletedFn,
    is_cancellable: bool,
) -> *mut c_void;

/// `void abort_and_free_handle(void* handle)`
pub type AbortAndFreeHandleFn = unsafe extern "C" fn(handle: *mut c_void);

/// `void free_handle(void* handle)`
pub type FreeHandleFn = unsafe extern "C" fn(handle: *mut c_void);

/// A native engine reachable through the C ABI.
///
/// Implemented by [`crate::backends::native::NativeLibrary`] for shared
/// libraries and by [`crate::backends::stub::StubEngine`] in-process.
///
/// # Safety
///
/// Every method forwards raw pointers to the engine. Callers must pass
/// pointers obtained from the same engine (client pointers from `init`, abort
/// handles from `run_command_async`) and NUL-terminated UTF-8 strings that
/// outlive the call.
pub trait NativeEngine: Send + Sync {
    /// Human-readable name for log output.
    fn name(&self) -> &str;

    unsafe fn init(&self, settings: *const c_char) -> *mut c_void;

    unsafe fn free_mem(&self, client: *mut c_void);

    unsafe fn run_command(&self, command: *const c_char, client: *mut c_void) -> *const c_char;

    unsafe fn run_command_async(
        &self,
        command: *const c_char,
        client: *mut c_void,
        on_completed: OnCompletedFn,
        is_cancellable: bool,
    ) -> *mut c_void;

    unsafe fn abort_and_free_handle(&self, handle: *mut c_void);

    unsafe fn free_handle(&self, handle: *mut c_void);
}
