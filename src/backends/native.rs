// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Native engine loaded from a shared library.

use crate::errors::{BridgeError, BridgeResult};
use crate::observability::messages::engine::{LibraryLoadFailed, LibraryLoaded};
use crate::observability::messages::StructuredLog;
use crate::traits::engine::{
    AbortAndFreeHandleFn, FreeHandleFn, FreeMemFn, InitFn, OnCompletedFn, RunCommandAsyncFn,
    RunCommandFn,
};
use crate::traits::NativeEngine;
use libloading::Library;
use std::ffi::{c_char, c_void};
use std::path::Path;
use std::sync::Arc;

/// An engine shared library with its six entry points resolved.
pub struct NativeLibrary {
    // Keeps the function pointers below valid.
    #[allow(dead_code)]
    library: Library,
    path: String,
    init: InitFn,
    free_mem: FreeMemFn,
    run_command: RunCommandFn,
    run_command_async: RunCommandAsyncFn,
    abort_and_free_handle: AbortAndFreeHandleFn,
    free_handle: FreeHandleFn,
}

/// Resolve one exported function, copying the pointer out of the symbol.
///
/// # Safety
///
/// `T` must match the exported function's real signature.
unsafe fn resolve<T: Copy>(library: &Library, symbol: &'static str) -> BridgeResult<T> {
    let name = format!("{symbol}\0");
    library
        .get::<T>(name.as_bytes())
        .map(|s| *s)
        .map_err(|source| BridgeError::SymbolNotFound { symbol, source })
}

impl NativeLibrary {
    /// Open the engine library at `path` and resolve its entry points.
    ///
    /// # Safety
    ///
    /// Loading runs the library's initializers, and the resolved symbols are
    /// trusted to have the documented signatures. Only load engine builds you
    /// trust.
    pub fn load<P: AsRef<Path>>(path: P) -> BridgeResult<Arc<Self>> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let result = Self::open(path, &path_str);
        match &result {
            Ok(_) => LibraryLoaded {
                library_path: &path_str,
            }
            .log(),
            Err(err) => LibraryLoadFailed {
                library_path: &path_str,
                error: err,
            }
            .log(),
        }
        result.map(Arc::new)
    }

    fn open(path: &Path, path_str: &str) -> BridgeResult<Self> {
        let library = unsafe { Library::new(path) }.map_err(|source| BridgeError::LibraryLoad {
            path: path.to_path_buf(),
            source,
        })?;

        unsafe {
            Ok(Self {
                init: resolve(&library, "init")?,
                free_mem: resolve(&library, "free_mem")?,
                run_command: resolve(&library, "run_command")?,
                run_command_async: resolve(&library, "run_command_async")?,
                abort_and_free_handle: resolve(&library, "abort_and_free_handle")?,
                free_handle: resolve(&library, "free_handle")?,
                path: path_str.to_string(),
                library,
            })
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl NativeEngine for NativeLibrary {
    fn name(&self) -> &str {
        &self.path
    }

    unsafe fn init(&self, settings: *const c_char) -> *mut c_void {
        (self.init)(settings)
    }

    unsafe fn free_mem(&self, client: *mut c_void) {
        (self.free_mem)(client)
    }

    unsafe fn run_command(&self, command: *const c_char, client: *mut c_void) -> *const c_char {
        (self.run_command)(command, client)
    }

    unsafe fn run_command_async(
        &self,
        command: *const c_char,
        client: *mut c_void,
        on_completed: OnCompletedFn,
        is_cancellable: bool,
    ) -> *mut c_void {
        (self.run_command_async)(command, client, on_completed, is_cancellable)
    }

    unsafe fn abort_and_free_handle(&self, handle: *mut c_void) {
        (self.abort_and_free_handle)(handle)
    }

    unsafe fn free_handle(&self, handle: *mut c_void) {
        (self.free_handle)(handle)
    }
}

// Only function pointers and the library handle are stored; the engine ABI
// requires its entry points to be callable from any thread.
unsafe impl Send for NativeLibrary {}
unsafe impl Sync for NativeLibrary {}
