// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Engine backends.
//!
//! Both backends implement [`NativeEngine`], so everything above this layer
//! is written once against the trait.
//!
//! # Available Backends
//!
//! ## Native Backend
//! A shared library exporting the six engine entry points, opened with
//! `libloading`. This is what production runs use.
//!
//! ## Stub Backend
//! An in-process engine that echoes commands and records every handle it
//! issues and releases:
//! - **Completion modes**: immediate, threaded, manual, panicking
//! - **Ledger**: counts of issued, freed, aborted and double-released handles
//! - **Use Case**: unit and integration tests, offline CLI runs
//!
//! # Selection
//!
//! ```text
//! BridgeConfig.library = Some(path) → NativeLibrary::load(path)
//! BridgeConfig.library = None       → StubEngine::new()
//! ```

pub mod native;
pub mod stub;

use crate::config::BridgeConfig;
use crate::errors::BridgeResult;
use crate::traits::NativeEngine;
use std::sync::Arc;

/// Open the engine named by the config.
pub fn open_engine(config: &BridgeConfig) -> BridgeResult<Arc<dyn NativeEngine>> {
    match &config.library {
        Some(path) => Ok(native::NativeLibrary::load(path)?),
        None => {
            tracing::info!("No engine library configured, using the in-process stub engine");
            Ok(Arc::new(stub::StubEngine::new()))
        }
    }
}
