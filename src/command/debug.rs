// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Debug-only operations, served by engines built with debug support.
//!
//! `cancellationTest` keeps an async call open for a fixed time so cancellation
//! can be exercised end to end. `errorTest` always fails with an engine error.

use super::EmptyRequest;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DebugCommand {
    CancellationTest(CancellationTestRequest),
    ErrorTest(EmptyRequest),
}

impl DebugCommand {
    pub fn name(&self) -> &'static str {
        match self {
            DebugCommand::CancellationTest(_) => "debug.cancellationTest",
            DebugCommand::ErrorTest(_) => "debug.errorTest",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationTestRequest {
    pub duration_millis: u64,
}
