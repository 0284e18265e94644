// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod engine;
pub mod runner;

pub use engine::NativeEngine;
pub use runner::CommandRunner;
