// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod bridge;
mod config;

pub use bridge::{BridgeError, BridgeResult, ErrorKind, UNKNOWN_ENGINE_ERROR};
pub use config::ConfigError;
