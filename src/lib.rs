// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // native library + stub engine
pub mod client;     // engine handle + client facade
pub mod command;    // command/response envelopes
pub mod config;     // config loading + client settings
pub mod dispatch;   // sync/async dispatch, cancellation, result parsing
pub mod errors;     // error handling
pub mod observability;
pub mod traits;     // engine ABI + runner abstraction
