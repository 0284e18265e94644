// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging.
//!
//! Every log line the bridge emits is a message type from [`messages`]: a
//! small struct with a `Display` impl and a [`messages::StructuredLog`] impl,
//! so call sites never carry format strings of their own.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - library loading and client lifecycle
//! * `messages::dispatch` - command dispatch and async settlement

pub mod messages;
