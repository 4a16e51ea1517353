// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pushbridge — core types, payload handling and error definitions shared by
// every platform bridge.

pub mod config;
pub mod error;
pub mod payload;
pub mod types;

pub use config::{BridgeConfig, CollisionPolicy};
pub use error::PushBridgeError;
pub use payload::{dict_to_json, flatten_push_payload};
pub use types::*;
