// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Pushbridge.

use thiserror::Error;

/// Top-level error type for all bridge operations.
#[derive(Debug, Error)]
pub enum PushBridgeError {
    // -- Payload errors --
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid push payload: {0}")]
    InvalidPayload(String),

    // -- Configuration --
    #[error("invalid bridge configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PushBridgeError>;
