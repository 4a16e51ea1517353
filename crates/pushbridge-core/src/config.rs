// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PushBridgeError, Result};

/// Which value survives when a promoted wrapper key and a top-level sibling
/// share a name during flattening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollisionPolicy {
    /// Application extra data overrides the promoted system key.
    #[default]
    SiblingWins,
    /// The promoted system key overrides the application extra data.
    PromotedWins,
}

/// Settings that shape how payloads are read and normalised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Reserved top-level key holding system push semantics.
    pub wrapper_key: String,
    /// Key in the launch options that carries the push payload, if any.
    pub launch_payload_key: String,
    /// Key collision resolution used by flattening.
    pub collision_policy: CollisionPolicy,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            wrapper_key: "aps".into(),
            launch_payload_key: "UIApplicationLaunchOptionsRemoteNotificationKey".into(),
            collision_policy: CollisionPolicy::SiblingWins,
        }
    }
}

impl BridgeConfig {
    /// Parse a JSON configuration document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let config = Self::from_json(&data)?;
        debug!(path = %path.display(), "bridge config loaded");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.wrapper_key.is_empty() {
            return Err(PushBridgeError::Config("wrapper_key must not be empty".into()));
        }
        if self.launch_payload_key.is_empty() {
            return Err(PushBridgeError::Config(
                "launch_payload_key must not be empty".into(),
            ));
        }
        Ok(())
    }
}
