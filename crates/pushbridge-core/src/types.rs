// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the push notification bridge.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw payload delivered by the OS push transport.
///
/// System-level keys live under the reserved wrapper key (`aps` by default);
/// application-defined extra data sits next to it at the top level.
pub type PushPayload = Map<String, Value>;

/// A [`PushPayload`] whose wrapper children have been promoted to the top level.
pub type FlattenedPayload = Map<String, Value>;

/// Application lifecycle state as reported by the host platform.
///
/// The bridge never drives these transitions; it only reads them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppState {
    /// Receiving user interaction.
    Active,
    /// Process alive but not visible.
    Background,
    /// Transitional (launching, being interrupted, resigning active).
    Inactive,
}

impl AppState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Background => "background",
            Self::Inactive => "inactive",
        }
    }

    /// Whether the application is in the foreground.
    pub fn is_foreground(self) -> bool {
        self == Self::Active
    }
}

impl std::fmt::Display for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State tag passed along with an "app opened via push" payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpenState {
    Foreground,
    Background,
}

impl From<AppState> for OpenState {
    fn from(state: AppState) -> Self {
        if state.is_foreground() {
            Self::Foreground
        } else {
            Self::Background
        }
    }
}

/// Handler a received push is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PushRoute {
    /// App is active; the foreground handler sees every payload.
    Foreground,
    /// Backgrounded and the payload carries a user-visible alert (or nothing
    /// that marks it as silent).
    BackgroundAlert,
    /// Backgrounded, no alert, `content-available` set.
    Silent,
}

impl PushRoute {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Foreground => "foreground",
            Self::BackgroundAlert => "background-alert",
            Self::Silent => "silent",
        }
    }
}

impl std::fmt::Display for PushRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a push registration failure originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureOrigin {
    /// Persisting the local installation record failed.
    SaveInstallation,
    /// The OS refused or failed the remote-notification registration.
    Registration,
}

impl std::fmt::Display for FailureOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SaveInstallation => write!(f, "save-installation"),
            Self::Registration => write!(f, "registration"),
        }
    }
}

/// Last known outcome of push registration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RegistrationStatus {
    /// No result reported yet.
    #[default]
    Pending,
    Registered,
    Failed { origin: FailureOrigin, error: String },
}
