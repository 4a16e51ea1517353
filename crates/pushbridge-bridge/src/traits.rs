// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions at the two seams of the bridge: the
// host platform that reports lifecycle state, and the application layer that
// consumes push events.

use pushbridge_core::{AppState, FailureOrigin, OpenState};
use serde_json::Value;

/// Reports the current application lifecycle state.
///
/// Implementations only observe; transitions are driven by the OS.
pub trait AppStateProvider: Send + Sync {
    fn app_state(&self) -> AppState;
}

/// Application-layer receiver for everything the bridge forwards.
///
/// Push payloads arrive as JSON object strings. Calls are fire-and-forget:
/// the bridge neither retries nor inspects failures inside a handler.
pub trait PushHandler: Send + Sync {
    /// The app was opened (or brought forward) by tapping a notification.
    fn handle_push_open(&self, payload: &str, state: OpenState);

    /// A push arrived while the app was in the foreground.
    fn handle_push_received_foreground(&self, payload: &str);

    /// A user-visible push arrived while the app was not active.
    fn handle_push_received_background(&self, payload: &str);

    /// A silent push arrived while the app was not active.
    ///
    /// Return `Some(handled)` to override the result reported to the OS, or
    /// `None` to accept the default (handled).
    fn handle_unprocessed_push_received(&self, payload: &str) -> Option<bool>;

    /// Push registration completed.
    fn on_push_registration_success(&self);

    /// Push registration failed. `error` is a free-form diagnostic.
    fn on_push_registration_failure(&self, origin: FailureOrigin, error: &str);
}

/// Callback the application installs on a [`PushInbox`](crate::PushInbox).
pub trait PushCallback: Send + Sync {
    /// Returns whether the application handled the push.
    fn on_push_received_foreground(&self, payload: &Value) -> bool;

    /// Returns whether the application handled the push.
    fn on_push_received_background(&self, payload: &Value) -> bool;

    fn on_push_opened(&self, payload: &Value);
}
