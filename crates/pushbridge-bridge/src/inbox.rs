// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application-side receiver for bridged push events.
//
// The inbox keeps what the application may not be ready to consume yet: the
// payload that opened the app, silent pushes received while backgrounded,
// and the last registration outcome. Live events go to an optional callback.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pushbridge_core::error::Result;
use pushbridge_core::payload::json_to_dict;
use pushbridge_core::{FailureOrigin, OpenState, PushPayload, RegistrationStatus};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::traits::{PushCallback, PushHandler};

#[derive(Default)]
struct InboxState {
    callback: Option<Arc<dyn PushCallback>>,
    app_open_payload: Option<String>,
    unprocessed: Vec<Value>,
    registration: RegistrationStatus,
}

/// [`PushHandler`] that stores or dispatches push events for the application.
#[derive(Default)]
pub struct PushInbox {
    state: Mutex<InboxState>,
}

impl PushInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install (or clear, with `None`) the callback for live push events.
    pub fn set_push_callback(&self, callback: Option<Arc<dyn PushCallback>>) {
        self.lock().callback = callback;
    }

    // -- App-open payload ----------------------------------------------------

    /// Whether the app was opened from a notification and the payload has not
    /// been reset yet.
    pub fn is_app_opened_via_push_notification(&self) -> bool {
        self.lock().app_open_payload.is_some()
    }

    /// The payload that opened the app, if any.
    pub fn push_data_used_to_open_app(&self) -> Result<Option<PushPayload>> {
        let raw = self.lock().app_open_payload.clone();
        raw.map(|json| {
            json_to_dict(&json).inspect_err(|e| {
                error!("unable to parse push-open payload '{json}': {e}");
            })
        })
        .transpose()
    }

    pub fn reset_push_data_used_to_open_app(&self) {
        self.lock().app_open_payload = None;
    }

    // -- Unprocessed (silent) pushes -----------------------------------------

    pub fn is_unprocessed_push_data_available(&self) -> bool {
        !self.lock().unprocessed.is_empty()
    }

    /// Silent pushes received so far, oldest first.
    pub fn unprocessed_push_data(&self) -> Vec<Value> {
        self.lock().unprocessed.clone()
    }

    pub fn reset_unprocessed_push_data(&self) {
        self.lock().unprocessed.clear();
    }

    // -- Registration --------------------------------------------------------

    pub fn registration_status(&self) -> RegistrationStatus {
        self.lock().registration.clone()
    }

    fn callback(&self) -> Option<Arc<dyn PushCallback>> {
        self.lock().callback.clone()
    }

    fn lock(&self) -> MutexGuard<'_, InboxState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn parse(payload: &str) -> Option<Value> {
    match json_to_dict(payload) {
        Ok(map) => Some(Value::Object(map)),
        Err(e) => {
            error!("unable to parse push payload '{payload}': {e}");
            None
        }
    }
}

impl PushHandler for PushInbox {
    fn handle_push_open(&self, payload: &str, state: OpenState) {
        debug!(?state, "app about to open via push");
        match state {
            OpenState::Foreground => {
                let Some(json) = parse(payload) else { return };
                if let Some(callback) = self.callback() {
                    callback.on_push_opened(&json);
                }
            }
            OpenState::Background => {
                self.lock().app_open_payload = Some(payload.to_owned());
            }
        }
    }

    fn handle_push_received_foreground(&self, payload: &str) {
        let Some(json) = parse(payload) else { return };
        match self.callback() {
            Some(callback) => {
                let handled = callback.on_push_received_foreground(&json);
                debug!(handled, "foreground push dispatched");
            }
            None => debug!("foreground push dropped, no callback installed"),
        }
    }

    fn handle_push_received_background(&self, payload: &str) {
        let Some(json) = parse(payload) else { return };
        match self.callback() {
            Some(callback) => {
                let handled = callback.on_push_received_background(&json);
                debug!(handled, "background push dispatched");
            }
            None => debug!("background push dropped, no callback installed"),
        }
    }

    fn handle_unprocessed_push_received(&self, payload: &str) -> Option<bool> {
        if let Some(json) = parse(payload) {
            let mut state = self.lock();
            state.unprocessed.push(json);
            debug!(pending = state.unprocessed.len(), "silent push stored");
        }
        None
    }

    fn on_push_registration_success(&self) {
        info!("push registration recorded");
        self.lock().registration = RegistrationStatus::Registered;
    }

    fn on_push_registration_failure(&self, origin: FailureOrigin, error: &str) {
        warn!(%origin, "push registration failure recorded: {error}");
        self.lock().registration = RegistrationStatus::Failed {
            origin,
            error: error.to_owned(),
        };
    }
}
