// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Lifecycle tracker driven by host callbacks.
//
// Hosts without a queryable application state (Android activities, desktop
// shells, tests) forward their lifecycle hooks here instead.

use std::sync::atomic::{AtomicU8, Ordering};

use pushbridge_core::AppState;
use tracing::trace;

use crate::traits::AppStateProvider;

const ACTIVE: u8 = 0;
const BACKGROUND: u8 = 1;
const INACTIVE: u8 = 2;

/// Lock-free [`AppStateProvider`] updated from the host's lifecycle hooks.
///
/// Starts out `Inactive`, matching an app that is still launching.
#[derive(Debug)]
pub struct LifecycleTracker {
    state: AtomicU8,
}

impl Default for LifecycleTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self::with_state(AppState::Inactive)
    }

    pub fn with_state(state: AppState) -> Self {
        Self {
            state: AtomicU8::new(encode(state)),
        }
    }

    /// Host activity resumed; the app is in the foreground.
    pub fn on_resume(&self) {
        self.set(AppState::Active);
    }

    /// Host activity paused or was sent to the background.
    pub fn on_pause(&self) {
        self.set(AppState::Background);
    }

    /// The app is about to lose focus (incoming call, app switcher, launch).
    pub fn on_will_resign(&self) {
        self.set(AppState::Inactive);
    }

    pub fn set(&self, state: AppState) {
        let previous = decode(self.state.swap(encode(state), Ordering::AcqRel));
        trace!(from = %previous, to = %state, "app state changed");
    }
}

impl AppStateProvider for LifecycleTracker {
    fn app_state(&self) -> AppState {
        decode(self.state.load(Ordering::Acquire))
    }
}

fn encode(state: AppState) -> u8 {
    match state {
        AppState::Active => ACTIVE,
        AppState::Background => BACKGROUND,
        AppState::Inactive => INACTIVE,
    }
}

fn decode(raw: u8) -> AppState {
    match raw {
        ACTIVE => AppState::Active,
        BACKGROUND => AppState::Background,
        _ => AppState::Inactive,
    }
}
