// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// iOS application state via objc2.
//
// Requires compilation with the iOS SDK (Xcode). UIApplication may only be
// touched on the main thread; APNs delegate callbacks and lifecycle
// notifications are delivered there, so off-main queries are reported as
// `Inactive` rather than failing.

#![cfg(target_os = "ios")]

use objc2::MainThreadMarker;
use objc2_ui_kit::{UIApplication, UIApplicationState};
use pushbridge_core::AppState;
use tracing::warn;

use crate::traits::AppStateProvider;

/// [`AppStateProvider`] backed by `UIApplication.applicationState`.
pub struct UiKitAppState;

impl AppStateProvider for UiKitAppState {
    fn app_state(&self) -> AppState {
        let Some(mtm) = MainThreadMarker::new() else {
            warn!("application state queried off the main thread, reporting inactive");
            return AppState::Inactive;
        };

        let app = UIApplication::sharedApplication(mtm);
        let state = app.applicationState();

        if state == UIApplicationState::Active {
            AppState::Active
        } else if state == UIApplicationState::Background {
            AppState::Background
        } else {
            AppState::Inactive
        }
    }
}
