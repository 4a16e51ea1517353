// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Pushbridge — relays native push notification events to a cross-platform
//! application layer.
//!
//! A [`PushBridge`] is built once at application start with an
//! [`AppStateProvider`] for the host platform and a [`PushHandler`] for the
//! application, then handed by reference to the native callbacks:
//!
//! - launch options → [`PushBridge::handle_app_opened_via_push`]
//! - notification tapped → [`PushBridge::deliver_app_opened_via_push`]
//! - app became active → [`PushBridge::on_application_became_active`]
//! - push delivered → [`PushBridge::handle_push_received`]
//! - registration result → [`PushBridge::notify_push_registration_success`],
//!   [`PushBridge::notify_save_installation_failure`],
//!   [`PushBridge::handle_push_registration_error`]
//!
//! [`PushInbox`] is a ready-made handler for applications that poll for the
//! push that opened them or for silent pushes received in the background.

pub mod bridge;
pub mod inbox;
pub mod lifecycle;
pub mod traits;

#[cfg(target_os = "ios")]
pub mod ios;

pub use bridge::PushBridge;
pub use inbox::PushInbox;
pub use lifecycle::LifecycleTracker;
pub use traits::{AppStateProvider, PushCallback, PushHandler};

use std::sync::Arc;

/// Lifecycle state provider for the target operating system.
///
/// The return type differs per target. iOS queries UIKit directly and hands
/// back a plain provider. Elsewhere the host must drive the tracker from its
/// own lifecycle hooks, so the concrete [`LifecycleTracker`] is returned.
/// Host code that is shared across targets should coerce the result to
/// `Arc<dyn AppStateProvider>` before passing it to [`PushBridge::new`].
#[cfg(target_os = "ios")]
pub fn platform_app_state() -> Arc<dyn AppStateProvider> {
    // iOS: reads `UIApplication.applicationState` through objc2.
    Arc::new(ios::UiKitAppState)
}

/// Lifecycle state provider for the target operating system.
///
/// Android and desktop hosts forward their activity callbacks to the returned
/// [`LifecycleTracker`].
#[cfg(not(target_os = "ios"))]
pub fn platform_app_state() -> Arc<LifecycleTracker> {
    Arc::new(LifecycleTracker::new())
}
