// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Push bridge — relays native push events to the application layer.
//
// One instance is built at application start and shared by reference with
// the native callbacks (registration, delivery, launch, lifecycle). The only
// state it owns is the buffered "app opened via push" payload; the lifecycle
// state is read from an injected provider.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pushbridge_core::error::Result;
use pushbridge_core::payload::{classify, dict_to_json, flatten_push_payload};
use pushbridge_core::{
    AppState, BridgeConfig, FailureOrigin, FlattenedPayload, OpenState, PushPayload, PushRoute,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::traits::{AppStateProvider, PushHandler};

/// Dispatcher between the native push subsystem and the application layer.
///
/// `PushBridge` is `Send + Sync`. The pending-open buffer is guarded by a
/// mutex so that delivery and the foreground flush may arrive on different
/// threads; handlers are always invoked with the lock released.
pub struct PushBridge {
    config: BridgeConfig,
    app_state: Arc<dyn AppStateProvider>,
    handler: Arc<dyn PushHandler>,
    pending_open: Mutex<Option<String>>,
}

impl std::fmt::Debug for PushBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushBridge")
            .field("config", &self.config)
            .field("app_state", &self.app_state.app_state())
            .field("has_pending_open", &self.has_pending_open())
            .finish()
    }
}

impl PushBridge {
    pub fn new(
        config: BridgeConfig,
        app_state: Arc<dyn AppStateProvider>,
        handler: Arc<dyn PushHandler>,
    ) -> Self {
        Self {
            config,
            app_state,
            handler,
            pending_open: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Current lifecycle state, as reported by the injected provider.
    pub fn app_state(&self) -> AppState {
        self.app_state.app_state()
    }

    /// Whether an "app opened via push" payload is waiting for the foreground.
    pub fn has_pending_open(&self) -> bool {
        self.lock_pending().is_some()
    }

    // -- App opened via push -------------------------------------------------

    /// Forward an "app opened via push" payload, or hold it until the app
    /// becomes active.
    ///
    /// Only the most recent payload is held; an unconsumed one is replaced.
    #[instrument(skip_all, fields(payload_len = payload.len()))]
    pub fn deliver_app_opened_via_push(&self, payload: &str) {
        // The state check and the store happen under one lock so a flush
        // racing with this call either sees the payload or runs after it.
        let mut pending = self.lock_pending();
        if self.app_state().is_foreground() {
            drop(pending);
            debug!("app active, forwarding push-open payload");
            self.handler.handle_push_open(payload, OpenState::Foreground);
            return;
        }

        if pending.replace(payload.to_owned()).is_some() {
            debug!("replaced unconsumed push-open payload");
        } else {
            debug!("holding push-open payload until app becomes active");
        }
    }

    /// Lifecycle hook for the transition to foreground. Flushes the held
    /// payload, if any, exactly once.
    pub fn on_application_became_active(&self) {
        let Some(payload) = self.lock_pending().take() else {
            return;
        };
        self.log_debug_plus_state_info("delivering held push-open payload");
        self.handler.handle_push_open(&payload, OpenState::Foreground);
    }

    /// Launch entry point. Routes push data found in the launch options to
    /// the open handler, tagged with the current state.
    ///
    /// Absent or malformed push data is not an error; the call does nothing.
    pub fn handle_app_opened_via_push(&self, launch_options: Option<&PushPayload>) {
        let key = self.config.launch_payload_key.as_str();
        let Some(launch_payload) = launch_options.and_then(|options| options.get(key)) else {
            return;
        };
        let Value::Object(payload) = launch_payload else {
            debug!(launch_payload_key = key, "launch push data is not an object, ignoring");
            return;
        };

        let json = match self.flattened_json(payload) {
            Ok(json) => json,
            Err(e) => {
                error!("unable to serialize launch push payload: {e}");
                return;
            }
        };

        let state = OpenState::from(self.app_state());
        self.log_debug_plus_state_info("app launched via push");
        self.handler.handle_push_open(&json, state);
    }

    // -- Received pushes -----------------------------------------------------

    /// Classify a received push and route it to the matching handler.
    ///
    /// Returns whether the push counts as handled for the OS transport. This
    /// is `true` unless a silent-push handler reports otherwise.
    #[instrument(skip_all)]
    pub fn handle_push_received(&self, payload: &PushPayload) -> bool {
        let state = self.app_state();
        let route = classify(state, payload, &self.config.wrapper_key);

        let json = match self.flattened_json(payload) {
            Ok(json) => json,
            Err(e) => {
                error!(%route, "unable to serialize push payload: {e}");
                return false;
            }
        };

        debug!(app_state = %state, %route, payload_len = json.len(), "push received");
        match route {
            PushRoute::Foreground => {
                self.handler.handle_push_received_foreground(&json);
                true
            }
            PushRoute::BackgroundAlert => {
                self.handler.handle_push_received_background(&json);
                true
            }
            PushRoute::Silent => self
                .handler
                .handle_unprocessed_push_received(&json)
                .unwrap_or(true),
        }
    }

    // -- Registration --------------------------------------------------------

    pub fn notify_push_registration_success(&self) {
        info!("push registration succeeded");
        self.handler.on_push_registration_success();
    }

    /// Persisting the local installation record failed.
    pub fn notify_save_installation_failure(&self, error: &str) {
        self.forward_registration_failure(FailureOrigin::SaveInstallation, error);
    }

    /// The OS rejected the remote-notification registration.
    pub fn handle_push_registration_error(&self, error: &str) {
        self.forward_registration_failure(FailureOrigin::Registration, error);
    }

    fn forward_registration_failure(&self, origin: FailureOrigin, error: &str) {
        warn!(%origin, "push registration failed: {error}");
        self.handler.on_push_registration_failure(origin, error);
    }

    // -- Payload helpers -----------------------------------------------------

    /// Flatten a payload using this bridge's wrapper key and collision policy.
    pub fn flatten_push_payload(&self, payload: &PushPayload) -> FlattenedPayload {
        flatten_push_payload(payload, &self.config)
    }

    /// Flatten a payload and serialize it to the JSON handed to handlers.
    pub fn flattened_json(&self, payload: &PushPayload) -> Result<String> {
        dict_to_json(&self.flatten_push_payload(payload))
    }

    /// Debug log line annotated with the current lifecycle state.
    pub fn log_debug_plus_state_info(&self, message: &str) {
        debug!(app_state = %self.app_state(), "{message}");
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<String>> {
        // The guarded Option is valid in every state, so a poisoned lock is
        // still safe to use.
        self.pending_open.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use serde_json::json;

    use super::*;
    use crate::lifecycle::LifecycleTracker;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Open(String, OpenState),
        Foreground(String),
        Background(String),
        Unprocessed(String),
        RegistrationSuccess,
        RegistrationFailure(FailureOrigin, String),
    }

    /// Handler that records every call.
    #[derive(Default)]
    struct RecordingHandler {
        events: Mutex<Vec<Event>>,
        silent_result: Option<bool>,
    }

    impl RecordingHandler {
        fn with_silent_result(result: Option<bool>) -> Self {
            Self {
                silent_result: result,
                ..Self::default()
            }
        }

        fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: Event) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl PushHandler for RecordingHandler {
        fn handle_push_open(&self, payload: &str, state: OpenState) {
            self.push(Event::Open(payload.into(), state));
        }

        fn handle_push_received_foreground(&self, payload: &str) {
            self.push(Event::Foreground(payload.into()));
        }

        fn handle_push_received_background(&self, payload: &str) {
            self.push(Event::Background(payload.into()));
        }

        fn handle_unprocessed_push_received(&self, payload: &str) -> Option<bool> {
            self.push(Event::Unprocessed(payload.into()));
            self.silent_result
        }

        fn on_push_registration_success(&self) {
            self.push(Event::RegistrationSuccess);
        }

        fn on_push_registration_failure(&self, origin: FailureOrigin, error: &str) {
            self.push(Event::RegistrationFailure(origin, error.into()));
        }
    }

    fn payload(value: Value) -> PushPayload {
        match value {
            Value::Object(map) => map,
            _ => panic!("test payload must be an object"),
        }
    }

    fn setup(
        state: AppState,
        handler: RecordingHandler,
    ) -> (PushBridge, Arc<LifecycleTracker>, Arc<RecordingHandler>) {
        let tracker = Arc::new(LifecycleTracker::with_state(state));
        let handler = Arc::new(handler);
        let bridge = PushBridge::new(BridgeConfig::default(), tracker.clone(), handler.clone());
        (bridge, tracker, handler)
    }

    // -- Buffering -----------------------------------------------------------

    #[test]
    fn held_payload_is_delivered_once_on_activation() {
        let (bridge, tracker, handler) = setup(AppState::Background, RecordingHandler::default());

        bridge.deliver_app_opened_via_push(r#"{"alert":"hi"}"#);
        assert!(handler.events().is_empty());
        assert!(bridge.has_pending_open());

        tracker.on_resume();
        bridge.on_application_became_active();
        bridge.on_application_became_active();

        assert_eq!(
            handler.events(),
            vec![Event::Open(r#"{"alert":"hi"}"#.into(), OpenState::Foreground)]
        );
        assert!(!bridge.has_pending_open());
    }

    #[test]
    fn last_held_payload_wins() {
        let (bridge, _tracker, handler) = setup(AppState::Background, RecordingHandler::default());

        bridge.deliver_app_opened_via_push("first");
        bridge.deliver_app_opened_via_push("second");
        bridge.on_application_became_active();

        assert_eq!(
            handler.events(),
            vec![Event::Open("second".into(), OpenState::Foreground)]
        );
    }

    #[test]
    fn inactive_state_also_holds_payload() {
        let (bridge, _tracker, handler) = setup(AppState::Inactive, RecordingHandler::default());

        bridge.deliver_app_opened_via_push("p");

        assert!(handler.events().is_empty());
        assert!(bridge.has_pending_open());
    }

    #[test]
    fn active_app_forwards_without_holding() {
        let (bridge, _tracker, handler) = setup(AppState::Active, RecordingHandler::default());

        bridge.deliver_app_opened_via_push("now");

        assert_eq!(handler.events(), vec![Event::Open("now".into(), OpenState::Foreground)]);
        assert!(!bridge.has_pending_open());
    }

    #[test]
    fn activation_with_empty_buffer_is_a_no_op() {
        let (bridge, _tracker, handler) = setup(AppState::Active, RecordingHandler::default());

        bridge.on_application_became_active();
        bridge.on_application_became_active();

        assert!(handler.events().is_empty());
    }

    #[test]
    fn concurrent_deliveries_flush_exactly_one_payload() {
        let (bridge, _tracker, handler) = setup(AppState::Background, RecordingHandler::default());
        let bridge = Arc::new(bridge);

        let workers: Vec<_> = (0..8)
            .map(|i| {
                let bridge = bridge.clone();
                thread::spawn(move || bridge.deliver_app_opened_via_push(&format!("payload-{i}")))
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        bridge.on_application_became_active();
        bridge.on_application_became_active();

        let events = handler.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            Event::Open(p, OpenState::Foreground) if p.starts_with("payload-")
        ));
    }

    // -- Launch options ------------------------------------------------------

    #[test]
    fn launch_with_push_data_routes_flattened_payload_with_state() {
        let (bridge, _tracker, handler) = setup(AppState::Inactive, RecordingHandler::default());
        let options = payload(json!({
            "UIApplicationLaunchOptionsRemoteNotificationKey": {
                "aps": {"alert": "launch"},
                "route": "/inbox"
            }
        }));

        bridge.handle_app_opened_via_push(Some(&options));

        assert_eq!(
            handler.events(),
            vec![Event::Open(
                r#"{"alert":"launch","route":"/inbox"}"#.into(),
                OpenState::Background
            )]
        );
    }

    #[test]
    fn launch_in_foreground_is_tagged_foreground() {
        let (bridge, _tracker, handler) = setup(AppState::Active, RecordingHandler::default());
        let options = payload(json!({
            "UIApplicationLaunchOptionsRemoteNotificationKey": {"aps": {}}
        }));

        bridge.handle_app_opened_via_push(Some(&options));

        assert_eq!(handler.events(), vec![Event::Open("{}".into(), OpenState::Foreground)]);
    }

    #[test]
    fn launch_without_push_data_is_a_no_op() {
        let (bridge, _tracker, handler) = setup(AppState::Inactive, RecordingHandler::default());

        bridge.handle_app_opened_via_push(None);
        bridge.handle_app_opened_via_push(Some(&payload(json!({
            "UIApplicationLaunchOptionsURLKey": "x"
        }))));
        bridge.handle_app_opened_via_push(Some(&payload(json!({
            "UIApplicationLaunchOptionsRemoteNotificationKey": "not an object"
        }))));

        assert!(handler.events().is_empty());
    }

    // -- Classification ------------------------------------------------------

    #[test]
    fn background_alert_overrides_content_available() {
        let (bridge, _tracker, handler) = setup(AppState::Background, RecordingHandler::default());

        let handled = bridge.handle_push_received(&payload(json!({
            "aps": {"alert": "hi", "content-available": 1}
        })));

        assert!(handled);
        assert_eq!(
            handler.events(),
            vec![Event::Background(r#"{"alert":"hi","content-available":1}"#.into())]
        );
    }

    #[test]
    fn background_content_available_goes_to_silent_handler() {
        let (bridge, _tracker, handler) = setup(AppState::Background, RecordingHandler::default());

        let handled = bridge.handle_push_received(&payload(json!({
            "aps": {"content-available": 1},
            "sync": "mail"
        })));

        assert!(handled);
        assert_eq!(
            handler.events(),
            vec![Event::Unprocessed(r#"{"content-available":1,"sync":"mail"}"#.into())]
        );
    }

    #[test]
    fn silent_handler_may_override_result() {
        let (bridge, _tracker, _handler) =
            setup(AppState::Background, RecordingHandler::with_silent_result(Some(false)));

        assert!(!bridge.handle_push_received(&payload(json!({"aps": {"content-available": 1}}))));
    }

    #[test]
    fn background_empty_wrapper_defaults_to_alert_handler() {
        let (bridge, _tracker, handler) = setup(AppState::Background, RecordingHandler::default());

        assert!(bridge.handle_push_received(&payload(json!({"aps": {}}))));
        assert_eq!(handler.events(), vec![Event::Background("{}".into())]);
    }

    #[test]
    fn foreground_always_routes_to_foreground_handler() {
        let (bridge, _tracker, handler) =
            setup(AppState::Active, RecordingHandler::with_silent_result(Some(false)));

        for p in [
            json!({"aps": {"content-available": 1}}),
            json!({"aps": {"alert": "hi"}}),
            json!({"data": 1}),
        ] {
            assert!(bridge.handle_push_received(&payload(p)));
        }

        let events = handler.events();
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| matches!(e, Event::Foreground(_))));
    }

    // -- Registration --------------------------------------------------------

    #[test]
    fn registration_results_are_forwarded() {
        let (bridge, _tracker, handler) = setup(AppState::Active, RecordingHandler::default());

        bridge.notify_push_registration_success();
        bridge.notify_save_installation_failure("disk full");
        bridge.handle_push_registration_error("no aps-environment entitlement");

        assert_eq!(
            handler.events(),
            vec![
                Event::RegistrationSuccess,
                Event::RegistrationFailure(FailureOrigin::SaveInstallation, "disk full".into()),
                Event::RegistrationFailure(
                    FailureOrigin::Registration,
                    "no aps-environment entitlement".into()
                ),
            ]
        );
    }

    #[test]
    fn flatten_helper_uses_bridge_config() {
        let (bridge, _tracker, _handler) = setup(AppState::Active, RecordingHandler::default());
        let input = payload(json!({"aps": {"alert": "message"}, "data": "extra"}));

        assert_eq!(
            bridge.flattened_json(&input).unwrap(),
            r#"{"alert":"message","data":"extra"}"#
        );
    }

    /// Writer that appends formatted log output to a shared buffer.
    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn state_logging_carries_app_state_field() {
        let (bridge, tracker, _handler) = setup(AppState::Background, RecordingHandler::default());
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            bridge.log_debug_plus_state_info("checking in");
            tracker.on_resume();
            bridge.log_debug_plus_state_info("resumed {not a format arg}");
        });

        let output = log.contents();
        assert!(output.contains("checking in"), "{output}");
        assert!(output.contains("app_state=background"), "{output}");
        assert!(output.contains("resumed {not a format arg}"), "{output}");
        assert!(output.contains("app_state=active"), "{output}");
    }
}
