// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Push payload normalisation and classification.
//
// APNs places system keys under `aps` and application data next to it:
//
//   {"aps":{"alert":"message"},"data":"extra"}
//
// Other platforms deliver a single flat object, so before a payload crosses
// into the application layer the wrapper's children are promoted:
//
//   {"alert":"message","data":"extra"}

use serde::Serialize;
use serde_json::Value;

use crate::config::{BridgeConfig, CollisionPolicy};
use crate::error::{PushBridgeError, Result};
use crate::types::{AppState, FlattenedPayload, PushPayload, PushRoute};

/// Key inside the wrapper that carries the user-visible alert.
pub const ALERT_KEY: &str = "alert";
/// Key inside the wrapper that marks a silent (background fetch) push.
pub const CONTENT_AVAILABLE_KEY: &str = "content-available";

// ---------------------------------------------------------------------------
// Flattening
// ---------------------------------------------------------------------------

/// Promote every key under the wrapper to the top level and merge it with the
/// sibling keys. The input is left untouched.
///
/// Collisions between a promoted key and a sibling are resolved by
/// `config.collision_policy`. A wrapper whose value is not an object is kept
/// as an ordinary key.
pub fn flatten_push_payload(payload: &PushPayload, config: &BridgeConfig) -> FlattenedPayload {
    let wrapper_key = config.wrapper_key.as_str();
    let Some(Value::Object(promoted)) = payload.get(wrapper_key) else {
        return payload.clone();
    };

    let siblings = payload.iter().filter(|(key, _)| key.as_str() != wrapper_key);

    let mut flat = FlattenedPayload::new();
    match config.collision_policy {
        CollisionPolicy::SiblingWins => {
            flat.extend(promoted.iter().map(|(k, v)| (k.clone(), v.clone())));
            flat.extend(siblings.map(|(k, v)| (k.clone(), v.clone())));
        }
        CollisionPolicy::PromotedWins => {
            flat.extend(siblings.map(|(k, v)| (k.clone(), v.clone())));
            flat.extend(promoted.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }
    flat
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

/// Serialize a mapping to a compact JSON string.
///
/// Fails with [`PushBridgeError::Serialization`] when the value cannot be
/// represented as JSON (non-string map keys, a failing `Serialize` impl).
/// No partial output is ever returned.
pub fn dict_to_json<T: Serialize + ?Sized>(dict: &T) -> Result<String> {
    Ok(serde_json::to_string(dict)?)
}

/// Parse a JSON object produced by [`dict_to_json`] back into a payload.
pub fn json_to_dict(json: &str) -> Result<PushPayload> {
    match serde_json::from_str(json)? {
        Value::Object(map) => Ok(map),
        other => Err(PushBridgeError::InvalidPayload(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Whether the wrapper contains an `alert` entry. Presence is what counts;
/// an explicit `null` still marks the push as alerting.
pub fn has_alert(payload: &PushPayload, wrapper_key: &str) -> bool {
    wrapped(payload, wrapper_key).is_some_and(|aps| aps.contains_key(ALERT_KEY))
}

/// Whether the wrapper's `content-available` is set: a non-zero number,
/// `true`, or the string `"1"`.
pub fn is_content_available(payload: &PushPayload, wrapper_key: &str) -> bool {
    match wrapped(payload, wrapper_key).and_then(|aps| aps.get(CONTENT_AVAILABLE_KEY)) {
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim() == "1",
        _ => false,
    }
}

/// Decide which handler a received push goes to.
///
/// In order: foreground always wins; in the background an alert outranks
/// `content-available`; a payload with neither takes the alert path.
pub fn classify(state: AppState, payload: &PushPayload, wrapper_key: &str) -> PushRoute {
    if state.is_foreground() {
        PushRoute::Foreground
    } else if has_alert(payload, wrapper_key) {
        PushRoute::BackgroundAlert
    } else if is_content_available(payload, wrapper_key) {
        PushRoute::Silent
    } else {
        PushRoute::BackgroundAlert
    }
}

fn wrapped<'a>(payload: &'a PushPayload, wrapper_key: &str) -> Option<&'a PushPayload> {
    payload.get(wrapper_key).and_then(Value::as_object)
}
