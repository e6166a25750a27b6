//! Function-level resolution
//!
//! Resolves one raw per-target override against a set of defaults. The same
//! routine produces a warmer's own baseline, with the built-in defaults as the
//! fallback.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use super::alias;
use super::coerce;
use super::enabled::EnabledSpec;

/// Payload sent when nothing else is configured
pub const DEFAULT_PAYLOAD: &str = r#"{"source":"warmup-plugin"}"#;

/// Client context attached to each remote invocation
///
/// `Disabled` (raw `false`) and `Inherit` (nothing configured) are distinct:
/// a disabled context is never sent, an inherited one falls back to the
/// payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum ClientContext {
    #[default]
    Inherit,
    Disabled,
    Custom(serde_json::Value),
}

impl ClientContext {
    fn from_raw(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(false) | Value::Null => Some(Self::Disabled),
            Value::Bool(true) => None,
            other => coerce::to_json(other).map(Self::Custom),
        }
    }

    /// Base64 header value for one attempt, `None` when no context is sent
    ///
    /// The body is `{"custom": <value>}`. An inherited context carries the
    /// payload (parsed as JSON when it is JSON, as a string otherwise).
    pub fn encode(&self, payload: &str) -> Option<String> {
        let custom = match self {
            Self::Disabled => return None,
            Self::Custom(value) => value.clone(),
            Self::Inherit => serde_json::from_str(payload)
                .unwrap_or_else(|_| serde_json::Value::String(payload.to_string())),
        };
        let body = serde_json::json!({ "custom": custom });
        Some(STANDARD.encode(body.to_string()))
    }
}

/// Fully resolved settings of one target for one warmer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetOverride {
    pub enabled: EnabledSpec,

    /// Qualifier used for the remote call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(default)]
    pub client_context: ClientContext,

    /// Serialized payload, sent as-is
    pub payload: String,

    #[serde(default)]
    pub payload_raw: bool,

    /// Concurrent attempts per invocation pass (>= 1)
    pub concurrency: u32,
}

impl Default for TargetOverride {
    fn default() -> Self {
        Self {
            enabled: EnabledSpec::Bool(false),
            alias: None,
            client_context: ClientContext::Inherit,
            payload: DEFAULT_PAYLOAD.to_string(),
            payload_raw: false,
            concurrency: 1,
        }
    }
}

/// Resolve a raw override against `defaults`
///
/// `raw` may be a mapping, a bare shorthand for `{ enabled: <raw> }`, or
/// absent. Any other shape (or `null`) is treated as absent.
pub fn resolve_target(raw: Option<&Value>, defaults: &TargetOverride) -> TargetOverride {
    match raw {
        Some(Value::Mapping(block)) => resolve_block(&alias::normalize(block), defaults),
        Some(shorthand) if coerce::is_shorthand(shorthand) => {
            let mut block = Mapping::new();
            block.insert(Value::from("enabled"), shorthand.clone());
            resolve_block(&block, defaults)
        }
        _ => defaults.clone(),
    }
}

/// Resolve an already-normalized block
pub(crate) fn resolve_block(block: &Mapping, defaults: &TargetOverride) -> TargetOverride {
    let payload_raw = coerce::merge(block.get("payloadRaw"), coerce::as_bool, defaults.payload_raw);

    let payload = block
        .get("payload")
        .and_then(|value| encode_payload(value, payload_raw))
        .unwrap_or_else(|| defaults.payload.clone());

    TargetOverride {
        enabled: coerce::merge(
            block.get("enabled"),
            EnabledSpec::from_raw,
            defaults.enabled.clone(),
        ),
        alias: block
            .get("alias")
            .and_then(coerce::as_string)
            .or_else(|| defaults.alias.clone()),
        client_context: coerce::merge(
            block.get("clientContext"),
            ClientContext::from_raw,
            defaults.client_context.clone(),
        ),
        payload,
        payload_raw,
        concurrency: coerce::merge(
            block.get("concurrency"),
            coerce::as_positive_u32,
            defaults.concurrency,
        ),
    }
}

fn encode_payload(value: &Value, payload_raw: bool) -> Option<String> {
    match value {
        Value::String(raw) if payload_raw => Some(raw.clone()),
        other => coerce::to_json_string(other),
    }
}
