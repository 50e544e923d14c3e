//! The `{ "e": name, "d": payload }` wire envelope.

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use super::EventKind;

/// Why an inbound frame was not a usable envelope.
///
/// Never fatal: the frame is dropped and the connection stays open.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedEnvelope {
    #[error("payload is not valid JSON")]
    NotJson,

    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("missing or non-string event field 'e'")]
    MissingEvent,

    #[error("missing data field 'd'")]
    MissingData,

    #[error("unexpected field '{0}'")]
    UnexpectedField(String),

    #[error("unknown event '{0}'")]
    UnknownEvent(String),
}

/// A decoded inbound message with its event resolved against a role.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<E> {
    pub event: E,
    pub data: Value,
}

impl<E: EventKind> Envelope<E> {
    /// Decodes one text frame.
    pub fn decode(text: &str) -> Result<Self, MalformedEnvelope> {
        let value: Value = serde_json::from_str(text).map_err(|_| MalformedEnvelope::NotJson)?;
        let Value::Object(mut fields) = value else {
            return Err(MalformedEnvelope::NotAnObject);
        };

        let name = match fields.remove("e") {
            Some(Value::String(name)) => name,
            _ => return Err(MalformedEnvelope::MissingEvent),
        };
        let data = fields.remove("d").ok_or(MalformedEnvelope::MissingData)?;
        if let Some(extra) = fields.keys().next() {
            return Err(MalformedEnvelope::UnexpectedField(extra.clone()));
        }

        let event = E::from_name(&name).ok_or(MalformedEnvelope::UnknownEvent(name))?;
        Ok(Self { event, data })
    }

    /// Decodes a binary frame, which must hold UTF-8 text.
    pub fn decode_bytes(bytes: &[u8]) -> Result<Self, MalformedEnvelope> {
        let text = std::str::from_utf8(bytes).map_err(|_| MalformedEnvelope::NotJson)?;
        Self::decode(text)
    }
}

/// Encodes an outbound message.
pub fn encode(event: &str, data: &impl Serialize) -> Result<String, serde_json::Error> {
    let data = serde_json::to_value(data)?;
    serde_json::to_string(&json!({ "e": event, "d": data }))
}
