//! Structural validation of inbound events.
//!
//! Hand-checks exactly the fields the envelope defines against an untyped
//! [`Value`]. The payload under `data` is opaque beyond being an object, and
//! unknown fields are ignored.

use serde_json::{Map, Value};
pub use superschema_id::is_valid_uuid;

use crate::error::ValidationError;

/// Returns true if `value` has the event envelope shape.
pub fn is_valid_event(value: &Value) -> bool {
    validate_event(value).is_ok()
}

/// Checks `value` against the envelope rules and reports the first violation.
///
/// Rules are evaluated in a fixed order: `id`, `type`, `metadata`, then
/// `metadata.cid`, `pid`, `tid`, `uid`, `token`, and finally `data`.
pub fn validate_event(value: &Value) -> Result<(), ValidationError> {
    let event = value.as_object().ok_or(ValidationError::NotAnObject)?;

    if !is_uuid_field(event.get("id")) {
        return Err(ValidationError::InvalidId);
    }

    match event.get("type") {
        Some(Value::String(t)) if !t.is_empty() => {}
        _ => return Err(ValidationError::InvalidType),
    }

    let metadata = event
        .get("metadata")
        .and_then(Value::as_object)
        .ok_or(ValidationError::InvalidMetadata)?;
    validate_metadata(metadata)?;

    // A null payload is what serializers emit for "no data".
    match event.get("data") {
        None | Some(Value::Null) | Some(Value::Object(_)) => Ok(()),
        Some(_) => Err(ValidationError::InvalidData),
    }
}

fn validate_metadata(metadata: &Map<String, Value>) -> Result<(), ValidationError> {
    if !is_uuid_field(metadata.get("cid")) {
        return Err(ValidationError::InvalidCorrelationId);
    }

    if !is_uuid_field(metadata.get("pid")) {
        return Err(ValidationError::InvalidProducerId);
    }

    if let Some(tid) = metadata.get("tid") {
        if !is_uuid_field(Some(tid)) {
            return Err(ValidationError::InvalidTransactionId);
        }
    }

    if let Some(uid) = metadata.get("uid") {
        if !is_uuid_field(Some(uid)) {
            return Err(ValidationError::InvalidUserId);
        }
    }

    match metadata.get("token") {
        None | Some(Value::String(_)) => Ok(()),
        Some(_) => Err(ValidationError::InvalidToken),
    }
}

fn is_uuid_field(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if is_valid_uuid(s))
}
