//! Request validation.
//!
//! A [`Validation`] collects every rejected field of a request before
//! failing, so a client sees all problems at once rather than the first.

use crate::error::{ApiError, FieldError, Location};
use serde_json::{Map, Value};
use todo_store::{EntityId, ItemData, ID_LEN};

/// Accumulates field errors for one request.
#[derive(Debug, Default)]
pub struct Validation {
    errors: Vec<FieldError>,
}

impl Validation {
    /// Creates an empty validation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an identifier path parameter.
    pub fn param_id(&mut self, field: &str, raw: &str) -> Option<EntityId> {
        match validate_id(raw) {
            Ok(id) => Some(id),
            Err(message) => {
                self.errors
                    .push(FieldError::new(Location::Params, field, message));
                None
            }
        }
    }

    /// Parses an item body.
    pub fn item_payload(&mut self, body: &[u8]) -> Option<ItemData> {
        match validate_item_payload(body) {
            Ok(data) => Some(data),
            Err(errors) => {
                self.errors.extend(errors);
                None
            }
        }
    }

    /// Returns the rejected fields so far.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns `value` if no field was rejected.
    pub fn finish<T>(self, value: Option<T>) -> Result<T, ApiError> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(ApiError::validation(self.errors)),
        }
    }
}

/// Checks that `raw` is a canonical identifier.
pub fn validate_id(raw: &str) -> Result<EntityId, String> {
    if raw.is_empty() {
        return Err("must not be empty".into());
    }
    if raw.chars().count() != ID_LEN {
        return Err(format!("must be {ID_LEN} characters long"));
    }
    raw.parse()
        .map_err(|_| "must be a hexadecimal identifier".to_string())
}

/// Validates an item body and normalizes it for storage.
///
/// A missing or non-JSON body is treated as an empty object, so both field
/// errors are reported.
pub fn validate_item_payload(body: &[u8]) -> Result<ItemData, Vec<FieldError>> {
    let fields = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => fields,
        _ => Map::new(),
    };

    let mut errors = Vec::new();

    let text = match fields.get("text") {
        None | Some(Value::Null) => {
            errors.push(FieldError::new(Location::Body, "text", "is required"));
            None
        }
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                errors.push(FieldError::new(Location::Body, "text", "must not be empty"));
                None
            } else {
                Some(escape_html(trimmed))
            }
        }
        Some(_) => {
            errors.push(FieldError::new(Location::Body, "text", "must be a string"));
            None
        }
    };

    let done = match fields.get("done") {
        Some(Value::Bool(done)) => Some(*done),
        None | Some(Value::Null) => {
            errors.push(FieldError::new(Location::Body, "done", "is required"));
            None
        }
        Some(_) => {
            errors.push(FieldError::new(Location::Body, "done", "must be a boolean"));
            None
        }
    };

    match (text, done) {
        (Some(text), Some(done)) if errors.is_empty() => Ok(ItemData::new(text, done)),
        _ => Err(errors),
    }
}

/// Escapes the characters that are significant in HTML.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(c),
        }
    }
    out
}
