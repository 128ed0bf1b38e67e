//! Attribute typecasting.
//!
//! Attribute storage is schema-less JSON; a model may declare a [`Caster`]
//! per field, applied on every read and write of that field. Values that
//! already have the declared shape pass through unchanged, and nulls are
//! never cast.
//!
//! The standard casters cover the common wire mismatches (numbers sent as
//! strings, embedded JSON strings, ISO-8601 timestamps). A custom caster is
//! just a name plus a function:
//!
//! ```rust
//! use restmodel::types::Caster;
//! use serde_json::Value;
//!
//! let upcase = Caster::new("upcase", |value| match value {
//!     Value::String(s) => Ok(Value::String(s.to_uppercase())),
//!     other => Err(format!("expected a string, got {other}")),
//! });
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use crate::error::Error;

/// The cast function: a raw value in, a normalized value or a complaint out.
type CastFn = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// A named cast applied to one attribute on read and write.
#[derive(Clone)]
pub struct Caster {
    name: &'static str,
    cast: CastFn,
}

impl Caster {
    /// Creates a caster from a name (used in error messages) and a function.
    pub fn new(
        name: &'static str,
        cast: impl Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            cast: Arc::new(cast),
        }
    }

    /// Returns the caster's name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Applies the cast to `value` for attribute `field`.
    ///
    /// Nulls pass through untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cast`] when the cast function rejects the value.
    pub fn apply(&self, field: &str, value: &Value) -> Result<Value, Error> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        (self.cast)(value).map_err(|message| Error::Cast {
            field: field.to_string(),
            kind: self.name,
            message,
        })
    }
}

impl fmt::Debug for Caster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Caster").field("name", &self.name).finish()
    }
}

/// Casts to an integer. Accepts integers as-is, parses numeric strings,
/// truncates floats.
#[must_use]
pub fn integer() -> Caster {
    Caster::new("integer", |value| match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
        Value::Number(n) => n
            .as_f64()
            .map(|f| Value::from(f.trunc() as i64))
            .ok_or_else(|| format!("{n} is out of integer range")),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| format!("'{s}' is not an integer: {e}")),
        other => Err(format!("cannot cast {} to integer", Error::json_kind(other))),
    })
}

/// Casts to a float. Accepts numbers as-is and parses numeric strings.
#[must_use]
pub fn float() -> Caster {
    Caster::new("float", |value| match value {
        Value::Number(_) => Ok(value.clone()),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::from)
            .map_err(|e| format!("'{s}' is not a float: {e}")),
        other => Err(format!("cannot cast {} to float", Error::json_kind(other))),
    })
}

/// Casts to a string, stringifying scalars.
#[must_use]
pub fn text() -> Caster {
    Caster::new("text", |value| match value {
        Value::String(_) => Ok(value.clone()),
        Value::Number(n) => Ok(Value::from(n.to_string())),
        Value::Bool(b) => Ok(Value::from(b.to_string())),
        other => Err(format!("cannot cast {} to text", Error::json_kind(other))),
    })
}

/// Casts to a boolean. Accepts booleans as-is plus `"true"`/`"false"`.
#[must_use]
pub fn boolean() -> Caster {
    Caster::new("boolean", |value| match value {
        Value::Bool(_) => Ok(value.clone()),
        Value::String(s) => match s.as_str() {
            "true" => Ok(Value::from(true)),
            "false" => Ok(Value::from(false)),
            other => Err(format!("'{other}' is not a boolean")),
        },
        other => Err(format!("cannot cast {} to boolean", Error::json_kind(other))),
    })
}

/// Parses a JSON document embedded in a string; structured values pass
/// through as-is.
#[must_use]
pub fn json() -> Caster {
    Caster::new("json", |value| match value {
        Value::String(s) => serde_json::from_str(s).map_err(|e| e.to_string()),
        other => Ok(other.clone()),
    })
}

/// Validates and normalizes an ISO-8601 calendar date (`YYYY-MM-DD`).
#[must_use]
pub fn date() -> Caster {
    Caster::new("date", |value| match value {
        Value::String(s) => s
            .parse::<NaiveDate>()
            .map(|d| Value::from(d.to_string()))
            .map_err(|e| format!("'{s}' is not an ISO-8601 date: {e}")),
        other => Err(format!("cannot cast {} to date", Error::json_kind(other))),
    })
}

/// Validates and normalizes an RFC 3339 / ISO-8601 timestamp.
#[must_use]
pub fn datetime() -> Caster {
    Caster::new("datetime", |value| match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|t| Value::from(t.to_rfc3339()))
            .map_err(|e| format!("'{s}' is not an ISO-8601 timestamp: {e}")),
        other => Err(format!(
            "cannot cast {} to datetime",
            Error::json_kind(other)
        )),
    })
}
