//! Error types for the restmodel crate.
//!
//! The crate distinguishes four kinds of failure:
//!
//! - [`RequestError`]: the server answered with a non-2xx status. This is
//!   the only error kind the non-propagating record methods ([`save`],
//!   [`destroy`]) recover from; they convert it into a `false` return plus
//!   captured diagnostics on the record.
//! - Resolution errors ([`Error::UnknownType`], [`Error::UnknownScope`],
//!   [`Error::UnknownField`]): a name could not be resolved against the
//!   registered models, scopes, or attributes. Never recovered.
//! - Argument errors ([`Error::MissingId`]): `find` called without an
//!   identifier. Raised before any transport call.
//! - Payload-shape errors ([`Error::CollectionResult`],
//!   [`Error::SingleResult`], [`Error::Payload`], [`Error::Json`],
//!   [`Error::Cast`]): the response body or an attribute value did not have
//!   the shape the caller asked for.
//!
//! A malformed *error* body is not an error of its own: parsing it simply
//! yields no structured field errors.
//!
//! [`save`]: crate::Record::save
//! [`destroy`]: crate::Record::destroy

use std::collections::BTreeMap;

use thiserror::Error;

use crate::transport::Response;

/// Structured field errors parsed from an error response body.
///
/// The conventional shape is `{"errors": {"field": ["message", ...]}}`.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Error returned when a request receives a non-successful (non-2xx) response.
///
/// Carries the full [`Response`] so callers can inspect the status, headers,
/// and body. Clonable so a [`Record`](crate::Record) can retain the error
/// while it also propagates to the caller.
#[derive(Debug, Clone, Error)]
#[error("received {} response", .response.status)]
pub struct RequestError {
    /// The full response that triggered the error.
    pub response: Response,
}

impl RequestError {
    /// Creates a new `RequestError` from the offending response.
    #[must_use]
    pub const fn new(response: Response) -> Self {
        Self { response }
    }

    /// Returns the HTTP status of the offending response.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.response.status
    }

    /// Parses structured field errors from the response body.
    ///
    /// Reads the `errors` key of the JSON body as a mapping from field name
    /// to a sequence of messages. A body that fails to parse, or that has no
    /// `errors` key of that shape, yields `None` — never a secondary error.
    #[must_use]
    pub fn field_errors(&self) -> Option<FieldErrors> {
        let body: serde_json::Value = serde_json::from_str(&self.response.body).ok()?;
        serde_json::from_value(body.get("errors")?.clone()).ok()
    }
}

/// Unified error type for all restmodel operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The server answered with a non-2xx status.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Transport-level failure (connection, TLS, malformed URL).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A successful response carried a body that is not valid JSON.
    #[error("malformed response body: {0}")]
    Json(#[from] serde_json::Error),

    /// A single record was requested from a collection-shaped result.
    #[error("cannot take a single record from a collection result")]
    CollectionResult,

    /// A record collection was requested from a single-record result.
    #[error("cannot list records from a single-record result")]
    SingleResult,

    /// The payload did not have the expected JSON shape.
    #[error("expected {expected} payload, got {actual}")]
    Payload {
        /// The JSON shape the operation required.
        expected: &'static str,
        /// The JSON shape actually found.
        actual: &'static str,
    },

    /// `find` was called with a null or absent identifier.
    #[error("id is required and cannot be null")]
    MissingId,

    /// No registered model matched an association's target type.
    #[error("no model registered for type '{name}' (searched {candidates:?})")]
    UnknownType {
        /// The derived target type name.
        name: String,
        /// Every registry key that was tried, innermost namespace first.
        candidates: Vec<String>,
    },

    /// A named scope was requested that the model does not define.
    #[error("model '{model}' has no scope named '{name}'")]
    UnknownScope {
        /// The scope name requested.
        name: String,
        /// The model the scope was looked up on.
        model: String,
    },

    /// A field was read that is neither an attribute nor an association.
    #[error("'{name}' is not an attribute or association")]
    UnknownField {
        /// The field name requested.
        name: String,
    },

    /// A declared typecast rejected a value.
    #[error("cannot cast '{field}' as {kind}: {message}")]
    Cast {
        /// The attribute being cast.
        field: String,
        /// The declared cast kind.
        kind: &'static str,
        /// What the cast function objected to.
        message: String,
    },
}

impl Error {
    /// Returns the name of a value's JSON shape, for payload-mismatch messages.
    pub(crate) const fn json_kind(value: &serde_json::Value) -> &'static str {
        match value {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "boolean",
            serde_json::Value::Number(_) => "number",
            serde_json::Value::String(_) => "string",
            serde_json::Value::Array(_) => "array",
            serde_json::Value::Object(_) => "object",
        }
    }
}
