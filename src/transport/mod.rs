//! The transport seam between models and the network.
//!
//! Models never talk to the network directly; they go through an injected
//! [`Connection`], which takes an HTTP verb, an expanded path, a parameter
//! map, and headers, and blocks until it can return a [`Response`] (status,
//! headers, body) or a transport-level error. The library adds no retry or
//! timeout policy of its own — those belong to the connection.
//!
//! [`HttpConnection`] is the default implementation, built on the blocking
//! reqwest client. Tests typically inject a hand-rolled stub instead.

mod http;

use std::collections::HashMap;
use std::fmt;

use crate::error::Error;
use crate::Params;

pub use http::HttpConnection;

/// Headers attached to a request or response.
pub type Headers = HashMap<String, String>;

/// HTTP methods supported by the transport contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    /// Returns the lowercase verb name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
            Self::Head => "head",
            Self::Options => "options",
        }
    }

    /// Returns `true` for verbs that carry params in the request body
    /// rather than the query string.
    #[must_use]
    pub const fn has_body(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw response from the transport: status, headers, body.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers. Lookup through [`Response::header`] is
    /// case-insensitive regardless of how the map was populated.
    pub headers: Headers,
    /// Raw response body.
    pub body: String,
}

impl Response {
    /// Creates a new response.
    #[must_use]
    pub const fn new(status: u16, headers: Headers, body: String) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns `true` if the status is in the 2xx success range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Looks up a header by name, case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// The injected transport collaborator.
///
/// Implementations block until a response arrives or the transport fails.
/// A connection is treated as a read-mostly singleton shared across models
/// via `Arc`; implementations must therefore be `Send + Sync`.
pub trait Connection: Send + Sync {
    /// Sends one request and blocks for the response.
    ///
    /// For body-bearing verbs (`post`, `put`, `patch`) the params become the
    /// JSON request body; for the rest they become the query string.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport-level failures. Non-2xx responses
    /// are returned as plain [`Response`]s; the caller decides what a
    /// success is.
    fn send(
        &self,
        method: Method,
        path: &str,
        params: &Params,
        headers: &Headers,
    ) -> Result<Response, Error>;
}
