//! Default blocking HTTP connection built on reqwest.

use serde_json::Value;

use crate::error::Error;
use crate::transport::{Connection, Headers, Method, Response};
use crate::Params;

/// Library version from Cargo.toml, reported in the User-Agent header.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A blocking [`Connection`] over HTTP.
///
/// Joins a base URL with the paths models produce, attaches default headers
/// (JSON `Accept` plus a User-Agent; anything else via
/// [`HttpConnection::header`]), and maps verbs onto reqwest calls. Params
/// ride in the query string for bodyless verbs and as a JSON body for
/// `post`/`put`/`patch`.
///
/// The connection carries no retry or timeout policy; configure timeouts on
/// the reqwest side if needed, or wrap the trait.
///
/// # Example
///
/// ```rust,no_run
/// use restmodel::transport::HttpConnection;
///
/// let connection = HttpConnection::new("https://api.example.com")
///     .unwrap()
///     .header("Authorization", "Bearer s3cr3t");
/// ```
#[derive(Debug)]
pub struct HttpConnection {
    client: reqwest::blocking::Client,
    base_url: String,
    default_headers: Headers,
}

// Verify the connection is shareable at compile time.
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpConnection>();
};

impl HttpConnection {
    /// Creates a connection rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] if the underlying client cannot be built
    /// (for example, TLS initialization failure).
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        let client = reqwest::blocking::Client::builder()
            .use_rustls_tls()
            .build()?;

        let mut default_headers = Headers::new();
        default_headers.insert("Accept".to_string(), "application/json".to_string());
        default_headers.insert("User-Agent".to_string(), format!("restmodel/{VERSION}"));

        Ok(Self {
            client,
            base_url: base_url.into(),
            default_headers,
        })
    }

    /// Adds a default header sent with every request.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Returns the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the default headers for this connection.
    #[must_use]
    pub const fn default_headers(&self) -> &Headers {
        &self.default_headers
    }

    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Flattens params into query pairs. Arrays become comma-separated
    /// values; nested objects are serialized as JSON strings.
    fn query_pairs(params: &Params) -> Vec<(String, String)> {
        params
            .iter()
            .filter_map(|(key, value)| {
                let rendered = match value {
                    Value::Null => return None,
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    Value::Array(items) => items
                        .iter()
                        .map(|item| match item {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(","),
                    Value::Object(_) => value.to_string(),
                };
                Some((key.clone(), rendered))
            })
            .collect()
    }
}

impl Connection for HttpConnection {
    fn send(
        &self,
        method: Method,
        path: &str,
        params: &Params,
        headers: &Headers,
    ) -> Result<Response, Error> {
        let url = self.url_for(path);
        tracing::debug!(%method, %url, "sending request");

        let mut request = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Patch => self.client.patch(&url),
            Method::Delete => self.client.delete(&url),
            Method::Head => self.client.head(&url),
            Method::Options => self.client.request(reqwest::Method::OPTIONS, &url),
        };

        for (name, value) in self.default_headers.iter().chain(headers) {
            request = request.header(name.as_str(), value.as_str());
        }

        if method.has_body() {
            request = request.json(params);
        } else if !params.is_empty() {
            request = request.query(&Self::query_pairs(params));
        }

        let response = request.send()?;

        let status = response.status().as_u16();
        let mut response_headers = Headers::new();
        for (name, value) in response.headers() {
            response_headers.insert(
                name.as_str().to_lowercase(),
                value.to_str().unwrap_or_default().to_string(),
            );
        }
        let body = response.text()?;

        Ok(Response::new(status, response_headers, body))
    }
}
