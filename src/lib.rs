//! # restmodel
//!
//! A declarative client for JSON REST APIs: define your resource types once,
//! then query, create, update, and destroy them through lazy, chainable
//! relations.
//!
//! ## Overview
//!
//! This crate provides:
//! - Resource descriptors built with [`ModelBuilder`] and registered into an
//!   [`Api`]
//! - Templated URIs ([`Uri`]) with `:placeholder` expansion from params or
//!   record attributes
//! - Lazy query scopes ([`Relation`]) that accumulate filters and headers
//!   and request nothing until pulled
//! - Header-driven pagination ([`Pager`]) with lazy per-page and per-record
//!   iteration
//! - `belongs_to` / `has_one` / `has_many` associations that prefer data
//!   already embedded in the payload over a fresh request
//! - Attribute typecasting ([`types`]) applied on every read and write
//! - A pluggable transport seam ([`transport::Connection`]) with a blocking
//!   HTTP default ([`transport::HttpConnection`])
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use restmodel::{params, types, Api, Model};
//! use restmodel::transport::HttpConnection;
//!
//! # fn main() -> Result<(), restmodel::Error> {
//! let api = Api::new(HttpConnection::new("https://blog.example.com/api")?);
//!
//! let author = api.register(
//!     Model::builder("Author")
//!         .namespace("blog")
//!         .attribute("id", types::integer()),
//! );
//!
//! let post = api.register(
//!     Model::builder("Post")
//!         .namespace("blog")
//!         .attribute("id", types::integer())
//!         .attribute("published_on", types::date())
//!         .belongs_to("author")
//!         .has_many("comments")
//!         .scope("published", |r| r.filter(params! { "published" => true })),
//! );
//!
//! // Lazy: nothing is requested until the relation is pulled.
//! let recent = post.scoped("published")?.filter(params! { "order" => "desc" });
//! for result in &recent {
//!     let record = result?;
//!     println!("{:?}", record.fetch("title")?);
//! }
//!
//! // Single-record lifecycle.
//! let mut draft = post.new_record(params! { "title" => "Hello" });
//! if !draft.save()? {
//!     eprintln!("{:?}", draft.errors());
//! }
//! # let _ = author;
//! # Ok(())
//! # }
//! ```
//!
//! ## Associations
//!
//! Association access goes through [`Record::fetch`]. When the owning payload
//! already embeds the associated data, it is materialized in place and no
//! request is made; otherwise the association derives a URI from its owner
//! and fetches. A `has_many` never fetches eagerly at all: it hands back a
//! [`Relation`] to refine or iterate.

pub mod transport;
pub mod types;

mod associations;
mod error;
mod inflect;
mod model;
mod pager;
mod relation;
mod result;
mod uri;

pub use associations::{Association, Kind};
pub use error::{Error, FieldErrors, RequestError};
pub use model::{Api, Fetched, Model, ModelBuilder, Record, ScopeFn};
pub use pager::{Pager, Pages};
pub use relation::{Records, Relation};
pub use result::ResultSet;
pub use uri::{Uri, UriArg};

pub use serde_json::Value;

/// Request and attribute parameters: a JSON object that preserves insertion
/// order.
pub type Params = serde_json::Map<String, Value>;

/// Builds a [`Params`] map from `key => value` pairs. Values go through
/// [`Value::from`].
///
/// ```rust
/// use restmodel::params;
///
/// let params = params! { "page" => 2, "published" => true };
/// assert_eq!(params["page"], 2);
/// ```
#[macro_export]
macro_rules! params {
    () => { $crate::Params::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut params = $crate::Params::new();
        $(params.insert(($key).into(), $crate::Value::from($value));)+
        params
    }};
}

/// Builds a [`transport::Headers`] map from `name => value` pairs.
///
/// ```rust
/// use restmodel::headers;
///
/// let headers = headers! { "X-Request-Id" => "abc" };
/// assert_eq!(headers["X-Request-Id"], "abc");
/// ```
#[macro_export]
macro_rules! headers {
    () => { $crate::transport::Headers::new() };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut headers = $crate::transport::Headers::new();
        $(headers.insert(($name).into(), ($value).into());)+
        headers
    }};
}

#[cfg(test)]
mod tests {
    use crate::Value;

    #[test]
    fn test_params_macro_preserves_insertion_order() {
        let params = params! { "b" => 1, "a" => 2 };
        let keys: Vec<&str> = params.keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "a"]);
    }

    #[test]
    fn test_params_macro_accepts_mixed_value_types() {
        let params = params! {
            "count" => 3,
            "name" => "pager",
            "flag" => true,
            "tags" => vec!["a", "b"],
        };
        assert_eq!(params["count"], Value::from(3));
        assert_eq!(params["tags"], Value::from(vec!["a", "b"]));
    }

    #[test]
    fn test_headers_macro() {
        let headers = headers! { "Accept" => "application/json" };
        assert_eq!(headers["Accept"], "application/json");
    }
}
