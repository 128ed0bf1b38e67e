//! URI templates with named placeholders.
//!
//! A [`Uri`] pairs a path template (`posts/:id/comments`) with a parameter
//! bag. Placeholders are `:name` path segments; expansion substitutes
//! matching params, drops the segments of unmatched placeholders, and
//! normalizes the separators that dropping leaves behind. Every operation
//! returns a new `Uri` — the original is never mutated.
//!
//! # Example
//!
//! ```rust
//! use restmodel::Uri;
//!
//! let uri = Uri::new("posts/:id");
//! assert_eq!(uri.with(42_i64).to_string(), "posts/42");
//! assert_eq!(uri.append("comments").with(42_i64).to_string(), "posts/42/comments");
//!
//! // Unmatched placeholders are omitted, not left literal.
//! assert_eq!(uri.to_string(), "posts");
//! ```

use std::fmt;

use serde_json::Value;

use crate::Params;

/// A path template plus the parameters to expand it with.
#[derive(Debug, Clone)]
pub struct Uri {
    template: String,
    params: Params,
}

/// An argument accepted by [`Uri::with`].
///
/// A mapping merges directly into the params; a bare identifier merges
/// under the key `id`. [`Record`](crate::Record)s convert into their full
/// attribute map.
#[derive(Debug, Clone)]
pub enum UriArg {
    /// A parameter mapping, merged key by key.
    Params(Params),
    /// A bare identifier, merged under the key `id`.
    Id(Value),
}

impl From<Params> for UriArg {
    fn from(params: Params) -> Self {
        Self::Params(params)
    }
}

impl From<Value> for UriArg {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Params(map),
            other => Self::Id(other),
        }
    }
}

impl From<i64> for UriArg {
    fn from(id: i64) -> Self {
        Self::Id(Value::from(id))
    }
}

impl From<u64> for UriArg {
    fn from(id: u64) -> Self {
        Self::Id(Value::from(id))
    }
}

impl From<&str> for UriArg {
    fn from(id: &str) -> Self {
        Self::Id(Value::from(id))
    }
}

impl From<String> for UriArg {
    fn from(id: String) -> Self {
        Self::Id(Value::from(id))
    }
}

impl Uri {
    /// Creates a URI from a bare template.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            params: Params::new(),
        }
    }

    /// Creates a URI from a template and an initial parameter bag.
    pub fn with_params(template: impl Into<String>, params: Params) -> Self {
        Self {
            template: template.into(),
            params,
        }
    }

    /// Returns the raw template.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the parameter bag.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Returns a new URI with `segment` appended to the template.
    #[must_use]
    pub fn append(&self, segment: &str) -> Self {
        Self {
            template: format!("{}/{segment}", self.template),
            params: self.params.clone(),
        }
    }

    /// Returns a new URI with merged parameters; new keys win on conflict.
    #[must_use]
    pub fn with(&self, arg: impl Into<UriArg>) -> Self {
        let mut uri = self.clone();
        match arg.into() {
            UriArg::Params(params) => uri.params.extend(params),
            UriArg::Id(id) => {
                uri.params.insert("id".to_string(), id);
            }
        }
        uri
    }

    /// Expands the template against the parameter bag.
    ///
    /// Unmatched placeholders (and null params) collapse to empty segments;
    /// runs of separators collapse to one and a trailing separator is
    /// stripped, so the result never contains `//` or ends with `/`.
    #[must_use]
    pub fn expand(&self) -> String {
        let raw: Vec<String> = self
            .template
            .split('/')
            .map(|segment| {
                segment.strip_prefix(':').map_or_else(
                    || segment.to_string(),
                    |name| self.params.get(name).map(segment_value).unwrap_or_default(),
                )
            })
            .collect();

        fix_slashes(&raw.join("/"))
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expand())
    }
}

/// Equality compares expanded string form, not template + params structure:
/// two differently-templated URIs that expand identically are equal.
impl PartialEq for Uri {
    fn eq(&self, other: &Self) -> bool {
        self.expand() == other.expand()
    }
}

impl Eq for Uri {}

impl PartialEq<str> for Uri {
    fn eq(&self, other: &str) -> bool {
        self.expand() == other
    }
}

impl PartialEq<&str> for Uri {
    fn eq(&self, other: &&str) -> bool {
        self.expand() == *other
    }
}

/// Renders a param value as a path segment. Strings render unquoted and
/// nulls render empty (to be collapsed away).
fn segment_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Collapses runs of separators and strips a trailing one.
fn fix_slashes(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && result.ends_with('/') {
            continue;
        }
        result.push(c);
    }
    result.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, Value)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_template_without_variables_is_untouched() {
        let uri = Uri::with_params("users", params(&[("id", json!(1))]));
        assert_eq!(uri.to_string(), "users");
    }

    #[test]
    fn test_unmatched_placeholder_is_omitted() {
        let uri = Uri::with_params("users/:id", params(&[("ego", json!(1))]));
        assert_eq!(uri.to_string(), "users");
    }

    #[test]
    fn test_expansion_never_doubles_or_trails_separators() {
        let uri = Uri::new(":foo/:bar/:baz");
        let expanded = uri.to_string();
        assert!(!expanded.contains("//"));
        assert!(!expanded.ends_with('/'));

        // A dropped leading placeholder keeps its separator.
        let partial = Uri::with_params(":foo/:bar/:baz", params(&[("bar", json!("middle"))]));
        let expanded = partial.to_string();
        assert!(!expanded.contains("//"));
        assert!(!expanded.ends_with('/'));
        assert_eq!(expanded, "/middle");
    }

    #[test]
    fn test_null_param_expands_empty() {
        let uri = Uri::with_params("users/:id", params(&[("id", Value::Null)]));
        assert_eq!(uri.to_string(), "users");
    }

    #[test]
    fn test_with_map_populates_the_template() {
        let uri = Uri::new(":one/:two");
        let populated = uri.with(params(&[("one", json!(1)), ("two", json!(2))]));
        assert_eq!(populated, "1/2");
    }

    #[test]
    fn test_with_scalar_is_treated_as_an_id() {
        let uri = Uri::new(":id");
        assert_eq!(uri.with(1_i64), "1");
        assert_eq!(uri.with("1"), "1");
    }

    #[test]
    fn test_with_returns_a_new_uri() {
        let uri = Uri::new(":id");
        let populated = uri.with(1_i64);
        assert!(uri.params().is_empty());
        assert_eq!(populated.params().get("id"), Some(&json!(1)));
    }

    #[test]
    fn test_with_overrides_on_conflict() {
        let uri = Uri::with_params(":id", params(&[("id", json!(1))]));
        assert_eq!(uri.with(2_i64), "2");
    }

    #[test]
    fn test_append_joins_with_a_separator() {
        let uri = Uri::new("users");
        assert_eq!(uri.append("feet"), "users/feet");
    }

    #[test]
    fn test_append_plays_nicely_with_templating() {
        let uri = Uri::new("users/:id");
        assert_eq!(uri.append("shoes"), "users/shoes");
        assert_eq!(uri.append("shoes").with(1_i64), "users/1/shoes");
    }

    #[test]
    fn test_clone_copies_template_and_params() {
        let original = Uri::with_params("users/:id", params(&[("id", json!(123))]));
        let mut copy = original.clone();
        copy = copy.with(456_i64);

        assert_eq!(original.params().get("id"), Some(&json!(123)));
        assert_eq!(copy.params().get("id"), Some(&json!(456)));
    }

    #[test]
    fn test_equality_compares_expanded_form_only() {
        let a = Uri::with_params("users/:id", params(&[("id", json!(1))]));
        let b = Uri::new("users/1");
        assert_eq!(a, b);

        let c = Uri::new("users/2");
        assert_ne!(a, c);
    }
}
