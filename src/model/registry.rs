//! The model registry: namespace-ordered type lookup.
//!
//! Associations name their target by field name ("comments" targets a
//! `Comment`), and the concrete descriptor behind that name is found by
//! searching candidate namespaces innermost-first: the owner's own
//! namespace, then each enclosing namespace, then the root. The first
//! registered match wins; no match at all is a hard resolution error, never
//! a fallback.
//!
//! The registry stores bare descriptors, not [`Model`](super::Model)
//! handles: handles carry their own strong reference to the registry, so
//! storing them here would create a reference cycle.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::Error;
use crate::model::ModelInner;

/// A mapping from full type names to registered descriptors.
///
/// Full names are dot-separated: a `Comment` registered under the `blog`
/// namespace keys as `blog.Comment`; with no namespace, just `Comment`.
/// Registration happens at definition time through [`Api::register`];
/// lookups happen whenever an association resolves its target.
///
/// [`Api::register`]: crate::Api::register
#[derive(Default)]
pub(crate) struct Registry {
    types: RwLock<HashMap<String, Arc<ModelInner>>>,
}

impl Registry {
    /// Creates an empty registry.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor under its full name. A later registration
    /// with the same full name replaces the earlier one.
    pub(crate) fn insert(&self, inner: &Arc<ModelInner>) {
        self.types
            .write()
            .expect("registry lock poisoned")
            .insert(inner.full_name(), Arc::clone(inner));
    }

    /// Looks up a descriptor by its exact full name.
    pub(crate) fn get(&self, full_name: &str) -> Option<Arc<ModelInner>> {
        self.types
            .read()
            .expect("registry lock poisoned")
            .get(full_name)
            .cloned()
    }

    /// Resolves `type_name` against `namespace` and its enclosing
    /// namespaces, innermost first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] listing every candidate tried when no
    /// namespace holds a matching descriptor.
    pub(crate) fn resolve(
        &self,
        namespace: &str,
        type_name: &str,
    ) -> Result<Arc<ModelInner>, Error> {
        let candidates = candidates(namespace, type_name);
        let types = self.types.read().expect("registry lock poisoned");

        candidates
            .iter()
            .find_map(|key| types.get(key).cloned())
            .ok_or_else(|| Error::UnknownType {
                name: type_name.to_string(),
                candidates,
            })
    }
}

/// Builds the candidate keys for a lookup, innermost namespace first and
/// the bare (root) name last.
fn candidates(namespace: &str, type_name: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut current = namespace;

    while !current.is_empty() {
        keys.push(format!("{current}.{type_name}"));
        current = match current.rfind('.') {
            Some(index) => &current[..index],
            None => "",
        };
    }
    keys.push(type_name.to_string());
    keys
}
