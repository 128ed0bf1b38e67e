//! Association declarations and resolution.
//!
//! An association is declared once per owning model (at build time) and
//! resolved per record. Resolution always prefers data the owner already
//! carries: an embedded object or array under the field name materializes
//! directly, with zero transport calls. Only when nothing is embedded does
//! the resolver go remote — and for has-many it still doesn't: it hands back
//! an unexecuted [`Relation`] so nothing is fetched until iterated.
//!
//! The target model behind a field name is derived by inflection
//! (`comments` → `Comment`) and looked up through the owner's registry,
//! searching namespaces innermost-first. The lookup is deterministic per
//! declaration, so the result is cached after the first success.

use std::sync::OnceLock;

use serde_json::Value;

use crate::error::Error;
use crate::inflect;
use crate::model::{Fetched, Model, Record};
use crate::relation::Relation;
use crate::uri::Uri;

/// The three relationship kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// The owner references the target by `<field>_id`.
    BelongsTo,
    /// The target hangs off the owner's resource URI, single.
    HasOne,
    /// The target hangs off the owner's resource URI, plural.
    HasMany,
}

impl Kind {
    /// Returns the kind's conventional name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BelongsTo => "belongs_to",
            Self::HasOne => "has_one",
            Self::HasMany => "has_many",
        }
    }
}

/// One declared relationship on an owning model.
#[derive(Debug, Clone)]
pub struct Association {
    kind: Kind,
    name: String,
    uri_template: Option<String>,
    target: OnceLock<Model>,
}

impl Association {
    pub(crate) fn new(kind: Kind, name: String, uri_template: Option<String>) -> Self {
        Self {
            kind,
            name,
            uri_template,
            target: OnceLock::new(),
        }
    }

    /// Returns the relationship kind.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        self.kind
    }

    /// Returns the field name the association is declared under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the explicit URI template override, if one was declared.
    #[must_use]
    pub fn uri_template(&self) -> Option<&str> {
        self.uri_template.as_deref()
    }

    /// Resolves the target model, caching the result against this
    /// declaration after the first success.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] when no candidate namespace holds a
    /// model for the derived type name.
    pub fn target(&self, owner: &Model) -> Result<Model, Error> {
        if let Some(target) = self.target.get() {
            return Ok(target.clone());
        }
        let type_name = inflect::camelize(&inflect::singularize(&self.name));
        let resolved = owner.resolve_type(&type_name)?;
        Ok(self.target.get_or_init(|| resolved).clone())
    }

    /// Returns the child URI template: the explicit override when given,
    /// otherwise the owner's resource URI with the field name appended.
    fn uri(&self, owner: &Model) -> Uri {
        self.uri_template.as_ref().map_or_else(
            || owner.uri().append(&self.name),
            |template| Uri::new(template.clone()),
        )
    }

    /// Resolves the association for one owning record.
    ///
    /// # Errors
    ///
    /// Surfaces type-resolution errors, [`Error::MissingId`] for a
    /// belongs-to with no embedded data and no foreign key, request errors
    /// from remote fetches, and payload errors for embedded data of the
    /// wrong shape.
    pub fn resolve(&self, owner: &Record) -> Result<Fetched, Error> {
        let target = self.target(owner.model())?;
        let embedded = owner
            .attributes()
            .get(&self.name)
            .filter(|value| !value.is_null());

        match self.kind {
            Kind::BelongsTo => match embedded {
                Some(value) => Ok(Fetched::Record(materialize(&target, value)?)),
                None => {
                    let id = owner
                        .attributes()
                        .get(&foreign_key(&self.name))
                        .cloned()
                        .unwrap_or(Value::Null);
                    Ok(Fetched::Record(target.find(id)?))
                }
            },
            Kind::HasOne => match embedded {
                Some(value) => Ok(Fetched::Record(materialize(&target, value)?)),
                None => {
                    let uri = self.uri(owner.model()).with(owner);
                    Ok(Fetched::Record(target.get(&uri)?.record()?))
                }
            },
            Kind::HasMany => match embedded {
                Some(Value::Array(items)) => {
                    let records = items
                        .iter()
                        .map(|item| materialize(&target, item))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(Fetched::Records(records))
                }
                Some(other) => Err(Error::Payload {
                    expected: "array",
                    actual: Error::json_kind(other),
                }),
                None => {
                    let uri = self.uri(owner.model()).with(owner);
                    Ok(Fetched::Relation(Relation::with_uri(target, uri)))
                }
            },
        }
    }
}

/// Materializes a record of the target type from embedded data.
fn materialize(target: &Model, value: &Value) -> Result<Record, Error> {
    match value {
        Value::Object(attributes) => Ok(target.load(attributes.clone())),
        other => Err(Error::Payload {
            expected: "object",
            actual: Error::json_kind(other),
        }),
    }
}

/// The conventional foreign-key attribute for a belongs-to field.
fn foreign_key(name: &str) -> String {
    format!("{name}_id")
}
