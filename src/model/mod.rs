//! Model descriptors and the API front door.
//!
//! In the absence of runtime classes, everything a resource type knows about
//! itself lives in an explicit descriptor: the [`Model`]. A model holds the
//! resource's name and namespace, its URI template, declared typecasts,
//! association declarations, named scopes, and the transport connection. It
//! is a cheap-clone handle (the state sits behind an `Arc`), so relations
//! and records carry their model by value.
//!
//! Models are defined with a builder and registered into an [`Api`], which
//! supplies the shared connection and the registry that association
//! resolution searches:
//!
//! ```rust,no_run
//! use restmodel::{Api, Model, types};
//! use restmodel::transport::HttpConnection;
//!
//! let api = Api::new(HttpConnection::new("https://example.com").unwrap());
//!
//! let post = api.register(
//!     Model::builder("Post")
//!         .namespace("blog")
//!         .attribute("id", types::integer())
//!         .belongs_to("author")
//!         .has_many("comments"),
//! );
//!
//! // Default URI template derives from the name: "posts/:id"
//! assert_eq!(post.uri().template(), "posts/:id");
//! ```

mod record;
mod registry;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::associations::{Association, Kind};
use crate::error::Error;
use crate::inflect;
use crate::relation::Relation;
use crate::result::ResultSet;
use crate::transport::{Connection, Headers, Method};
use crate::types::Caster;
use crate::uri::{Uri, UriArg};
use crate::Params;

pub use record::{Fetched, Record};
pub(crate) use registry::Registry;

/// A named-scope function: takes the model's blank relation and returns a
/// refined one.
pub type ScopeFn = Arc<dyn Fn(Relation) -> Relation + Send + Sync>;

/// The front door: a shared connection plus the registry of defined models.
#[derive(Clone)]
pub struct Api {
    connection: Arc<dyn Connection>,
    registry: Arc<Registry>,
}

impl Api {
    /// Creates an API rooted at the given connection.
    pub fn new(connection: impl Connection + 'static) -> Self {
        Self::with_connection(Arc::new(connection))
    }

    /// Creates an API from an already-shared connection.
    #[must_use]
    pub fn with_connection(connection: Arc<dyn Connection>) -> Self {
        Self {
            connection,
            registry: Arc::new(Registry::new()),
        }
    }

    /// Finalizes a model definition and registers it for association lookup.
    ///
    /// The model inherits the API's connection unless the builder supplied
    /// one of its own, and defaults its URI template to the pluralized,
    /// underscored type name plus `/:id`.
    pub fn register(&self, builder: ModelBuilder) -> Model {
        let uri = builder
            .uri_template
            .unwrap_or_else(|| format!("{}/:id", resource_name(&builder.name)));
        let connection = builder
            .connection
            .unwrap_or_else(|| Arc::clone(&self.connection));

        let inner = Arc::new(ModelInner {
            name: builder.name,
            namespace: builder.namespace,
            uri: Uri::new(uri),
            typecasts: builder.typecasts,
            associations: builder.associations,
            scopes: builder.scopes,
            connection,
        });

        self.registry.insert(&inner);
        Model {
            inner,
            registry: Arc::clone(&self.registry),
        }
    }

    /// Looks up a registered model by full name (e.g. `blog.Comment`).
    #[must_use]
    pub fn model(&self, full_name: &str) -> Option<Model> {
        self.registry.get(full_name).map(|inner| Model {
            inner,
            registry: Arc::clone(&self.registry),
        })
    }

    /// Returns the API's shared connection.
    #[must_use]
    pub fn connection(&self) -> Arc<dyn Connection> {
        Arc::clone(&self.connection)
    }
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api").finish_non_exhaustive()
    }
}

pub(crate) struct ModelInner {
    name: String,
    namespace: String,
    uri: Uri,
    typecasts: HashMap<String, Caster>,
    associations: HashMap<String, Association>,
    scopes: HashMap<String, ScopeFn>,
    connection: Arc<dyn Connection>,
}

impl ModelInner {
    pub(crate) fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

/// A resource type descriptor. Cheap to clone; all handles share state.
///
/// Every handle keeps the registry it was defined in alive, so models (and
/// the records and relations built from them) stay fully usable after the
/// [`Api`] that registered them is dropped.
#[derive(Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
    registry: Arc<Registry>,
}

impl Model {
    /// Starts a model definition. `name` is the singular, `PascalCase` type
    /// name (e.g. `"Comment"`).
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ModelBuilder {
        ModelBuilder::new(name)
    }

    /// Returns the type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the namespace (dot-separated; empty for root).
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    /// Returns the full registry name, `namespace.Name`.
    #[must_use]
    pub fn full_name(&self) -> String {
        self.inner.full_name()
    }

    /// Returns the resource URI template for this model.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.inner.uri
    }

    /// Returns a blank relation over this model.
    #[must_use]
    pub fn all(&self) -> Relation {
        Relation::new(self.clone())
    }

    /// Returns a relation refined by the given filter params.
    #[must_use]
    pub fn filter(&self, params: Params) -> Relation {
        self.all().filter(params)
    }

    /// Returns a relation carrying the given headers.
    #[must_use]
    pub fn header(&self, headers: Headers) -> Relation {
        self.all().header(headers)
    }

    /// Builds an unpersisted record from the given attributes.
    #[must_use]
    pub fn new_record(&self, attributes: Params) -> Record {
        Record::new(self.clone(), attributes, false)
    }

    /// Reconstructs a record from server data: populated and marked
    /// persisted.
    #[must_use]
    pub fn load(&self, attributes: Params) -> Record {
        Record::new(self.clone(), attributes, true)
    }

    /// Builds a record and saves it, swallowing server rejections.
    ///
    /// Inspect [`Record::persisted`] and [`Record::errors`] on the returned
    /// record to see how the save went.
    ///
    /// # Errors
    ///
    /// Returns failures other than a server rejection (network, parse,
    /// resolution); those carry no record diagnostics and propagate.
    pub fn create(&self, attributes: Params) -> Result<Record, Error> {
        let mut record = self.new_record(attributes);
        record.save()?;
        Ok(record)
    }

    /// Builds a record and saves it, propagating request failures.
    ///
    /// # Errors
    ///
    /// Returns the save error; the record is lost. Use [`Model::create`] to
    /// keep the record (with its captured errors) on failure.
    pub fn try_create(&self, attributes: Params) -> Result<Record, Error> {
        let mut record = self.new_record(attributes);
        record.try_save()?;
        Ok(record)
    }

    /// Fetches a single record by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingId`] — before any transport call — when the
    /// id is null; otherwise surfaces request and payload errors.
    pub fn find(&self, id: impl Into<Value>) -> Result<Record, Error> {
        let id = id.into();
        if id.is_null() {
            return Err(Error::MissingId);
        }
        self.get(&self.uri().with(UriArg::Id(id)))?.record()
    }

    /// Fetches the first record matching the given conditions.
    ///
    /// # Errors
    ///
    /// Surfaces request and payload errors from the underlying listing.
    pub fn find_by(&self, conditions: Params) -> Result<Option<Record>, Error> {
        self.filter(conditions).first()
    }

    /// Evaluates a named scope against a blank relation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownScope`] when the model defines no scope with
    /// that name.
    pub fn scoped(&self, name: &str) -> Result<Relation, Error> {
        self.inner.scopes.get(name).map_or_else(
            || {
                Err(Error::UnknownScope {
                    name: name.to_string(),
                    model: self.full_name(),
                })
            },
            |scope| Ok(scope(self.all())),
        )
    }

    /// Returns the association declared under `name`, if any.
    #[must_use]
    pub fn association(&self, name: &str) -> Option<&Association> {
        self.inner.associations.get(name)
    }

    /// Issues one request through the model's connection, checks for a 2xx
    /// status, and parses the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Request`] for a non-2xx response, [`Error::Network`]
    /// for transport failures, and [`Error::Json`] for an unparseable
    /// success body.
    pub fn request(
        &self,
        method: Method,
        uri: &Uri,
        params: &Params,
        headers: &Headers,
    ) -> Result<ResultSet, Error> {
        let path = uri.to_string();
        tracing::debug!(model = %self.full_name(), %method, %path, "dispatching request");

        let response = self.inner.connection.send(method, &path, params, headers)?;
        if !response.is_success() {
            tracing::debug!(status = response.status, %path, "request rejected");
            return Err(crate::error::RequestError::new(response).into());
        }

        ResultSet::from_response(self.clone(), &response)
    }

    /// Issues a bare GET against `uri`.
    ///
    /// # Errors
    ///
    /// Same as [`Model::request`].
    pub fn get(&self, uri: &Uri) -> Result<ResultSet, Error> {
        self.request(Method::Get, uri, &Params::new(), &Headers::new())
    }

    /// Applies the field's declared typecast, if one exists.
    pub(crate) fn typecast(&self, field: &str, value: &Value) -> Result<Value, Error> {
        self.inner
            .typecasts
            .get(field)
            .map_or_else(|| Ok(value.clone()), |caster| caster.apply(field, value))
    }

    /// Resolves a type name through the registry this model was defined in.
    pub(crate) fn resolve_type(&self, type_name: &str) -> Result<Self, Error> {
        let inner = self.registry.resolve(&self.inner.namespace, type_name)?;
        Ok(Self {
            inner,
            registry: Arc::clone(&self.registry),
        })
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.inner.name)
            .field("namespace", &self.inner.namespace)
            .field("uri", &self.inner.uri)
            .finish_non_exhaustive()
    }
}

/// Derives the collection path segment from a type name: `GiftCard` →
/// `gift_cards`.
fn resource_name(name: &str) -> String {
    inflect::pluralize(&inflect::underscore(name))
}

/// Accumulates a model definition until it is registered into an [`Api`].
#[must_use]
pub struct ModelBuilder {
    name: String,
    namespace: String,
    uri_template: Option<String>,
    typecasts: HashMap<String, Caster>,
    associations: HashMap<String, Association>,
    scopes: HashMap<String, ScopeFn>,
    connection: Option<Arc<dyn Connection>>,
}

impl ModelBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: String::new(),
            uri_template: None,
            typecasts: HashMap::new(),
            associations: HashMap::new(),
            scopes: HashMap::new(),
            connection: None,
        }
    }

    /// Places the model in a dot-separated namespace (e.g. `"blog.v1"`).
    /// Association targets are searched from this namespace outward.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Overrides the default URI template.
    pub fn uri(mut self, template: impl Into<String>) -> Self {
        self.uri_template = Some(template.into());
        self
    }

    /// Declares a typecast for one attribute, applied on read and write.
    pub fn attribute(mut self, name: impl Into<String>, caster: Caster) -> Self {
        self.typecasts.insert(name.into(), caster);
        self
    }

    /// Declares a belongs-to association under `name`.
    pub fn belongs_to(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.associations
            .insert(name.clone(), Association::new(Kind::BelongsTo, name, None));
        self
    }

    /// Declares a has-one association under `name`.
    pub fn has_one(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.associations
            .insert(name.clone(), Association::new(Kind::HasOne, name, None));
        self
    }

    /// Declares a has-one association fetched from an explicit URI template
    /// instead of the derived owner-URI + field-name path.
    pub fn has_one_with_uri(mut self, name: impl Into<String>, uri: impl Into<String>) -> Self {
        let name = name.into();
        self.associations.insert(
            name.clone(),
            Association::new(Kind::HasOne, name, Some(uri.into())),
        );
        self
    }

    /// Declares a has-many association under `name`.
    pub fn has_many(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.associations
            .insert(name.clone(), Association::new(Kind::HasMany, name, None));
        self
    }

    /// Declares a has-many association scoped to an explicit URI template.
    pub fn has_many_with_uri(mut self, name: impl Into<String>, uri: impl Into<String>) -> Self {
        let name = name.into();
        self.associations.insert(
            name.clone(),
            Association::new(Kind::HasMany, name, Some(uri.into())),
        );
        self
    }

    /// Registers a named scope: a reusable refinement applied to the model's
    /// blank relation.
    pub fn scope(
        mut self,
        name: impl Into<String>,
        scope: impl Fn(Relation) -> Relation + Send + Sync + 'static,
    ) -> Self {
        self.scopes.insert(name.into(), Arc::new(scope));
        self
    }

    /// Overrides the API-wide connection for this model alone.
    pub fn connection(mut self, connection: impl Connection + 'static) -> Self {
        self.connection = Some(Arc::new(connection));
        self
    }

    /// Clones-and-extends another model's definition: typecasts,
    /// associations, scopes, and connection are copied in, and later builder
    /// calls may override them. Registered models never share mutable
    /// definition state.
    pub fn inherit(mut self, parent: &Model) -> Self {
        self.typecasts.extend(
            parent
                .inner
                .typecasts
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        self.associations.extend(
            parent
                .inner
                .associations
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        self.scopes.extend(
            parent
                .inner
                .scopes
                .iter()
                .map(|(k, v)| (k.clone(), Arc::clone(v))),
        );
        if self.connection.is_none() {
            self.connection = Some(Arc::clone(&parent.inner.connection));
        }
        self
    }
}

impl fmt::Debug for ModelBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBuilder")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("uri_template", &self.uri_template)
            .finish_non_exhaustive()
    }
}
