//! Record instances: attribute storage, field dispatch, and the
//! persistence lifecycle.

use serde_json::Value;

use crate::error::{Error, FieldErrors, RequestError};
use crate::model::Model;
use crate::relation::Relation;
use crate::result::ResultSet;
use crate::transport::{Headers, Method};
use crate::uri::{Uri, UriArg};
use crate::Params;

/// The result of reading one field off a record.
///
/// Attribute reads produce [`Fetched::Value`]; association reads produce a
/// record, a materialized collection, or an unexecuted [`Relation`],
/// depending on the association kind and whether the data was embedded.
#[derive(Debug, Clone)]
pub enum Fetched {
    /// A plain attribute value, typecast if a cast was declared.
    Value(Value),
    /// A single related record (belongs-to, has-one).
    Record(Record),
    /// A materialized collection of related records (embedded has-many).
    Records(Vec<Record>),
    /// A lazy scope over related records (remote has-many). No request has
    /// been made yet.
    Relation(Relation),
}

impl Fetched {
    /// Unwraps an attribute value.
    #[must_use]
    pub fn value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Unwraps a single related record.
    #[must_use]
    pub fn record(self) -> Option<Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Unwraps a materialized related collection.
    #[must_use]
    pub fn records(self) -> Option<Vec<Record>> {
        match self {
            Self::Records(records) => Some(records),
            _ => None,
        }
    }

    /// Unwraps a lazy related scope.
    #[must_use]
    pub fn relation(self) -> Option<Relation> {
        match self {
            Self::Relation(relation) => Some(relation),
            _ => None,
        }
    }
}

/// One addressable resource instance.
///
/// A record is a schema-less attribute map bound to its [`Model`], plus the
/// persistence flag and the diagnostics captured by the last failed
/// `save`/`destroy`. Records move through a small lifecycle:
///
/// - **new** (`persisted() == false`): built locally, [`save`] will POST.
/// - **persisted**: loaded from server data or successfully saved; [`save`]
///   will PUT, [`destroy`] will DELETE.
/// - **destroyed**: after a successful destroy the attributes survive but
///   the `id` is cleared and the record is no longer persisted.
///
/// ```rust,no_run
/// # use restmodel::{Api, Model, params};
/// # use restmodel::transport::HttpConnection;
/// # let api = Api::new(HttpConnection::new("https://example.com").unwrap());
/// let user = api.register(Model::builder("User"));
///
/// let mut record = user.new_record(params! { "name" => "Barry" });
/// if !record.save()? {
///     eprintln!("save rejected: {:?}", record.errors());
/// }
/// # Ok::<(), restmodel::Error>(())
/// ```
///
/// [`save`]: Record::save
/// [`destroy`]: Record::destroy
#[derive(Debug, Clone)]
pub struct Record {
    model: Model,
    attributes: Params,
    persisted: bool,
    last_error: Option<RequestError>,
    errors: Option<FieldErrors>,
}

impl Record {
    pub(crate) fn new(model: Model, attributes: Params, persisted: bool) -> Self {
        Self {
            model,
            attributes,
            persisted,
            last_error: None,
            errors: None,
        }
    }

    /// Returns the record's model.
    #[must_use]
    pub const fn model(&self) -> &Model {
        &self.model
    }

    /// Returns the raw attribute map.
    #[must_use]
    pub const fn attributes(&self) -> &Params {
        &self.attributes
    }

    /// Returns `true` once the record reflects server state.
    #[must_use]
    pub const fn persisted(&self) -> bool {
        self.persisted
    }

    /// Returns the request error captured by the last failed save or
    /// destroy, if any.
    #[must_use]
    pub const fn last_error(&self) -> Option<&RequestError> {
        self.last_error.as_ref()
    }

    /// Returns the structured field errors parsed from the last failure's
    /// response body, if any were present.
    #[must_use]
    pub const fn errors(&self) -> Option<&FieldErrors> {
        self.errors.as_ref()
    }

    /// Returns the record's own resource URI: the model's template populated
    /// with this record's attributes.
    #[must_use]
    pub fn uri(&self) -> Uri {
        self.model.uri().with(self)
    }

    /// Reads one field, dispatching in priority order: a declared
    /// association always wins (routed through the resolver even when a
    /// same-named attribute is embedded), then a present attribute
    /// (typecast if declared), else an unknown-field error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] for a name that is neither, plus any
    /// resolution, cast, or request error the dispatch runs into.
    pub fn fetch(&self, name: &str) -> Result<Fetched, Error> {
        if let Some(association) = self.model.association(name) {
            return association.resolve(self);
        }
        if let Some(value) = self.attributes.get(name) {
            return Ok(Fetched::Value(self.model.typecast(name, value)?));
        }
        Err(Error::UnknownField {
            name: name.to_string(),
        })
    }

    /// Writes one attribute, casting first when a cast is declared. Writes
    /// always target the attribute map; they never route through
    /// associations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cast`] when the declared cast rejects the value.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), Error> {
        let cast = self.model.typecast(name, &value.into())?;
        self.attributes.insert(name.to_string(), cast);
        Ok(())
    }

    /// Saves the record, swallowing server rejections.
    ///
    /// Creates (POST, full attribute set) when new, updates (PUT) when
    /// persisted. On success the response payload is merged into the
    /// attributes and the record is marked persisted. A non-2xx response
    /// yields `Ok(false)`, leaves the record's state unchanged, and captures
    /// the error ([`Record::last_error`]) and any parsed field errors
    /// ([`Record::errors`]).
    ///
    /// # Errors
    ///
    /// Only a server rejection is converted into the boolean; every other
    /// failure (network, malformed success body, resolution) propagates,
    /// with no diagnostics captured on the record.
    pub fn save(&mut self) -> Result<bool, Error> {
        match self.try_save() {
            Ok(()) => Ok(true),
            Err(Error::Request(_)) => Ok(false),
            Err(other) => Err(other),
        }
    }

    /// Saves the record, propagating request failures.
    ///
    /// # Errors
    ///
    /// Returns the request error after capturing the same diagnostics
    /// [`Record::save`] would have; both forms leave identical introspectable
    /// state on the record.
    pub fn try_save(&mut self) -> Result<(), Error> {
        self.clear_diagnostics();

        let method = if self.persisted {
            Method::Put
        } else {
            Method::Post
        };

        let result = self
            .request(method, self.attributes.clone())
            .map_err(|error| self.capture(error))?;

        if let Value::Object(data) = result.data() {
            self.attributes.extend(data.clone());
        }
        self.persisted = true;
        Ok(())
    }

    /// Merges the given attributes in, then saves.
    ///
    /// # Errors
    ///
    /// Same as [`Record::save`].
    pub fn update(&mut self, attributes: Params) -> Result<bool, Error> {
        self.attributes.extend(attributes);
        self.save()
    }

    /// Merges the given attributes in, then saves (propagating).
    ///
    /// # Errors
    ///
    /// Same as [`Record::try_save`].
    pub fn try_update(&mut self, attributes: Params) -> Result<(), Error> {
        self.attributes.extend(attributes);
        self.try_save()
    }

    /// Destroys the record, swallowing server rejections.
    ///
    /// Issues a DELETE against the record's own URI when persisted; only on
    /// success is the `id` attribute cleared and the persisted flag dropped.
    /// Destroying a never-persisted record is a no-op that still reports
    /// success and makes no request.
    ///
    /// # Errors
    ///
    /// A non-2xx response yields `Ok(false)` after capturing diagnostics;
    /// any other failure propagates.
    pub fn destroy(&mut self) -> Result<bool, Error> {
        match self.try_destroy() {
            Ok(()) => Ok(true),
            Err(Error::Request(_)) => Ok(false),
            Err(other) => Err(other),
        }
    }

    /// Destroys the record, propagating request failures.
    ///
    /// # Errors
    ///
    /// Returns the request error after capturing diagnostics; the persisted
    /// flag is left unchanged on failure.
    pub fn try_destroy(&mut self) -> Result<(), Error> {
        self.clear_diagnostics();

        if self.persisted {
            self.request(Method::Delete, Params::new())
                .map_err(|error| self.capture(error))?;
            self.attributes.insert("id".to_string(), Value::Null);
        }
        self.persisted = false;
        Ok(())
    }

    /// Refetches the record and wholesale-replaces its attributes with the
    /// response payload.
    ///
    /// # Errors
    ///
    /// Surfaces request errors, plus a payload error when the response is
    /// not a single object.
    pub fn reload(&mut self) -> Result<&mut Self, Error> {
        let result = self.request(Method::Get, Params::new())?;
        match result.data() {
            Value::Object(data) => {
                self.attributes = data.clone();
                Ok(self)
            }
            other => Err(Error::Payload {
                expected: "object",
                actual: Error::json_kind(other),
            }),
        }
    }

    /// Issues one request against the record's own URI.
    ///
    /// # Errors
    ///
    /// Same as [`Model::request`].
    pub fn request(&self, method: Method, params: Params) -> Result<ResultSet, Error> {
        self.model
            .request(method, &self.uri(), &params, &Headers::new())
    }

    fn clear_diagnostics(&mut self) {
        self.last_error = None;
        self.errors = None;
    }

    /// Captures request-failure diagnostics on the record, passing the
    /// error through for propagation.
    fn capture(&mut self, error: Error) -> Error {
        if let Error::Request(request_error) = &error {
            self.errors = request_error.field_errors();
            self.last_error = Some(request_error.clone());
        }
        error
    }
}

impl From<&Record> for UriArg {
    /// A record merges its full attribute set into a URI's params.
    fn from(record: &Record) -> Self {
        Self::Params(record.attributes.clone())
    }
}
