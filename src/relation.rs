//! Lazy, chainable query scopes.

use std::collections::VecDeque;

use crate::error::Error;
use crate::model::{Model, Record};
use crate::pager::{Pager, Pages};
use crate::result::ResultSet;
use crate::transport::{Headers, Method};
use crate::uri::Uri;
use crate::Params;

/// A query scope over one model: a URI plus accumulated filter params and
/// headers.
///
/// Relations are immutable and lazy. Each refinement ([`Relation::filter`],
/// [`Relation::header`], [`Relation::merge`]) returns a new relation and
/// leaves the receiver untouched; no request is made until a terminal call
/// ([`Relation::get`], [`Relation::count`], [`Relation::first`], iteration)
/// pulls data.
///
/// ```rust,no_run
/// # use restmodel::{params, Api, Model};
/// # use restmodel::transport::HttpConnection;
/// # fn main() -> Result<(), restmodel::Error> {
/// # let api = Api::new(HttpConnection::new("https://example.com")?);
/// # let post = api.register(Model::builder("Post"));
/// let published = post.filter(params! { "published" => true });
/// let recent = published.filter(params! { "order" => "created_at" });
///
/// // Nothing has been requested yet. Iteration walks every page lazily.
/// for result in &recent {
///     let record = result?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Relation {
    model: Model,
    uri: Uri,
    params: Params,
    headers: Headers,
}

impl Relation {
    /// A blank relation rooted at the model's own URI.
    pub(crate) fn new(model: Model) -> Self {
        let uri = model.uri().clone();
        Self::with_uri(model, uri)
    }

    /// A blank relation rooted at an explicit URI (association scopes).
    pub(crate) fn with_uri(model: Model, uri: Uri) -> Self {
        Self {
            model,
            uri,
            params: Params::new(),
            headers: Headers::new(),
        }
    }

    /// Returns the model this relation queries.
    #[must_use]
    pub const fn model(&self) -> &Model {
        &self.model
    }

    /// Returns the URI the relation is rooted at.
    #[must_use]
    pub const fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the accumulated filter params.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Returns the accumulated headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns a new relation with `params` merged in. Later values win on
    /// key collision.
    #[must_use]
    pub fn filter(&self, params: Params) -> Self {
        let mut refined = self.clone();
        refined.params.extend(params);
        refined
    }

    /// Returns a new relation with `headers` merged in.
    #[must_use]
    pub fn header(&self, headers: Headers) -> Self {
        let mut refined = self.clone();
        refined.headers.extend(headers);
        refined
    }

    /// Returns a new relation combining this one with another scope's params
    /// and headers.
    #[must_use]
    pub fn merge(&self, scope: &Self) -> Self {
        self.filter(scope.params.clone()).header(scope.headers.clone())
    }

    /// Chains a named scope defined on the model into this relation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownScope`] when the model defines no such scope.
    pub fn scoped(&self, name: &str) -> Result<Self, Error> {
        Ok(self.merge(&self.model.scoped(name)?))
    }

    /// Executes the relation as a GET and returns the parsed result.
    ///
    /// # Errors
    ///
    /// Surfaces request, network, and parse errors.
    pub fn get(&self) -> Result<ResultSet, Error> {
        self.request(Method::Get)
    }

    /// Executes the relation with an arbitrary method.
    ///
    /// # Errors
    ///
    /// Surfaces request, network, and parse errors.
    pub fn request(&self, method: Method) -> Result<ResultSet, Error> {
        self.model.request(method, &self.uri, &self.params, &self.headers)
    }

    /// Returns the total record count, per the server's `X-Total` header.
    ///
    /// # Errors
    ///
    /// Surfaces errors from the underlying request.
    pub fn count(&self) -> Result<u32, Error> {
        Ok(self.get()?.total())
    }

    /// Returns the first record of the first page, if any.
    ///
    /// # Errors
    ///
    /// Surfaces errors from the underlying requests.
    pub fn first(&self) -> Result<Option<Record>, Error> {
        Ok(self.pages().first()?.into_iter().next())
    }

    /// Returns the last record of the last page, if any.
    ///
    /// # Errors
    ///
    /// Surfaces errors from the underlying requests.
    pub fn last(&self) -> Result<Option<Record>, Error> {
        Ok(self.pages().last()?.pop())
    }

    /// Returns a pager over this relation's pages.
    #[must_use]
    pub fn pages(&self) -> Pager {
        Pager::new(self.clone())
    }

    /// Returns a lazy iterator over every record, across all pages in order.
    ///
    /// Each call returns a fresh iterator; the relation caches nothing, so a
    /// second iteration re-requests.
    #[must_use]
    pub fn iter(&self) -> Records {
        Records {
            pages: self.pages().iter(),
            buffer: VecDeque::new(),
        }
    }

    /// Collects every record into a vector.
    ///
    /// # Errors
    ///
    /// Surfaces the first error hit while paging.
    pub fn to_vec(&self) -> Result<Vec<Record>, Error> {
        self.iter().collect()
    }
}

impl IntoIterator for &Relation {
    type Item = Result<Record, Error>;
    type IntoIter = Records;

    fn into_iter(self) -> Records {
        self.iter()
    }
}

/// Lazy record iterator: pulls pages one at a time and yields their records
/// in order. Stops after the first error.
#[derive(Debug)]
pub struct Records {
    pages: Pages,
    buffer: VecDeque<Record>,
}

impl Iterator for Records {
    type Item = Result<Record, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Some(Ok(record));
            }
            match self.pages.next()? {
                Ok(records) => self.buffer.extend(records),
                Err(error) => return Some(Err(error)),
            }
        }
    }
}
