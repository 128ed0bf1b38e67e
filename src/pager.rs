//! Page-level access to a relation.

use crate::error::Error;
use crate::model::Record;
use crate::relation::Relation;
use crate::params;

/// Walks a relation one page at a time.
///
/// Pages are addressed by the server's `page` query param, counting from 1,
/// and bounded by the `X-Total-Pages` header. Nothing is cached: every
/// [`Pager::at`] call is a fresh request.
#[derive(Debug, Clone)]
pub struct Pager {
    scope: Relation,
}

impl Pager {
    pub(crate) const fn new(scope: Relation) -> Self {
        Self { scope }
    }

    /// Returns the total page count, per the server.
    ///
    /// # Errors
    ///
    /// Surfaces errors from the underlying request.
    pub fn count(&self) -> Result<u32, Error> {
        Ok(self.scope.get()?.total_pages())
    }

    /// Fetches one page of records.
    ///
    /// # Errors
    ///
    /// Surfaces request errors, and a collection error when the server
    /// answers a page request with a single object.
    pub fn at(&self, page: u32) -> Result<Vec<Record>, Error> {
        self.scope.filter(params! { "page" => page }).get()?.records()
    }

    /// Fetches the first page.
    ///
    /// # Errors
    ///
    /// Same as [`Pager::at`].
    pub fn first(&self) -> Result<Vec<Record>, Error> {
        self.at(1)
    }

    /// Fetches the last page, using a count request to find it.
    ///
    /// # Errors
    ///
    /// Same as [`Pager::at`].
    pub fn last(&self) -> Result<Vec<Record>, Error> {
        self.at(self.count()?)
    }

    /// Returns a lazy iterator over pages 1 through the total.
    ///
    /// The total is fetched once, on the first pull. Each call returns a
    /// fresh iterator that starts over from page 1.
    #[must_use]
    pub fn iter(&self) -> Pages {
        Pages {
            pager: self.clone(),
            total: None,
            next: 1,
            failed: false,
        }
    }
}

impl IntoIterator for &Pager {
    type Item = Result<Vec<Record>, Error>;
    type IntoIter = Pages;

    fn into_iter(self) -> Pages {
        self.iter()
    }
}

/// Lazy page iterator. Stops after yielding an error.
#[derive(Debug)]
pub struct Pages {
    pager: Pager,
    total: Option<u32>,
    next: u32,
    failed: bool,
}

impl Iterator for Pages {
    type Item = Result<Vec<Record>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let total = match self.total {
            Some(total) => total,
            None => match self.pager.count() {
                Ok(total) => {
                    self.total = Some(total);
                    total
                }
                Err(error) => {
                    self.failed = true;
                    return Some(Err(error));
                }
            },
        };

        if self.next > total {
            return None;
        }

        let page = self.next;
        self.next += 1;
        match self.pager.at(page) {
            Ok(records) => Some(Ok(records)),
            Err(error) => {
                self.failed = true;
                Some(Err(error))
            }
        }
    }
}
