//! Parsed responses: payload plus pagination metadata.

use serde_json::Value;

use crate::error::Error;
use crate::model::{Model, Record};
use crate::transport::Response;
use crate::Params;

/// A parsed response bound to the model that made the request.
///
/// Wraps the JSON payload (a single object or an array of them) together
/// with the pagination metadata the server reports in headers. Whether the
/// payload is a collection decides which accessor is legal:
/// [`ResultSet::records`] for arrays, [`ResultSet::record`] for single
/// objects — asking for the wrong shape is an error, never a guess.
#[derive(Debug, Clone)]
pub struct ResultSet {
    model: Model,
    data: Value,
    page: u32,
    total: u32,
    total_pages: u32,
}

impl ResultSet {
    /// Parses a successful response.
    ///
    /// The body is JSON-decoded; a 204 yields an empty object payload
    /// instead of attempting to parse. Pagination comes from the `X-Page`,
    /// `X-Total`, and `X-Total-Pages` headers; a missing or unparseable
    /// header casts to 0.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] when a non-empty body is not valid JSON.
    pub(crate) fn from_response(model: Model, response: &Response) -> Result<Self, Error> {
        let data = if response.status == 204 || response.body.is_empty() {
            Value::Object(Params::new())
        } else {
            serde_json::from_str(&response.body)?
        };

        Ok(Self {
            model,
            data,
            page: header_count(response, "X-Page"),
            total: header_count(response, "X-Total"),
            total_pages: header_count(response, "X-Total-Pages"),
        })
    }

    /// Returns the raw payload.
    #[must_use]
    pub const fn data(&self) -> &Value {
        &self.data
    }

    /// Returns the page this result represents, per the server.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Returns the total record count, per the server.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Returns the total page count, per the server.
    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Returns `true` exactly when the payload is an array.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.data.is_array()
    }

    /// Loads every element of a collection payload as a persisted record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SingleResult`] when the payload is a single object,
    /// and a payload error for array elements that are not objects.
    pub fn records(&self) -> Result<Vec<Record>, Error> {
        match &self.data {
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Object(attributes) => Ok(self.model.load(attributes.clone())),
                    other => Err(Error::Payload {
                        expected: "object",
                        actual: Error::json_kind(other),
                    }),
                })
                .collect(),
            Value::Object(_) => Err(Error::SingleResult),
            other => Err(Error::Payload {
                expected: "array",
                actual: Error::json_kind(other),
            }),
        }
    }

    /// Loads the single record of an object payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CollectionResult`] when the payload is an array —
    /// a single record cannot be taken from a collection result — and a
    /// payload error for other non-object payloads.
    pub fn record(&self) -> Result<Record, Error> {
        if self.is_collection() {
            return Err(Error::CollectionResult);
        }
        match &self.data {
            Value::Object(attributes) => Ok(self.model.load(attributes.clone())),
            other => Err(Error::Payload {
                expected: "object",
                actual: Error::json_kind(other),
            }),
        }
    }
}

/// Reads a numeric header, defaulting to 0 when missing or unparseable.
fn header_count(response: &Response, name: &str) -> u32 {
    response
        .header(name)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{Connection, Headers, Method};
    use crate::Api;

    struct NullConnection;

    impl Connection for NullConnection {
        fn send(
            &self,
            _method: Method,
            _path: &str,
            _params: &Params,
            _headers: &Headers,
        ) -> Result<Response, Error> {
            Ok(Response::new(204, Headers::new(), String::new()))
        }
    }

    fn test_model() -> Model {
        Api::new(NullConnection).register(Model::builder("Widget"))
    }

    fn response(status: u16, headers: &[(&str, &str)], body: &str) -> Response {
        let headers = headers
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Response::new(status, headers, body.to_string())
    }

    #[test]
    fn test_pagination_metadata_comes_from_headers() {
        let result = ResultSet::from_response(
            test_model(),
            &response(
                200,
                &[("X-Page", "2"), ("X-Total", "6"), ("X-Total-Pages", "3")],
                "[]",
            ),
        )
        .unwrap();

        assert_eq!(result.page(), 2);
        assert_eq!(result.total(), 6);
        assert_eq!(result.total_pages(), 3);
    }

    #[test]
    fn test_missing_pagination_headers_cast_to_zero() {
        let result = ResultSet::from_response(test_model(), &response(200, &[], "{}")).unwrap();
        assert_eq!(result.page(), 0);
        assert_eq!(result.total(), 0);
        assert_eq!(result.total_pages(), 0);
    }

    #[test]
    fn test_unparseable_pagination_headers_cast_to_zero() {
        let result = ResultSet::from_response(
            test_model(),
            &response(200, &[("X-Total", "a lot")], "{}"),
        )
        .unwrap();
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn test_no_content_yields_empty_payload() {
        let result = ResultSet::from_response(
            test_model(),
            &response(204, &[], "this body is not parsed"),
        )
        .unwrap();
        assert_eq!(result.data(), &Value::Object(Params::new()));
    }

    #[test]
    fn test_malformed_success_body_is_an_error() {
        let result = ResultSet::from_response(test_model(), &response(200, &[], "<html>"));
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_collection_is_exactly_array_payload() {
        let collection =
            ResultSet::from_response(test_model(), &response(200, &[], "[]")).unwrap();
        assert!(collection.is_collection());

        let single = ResultSet::from_response(test_model(), &response(200, &[], "{}")).unwrap();
        assert!(!single.is_collection());
    }

    #[test]
    fn test_single_record_from_collection_is_an_error() {
        let result =
            ResultSet::from_response(test_model(), &response(200, &[], r#"[{"id": 1}]"#)).unwrap();
        assert!(matches!(result.record(), Err(Error::CollectionResult)));
    }

    #[test]
    fn test_records_from_single_result_is_an_error() {
        let result =
            ResultSet::from_response(test_model(), &response(200, &[], r#"{"id": 1}"#)).unwrap();
        assert!(matches!(result.records(), Err(Error::SingleResult)));
    }

    #[test]
    fn test_records_load_as_persisted() {
        let result = ResultSet::from_response(
            test_model(),
            &response(200, &[], r#"[{"id": 1}, {"id": 2}]"#),
        )
        .unwrap();

        let records = result.records().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(Record::persisted));
    }
}
