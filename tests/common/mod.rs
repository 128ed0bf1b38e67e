//! Shared test transport: an in-memory [`Connection`] with stubbed
//! responses and recorded calls.

use std::sync::Mutex;

use restmodel::transport::{Connection, Headers, Method, Response};
use restmodel::{Error, Params};

/// One recorded request, exactly as the transport saw it.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub params: Params,
    pub headers: Headers,
}

struct Stub {
    method: Method,
    path: String,
    params: Params,
    response: Response,
}

impl Stub {
    /// A stub matches when method and path are equal and every stubbed param
    /// appears in the request with the same value.
    fn matches(&self, method: Method, path: &str, params: &Params) -> bool {
        self.method == method
            && self.path == path
            && self.params.iter().all(|(k, v)| params.get(k) == Some(v))
    }
}

/// A canned-response transport. Stubs are matched on method, path, and a
/// param subset; when several stubs match, the one requiring the most params
/// wins. An unmatched request panics, so tests cannot silently hit the
/// network path they did not expect.
#[derive(Default)]
pub struct MockConnection {
    stubs: Vec<Stub>,
    calls: Mutex<Vec<Call>>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stubs a response for any request with this method and path.
    pub fn stub(self, method: Method, path: &str, status: u16, body: &str) -> Self {
        self.stub_full(method, path, Params::new(), status, Headers::new(), body)
    }

    /// Stubs a response keyed additionally on a param subset.
    pub fn stub_matching(
        self,
        method: Method,
        path: &str,
        params: Params,
        status: u16,
        body: &str,
    ) -> Self {
        self.stub_full(method, path, params, status, Headers::new(), body)
    }

    /// Stubs one page of a paginated listing: matched on `page`, answered
    /// with the pagination headers.
    pub fn stub_page(
        self,
        path: &str,
        page: u32,
        total: u32,
        total_pages: u32,
        body: &str,
    ) -> Self {
        let mut params = Params::new();
        params.insert("page".to_string(), page.into());
        let mut headers = Headers::new();
        headers.insert("X-Page".to_string(), page.to_string());
        headers.insert("X-Total".to_string(), total.to_string());
        headers.insert("X-Total-Pages".to_string(), total_pages.to_string());
        self.stub_full(Method::Get, path, params, 200, headers, body)
    }

    /// Stubs the bare (pageless) listing that count and total-pages probes
    /// hit.
    pub fn stub_listing(self, path: &str, total: u32, total_pages: u32, body: &str) -> Self {
        let mut headers = Headers::new();
        headers.insert("X-Total".to_string(), total.to_string());
        headers.insert("X-Total-Pages".to_string(), total_pages.to_string());
        self.stub_full(Method::Get, path, Params::new(), 200, headers, body)
    }

    pub fn stub_full(
        mut self,
        method: Method,
        path: &str,
        params: Params,
        status: u16,
        headers: Headers,
        body: &str,
    ) -> Self {
        self.stubs.push(Stub {
            method,
            path: path.to_string(),
            params,
            response: Response::new(status, headers, body.to_string()),
        });
        self
    }

    /// Every request made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("call log poisoned").len()
    }
}

impl Connection for MockConnection {
    fn send(
        &self,
        method: Method,
        path: &str,
        params: &Params,
        headers: &Headers,
    ) -> Result<Response, Error> {
        self.calls.lock().expect("call log poisoned").push(Call {
            method,
            path: path.to_string(),
            params: params.clone(),
            headers: headers.clone(),
        });

        self.stubs
            .iter()
            .filter(|stub| stub.matches(method, path, params))
            .max_by_key(|stub| stub.params.len())
            .map(|stub| stub.response.clone())
            .map_or_else(
                || panic!("no stub for {method} {path} with params {params:?}"),
                Ok,
            )
    }
}
