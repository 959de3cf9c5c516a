//! Canned-response transport for tests.

use std::sync::Mutex;

use super::{HttpResponse, RegistryError, Transport, TransportFuture};

/// A hand-rolled [`Transport`] that answers from a table of URL prefixes.
///
/// The longest registered prefix of the requested URL wins, and of equal
/// prefixes the one registered last. Requests with no
/// matching route fail with [`RegistryError::Http`]. Every requested URL is
/// recorded, so tests can assert how many calls were made and to where.
#[derive(Default)]
pub struct MockTransport {
    routes: Vec<(String, Result<HttpResponse, RegistryError>)>,
    calls: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests starting with `prefix` with a raw body.
    pub fn with_body(mut self, prefix: &str, status: u16, body: impl Into<String>) -> Self {
        self.routes
            .push((prefix.to_string(), Ok(HttpResponse::new(status, body))));
        self
    }

    /// Answer requests starting with `prefix` with a 200 JSON body.
    pub fn with_json(self, prefix: &str, body: &serde_json::Value) -> Self {
        self.with_body(prefix, 200, body.to_string())
    }

    /// Fail requests starting with `prefix` before any response is received.
    pub fn with_error(mut self, prefix: &str, error: RegistryError) -> Self {
        self.routes.push((prefix.to_string(), Err(error)));
        self
    }

    /// How many requests have been made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// How many requests started with `prefix`.
    pub fn calls_to(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.starts_with(prefix))
            .count()
    }

    /// Every requested URL, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn respond(&self, url: &str) -> Result<HttpResponse, RegistryError> {
        self.routes
            .iter()
            .filter(|(prefix, _)| url.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| Err(RegistryError::Http(format!("no mock route for {url}"))))
    }
}

impl Transport for MockTransport {
    fn get<'a>(&'a self, url: &'a str) -> TransportFuture<'a> {
        self.calls.lock().unwrap().push(url.to_string());
        let response = self.respond(url);
        Box::pin(async move { response })
    }
}
