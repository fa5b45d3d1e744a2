//! Scripted [`HttpTransport`] for exercising live-mode code without a network.

use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse, HttpTransport};

#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: HttpResponse) -> &Self {
        lock(&self.responses).push_back(Ok(response));
        self
    }

    pub fn push_json(&self, status: u16, body: Value) -> &Self {
        self.push_response(HttpResponse::new(status, body.to_string()))
    }

    pub fn push_text(&self, status: u16, body: &str) -> &Self {
        self.push_response(HttpResponse::new(status, body))
    }

    pub fn push_failure(&self, message: &str) -> &Self {
        lock(&self.responses).push_back(Err(Error::transport(message)));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

impl HttpTransport for MockTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        lock(&self.requests).push(request);
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| Err(Error::transport("connection refused (no scripted response)")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replays_in_order_and_records() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({ "id": "1" })).push_failure("down");

        let first = mock.send(HttpRequest::get("https://a.test/1")).unwrap();
        assert_eq!(first.status, 200);
        assert!(mock.send(HttpRequest::get("https://a.test/2")).is_err());
        assert!(mock.send(HttpRequest::get("https://a.test/3")).is_err());

        assert_eq!(mock.request_count(), 3);
        assert_eq!(mock.requests()[1].url, "https://a.test/2");
    }
}
