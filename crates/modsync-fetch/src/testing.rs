//! In-memory [`HttpClient`] for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use futures_util::{StreamExt, stream};
use tokio::sync::Semaphore;

use crate::effects::{BoxStream, HttpClient};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct MockError(pub String);

#[derive(Debug, Clone)]
enum Route {
    Body(Bytes),
    Fail(String),
    /// Fails the first `failures` requests, then serves `body`.
    Flaky { failures: usize, body: Bytes },
    /// Sends the first half of `body` and then never finishes.
    Hang(Bytes),
    /// Sends the first half of `body`, the rest once the gate is closed.
    Gated { body: Bytes, gate: Arc<Semaphore> },
}

/// Serves canned bodies by exact URL. Unknown URLs answer like a 404.
///
/// Bodies are delivered in two chunks so that consumers see a real stream.
#[derive(Debug, Default)]
pub struct MockHttpClient {
    routes:   Mutex<HashMap<String, Route>>,
    requests: Mutex<HashMap<String, usize>>,
}

impl MockHttpClient {
    pub fn new() -> Self { Self::default() }

    pub fn with_body(self, url: &str, body: impl Into<Bytes>) -> Self {
        self.set_body(url, body);
        self
    }

    pub fn with_failure(self, url: &str, message: &str) -> Self {
        lock(&self.routes).insert(url.to_string(), Route::Fail(message.to_string()));
        self
    }

    pub fn with_flaky(self, url: &str, failures: usize, body: impl Into<Bytes>) -> Self {
        lock(&self.routes).insert(url.to_string(), Route::Flaky {
            failures,
            body: body.into(),
        });
        self
    }

    pub fn with_hang(self, url: &str, body: impl Into<Bytes>) -> Self {
        lock(&self.routes).insert(url.to_string(), Route::Hang(body.into()));
        self
    }

    /// Like [`with_hang`](Self::with_hang) until [`open_gate`](Self::open_gate)
    /// is called for `url`.
    pub fn with_gate(self, url: &str, body: impl Into<Bytes>) -> Self {
        lock(&self.routes).insert(url.to_string(), Route::Gated {
            body: body.into(),
            gate: Arc::new(Semaphore::new(0)),
        });
        self
    }

    /// Let every pending and future body of a gated `url` finish.
    pub fn open_gate(&self, url: &str) {
        if let Some(Route::Gated { gate, .. }) = lock(&self.routes).get(url) {
            gate.close();
        }
    }

    /// Replace what `url` serves from now on.
    pub fn set_body(&self, url: &str, body: impl Into<Bytes>) {
        lock(&self.routes).insert(url.to_string(), Route::Body(body.into()));
    }

    /// Total number of requests made.
    pub fn requests(&self) -> usize { lock(&self.requests).values().sum() }

    pub fn requests_for(&self, url: &str) -> usize { lock(&self.requests).get(url).copied().unwrap_or(0) }
}

impl HttpClient for MockHttpClient {
    type Error = MockError;

    async fn stream(&self, url: &str) -> Result<BoxStream<'static, Result<Bytes, MockError>>, MockError> {
        let attempt = {
            let mut requests = lock(&self.requests);
            let count = requests.entry(url.to_string()).or_default();
            *count += 1;
            *count
        };
        let route = lock(&self.routes).get(url).cloned();

        match route {
            Some(Route::Body(body)) => Ok(chunked(body)),
            Some(Route::Flaky { failures, body }) if attempt > failures => Ok(chunked(body)),
            Some(Route::Flaky { .. }) => Err(MockError(format!("transient failure #{attempt}"))),
            Some(Route::Fail(message)) => Err(MockError(message)),
            Some(Route::Hang(body)) => {
                let head = body.slice(..body.len() / 2);
                Ok(stream::iter([Ok(head)]).chain(stream::pending()).boxed())
            }
            Some(Route::Gated { body, gate }) => {
                let mid = body.len() / 2;
                let head = body.slice(..mid);
                let tail = body.slice(mid..);
                let rest = stream::once(async move {
                    // Resolves with an error once the gate is closed.
                    let _ = gate.acquire().await;
                    Ok(tail)
                });
                Ok(stream::iter([Ok(head)]).chain(rest).boxed())
            }
            None => Err(MockError(format!("HTTP status client error (404 Not Found) for url ({url})"))),
        }
    }
}

fn chunked(body: Bytes) -> BoxStream<'static, Result<Bytes, MockError>> {
    let mid = body.len() / 2;
    stream::iter([Ok(body.slice(..mid)), Ok(body.slice(mid..))]).boxed()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> { mutex.lock().unwrap_or_else(PoisonError::into_inner) }
