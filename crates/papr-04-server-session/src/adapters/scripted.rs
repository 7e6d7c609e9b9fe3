use async_trait::async_trait;
use parking_lot::Mutex;

use crate::ports::outbound::{HttpRequest, HttpResponse, HttpTransport, TransportError};

type Handler = dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync;

/// Answers every request with a handler and keeps a log of requests.
pub struct ScriptedTransport {
    handler: Box<Handler>,
    log: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(
        handler: impl Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Requests seen so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().clone()
    }

    /// Requests whose URL ends with `suffix`.
    pub fn count(&self, suffix: &str) -> usize {
        self.log
            .lock()
            .iter()
            .filter(|r| r.url.ends_with(suffix))
            .count()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.log.lock().push(request.clone());
        // let concurrent callers interleave like real I/O
        tokio::task::yield_now().await;
        (self.handler)(&request)
    }
}
