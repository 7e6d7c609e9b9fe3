//! Recording review-server gateway for tests and offline use.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::wire::{AcceptRequest, SubmitRequest};
use shared_types::Server;

use crate::ports::outbound::{GatewayError, ReviewServerGateway};

/// One notification seen by [`RecordingGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Submit { server: String, request: SubmitRequest },
    Accept { server: String, request: AcceptRequest },
}

/// Records every notification; can be told to reject them.
#[derive(Default)]
pub struct RecordingGateway {
    calls: Mutex<Vec<GatewayCall>>,
    failure: Mutex<Option<GatewayError>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every notification with `error` until cleared.
    pub fn fail_with(&self, error: Option<GatewayError>) {
        *self.failure.lock() = error;
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: GatewayCall) -> Result<(), GatewayError> {
        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }
        self.calls.lock().push(call);
        Ok(())
    }
}

#[async_trait]
impl ReviewServerGateway for RecordingGateway {
    async fn submit(&self, server: &Server, request: SubmitRequest) -> Result<(), GatewayError> {
        self.record(GatewayCall::Submit {
            server: server.name.clone(),
            request,
        })
    }

    async fn accept(&self, server: &Server, request: AcceptRequest) -> Result<(), GatewayError> {
        self.record(GatewayCall::Accept {
            server: server.name.clone(),
            request,
        })
    }
}
