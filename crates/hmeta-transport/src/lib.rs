//! hmeta-transport
//!
//! One authenticated JSON request/response exchange with the gateway
//! metadata endpoint, and classification of the response into success,
//! idempotent conflict, or hard failure.
//!
//! No retries happen here. Retry policy, if any, belongs to whoever wraps a
//! [`Transport`].

mod error;
mod http;

pub use error::{classify_response, GatewayError, IdempotentMarker, TransportError};
pub use http::{HttpTransport, ADMIN_SECRET_HEADER};

use serde_json::Value;

/// Gateway transport contract.
///
/// Object safe so the runtime can hold an `Arc<dyn Transport>`; `Send + Sync`
/// so a run can live inside a spawned task.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send one request payload and return the raw 2xx response body.
    ///
    /// Dropping the returned future aborts the in-flight request.
    async fn post(&self, payload: &Value) -> Result<Vec<u8>, TransportError>;
}

#[async_trait::async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn post(&self, payload: &Value) -> Result<Vec<u8>, TransportError> {
        (**self).post(payload).await
    }
}
