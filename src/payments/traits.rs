//! HTTP collaborator the orchestrator submits requests through
//!
//! The gateway client only ever POSTs JSON. Anything that can do that
//! (the bundled reqwest transport, a proxy, a test double) implements
//! [`HttpTransport`].

use crate::error::RaveResult;
use async_trait::async_trait;
use serde_json::Value;

/// Status and raw body of a gateway response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST `body` as JSON to `url` with the given headers.
    ///
    /// Non-2xx statuses are not errors at this level; they are returned as
    /// an [`HttpResponse`] for the classifier. Errors are reserved for
    /// requests that got no response at all.
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &Value,
    ) -> RaveResult<HttpResponse>;
}
