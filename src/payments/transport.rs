//! reqwest-backed [`HttpTransport`]

use crate::error::{RaveError, RaveResult};
use crate::payments::traits::{HttpResponse, HttpTransport};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> RaveResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rave-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                RaveError::configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &Value,
    ) -> RaveResult<HttpResponse> {
        let mut request = self.client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!("POST {} -> HTTP {}", url, status);
        Ok(HttpResponse { status, body })
    }
}
