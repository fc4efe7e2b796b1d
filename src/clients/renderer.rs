//! HTTP client for the page renderer.

use super::RenderClient;
use super::service::ServiceClient;
use crate::error::UpstreamError;
use crate::health::{CheckResult, Checker};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

const SERVICE: &str = "renderer";

pub struct HttpRenderClient {
    inner: ServiceClient,
}

impl HttpRenderClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        Ok(Self {
            inner: ServiceClient::new(SERVICE, base_url, timeout)?,
        })
    }
}

#[async_trait]
impl RenderClient for HttpRenderClient {
    async fn render(&self, template: &str, model: Vec<u8>) -> Result<Bytes, UpstreamError> {
        let url = self.inner.endpoint(&[template]);
        let uri = url.to_string();
        let request = self
            .inner
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(model);

        let response = self.inner.send(request).await?;

        if response.status() != StatusCode::OK {
            return Err(UpstreamError::Status {
                service: self.inner.service(),
                uri,
                actual: response.status(),
            });
        }

        response.bytes().await.map_err(|e| UpstreamError::Decode {
            service: self.inner.service(),
            uri,
            source: e,
        })
    }
}

#[async_trait]
impl Checker for HttpRenderClient {
    async fn check(&self) -> CheckResult {
        self.inner.check_health().await
    }
}
