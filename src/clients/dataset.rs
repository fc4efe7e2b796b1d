//! HTTP client for the dataset API.

use super::service::ServiceClient;
use super::{Auth, DatasetClient};
use crate::error::UpstreamError;
use crate::health::{CheckResult, Checker};
use crate::types::{DatasetDetails, DatasetResponse};
use async_trait::async_trait;
use std::time::Duration;

const SERVICE: &str = "dataset-api";

pub struct HttpDatasetClient {
    inner: ServiceClient,
}

impl HttpDatasetClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        Ok(Self {
            inner: ServiceClient::new(SERVICE, base_url, timeout)?,
        })
    }
}

#[async_trait]
impl DatasetClient for HttpDatasetClient {
    async fn dataset(&self, auth: &Auth, dataset_id: &str) -> Result<DatasetDetails, UpstreamError> {
        let response: DatasetResponse = self
            .inner
            .get_json(self.inner.endpoint(&["datasets", dataset_id]), auth)
            .await?;
        Ok(response.into())
    }
}

#[async_trait]
impl Checker for HttpDatasetClient {
    async fn check(&self) -> CheckResult {
        self.inner.check_health().await
    }
}
