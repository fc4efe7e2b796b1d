//! HTTP client for the code-list API.

use super::service::ServiceClient;
use super::{Auth, CodeListClient};
use crate::error::UpstreamError;
use crate::health::{CheckResult, Checker};
use crate::types::{
    CodeListResults, CodeResult, CodesResults, DatasetsResult, EditionsListResults,
};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

const SERVICE: &str = "code-list-api";

pub struct HttpCodeListClient {
    inner: ServiceClient,
}

impl HttpCodeListClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        Ok(Self {
            inner: ServiceClient::new(SERVICE, base_url, timeout)?,
        })
    }

    fn editions_url(&self, code_list_id: &str) -> Url {
        self.inner.endpoint(&["code-lists", code_list_id, "editions"])
    }

    fn codes_url(&self, code_list_id: &str, edition: &str) -> Url {
        self.inner
            .endpoint(&["code-lists", code_list_id, "editions", edition, "codes"])
    }

    fn code_url(&self, code_list_id: &str, edition: &str, code_id: &str) -> Url {
        self.inner.endpoint(&[
            "code-lists",
            code_list_id,
            "editions",
            edition,
            "codes",
            code_id,
        ])
    }
}

#[async_trait]
impl CodeListClient for HttpCodeListClient {
    async fn geography_code_lists(&self, auth: &Auth) -> Result<CodeListResults, UpstreamError> {
        let mut url = self.inner.endpoint(&["code-lists"]);
        url.query_pairs_mut().append_pair("type", "geography");
        self.inner.get_json(url, auth).await
    }

    async fn code_list_editions(
        &self,
        auth: &Auth,
        code_list_id: &str,
    ) -> Result<EditionsListResults, UpstreamError> {
        self.inner
            .get_json(self.editions_url(code_list_id), auth)
            .await
    }

    async fn codes(
        &self,
        auth: &Auth,
        code_list_id: &str,
        edition: &str,
    ) -> Result<CodesResults, UpstreamError> {
        self.inner
            .get_json(self.codes_url(code_list_id, edition), auth)
            .await
    }

    async fn code(
        &self,
        auth: &Auth,
        code_list_id: &str,
        edition: &str,
        code_id: &str,
    ) -> Result<CodeResult, UpstreamError> {
        self.inner
            .get_json(self.code_url(code_list_id, edition, code_id), auth)
            .await
    }

    async fn datasets_by_code(
        &self,
        auth: &Auth,
        code_list_id: &str,
        edition: &str,
        code_id: &str,
    ) -> Result<DatasetsResult, UpstreamError> {
        let mut url = self.code_url(code_list_id, edition, code_id);
        if let Ok(mut path) = url.path_segments_mut() {
            path.push("datasets");
        }
        self.inner.get_json(url, auth).await
    }
}

#[async_trait]
impl Checker for HttpCodeListClient {
    async fn check(&self) -> CheckResult {
        self.inner.check_health().await
    }
}
