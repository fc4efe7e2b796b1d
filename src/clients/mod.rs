//! Clients for the services the pages are assembled from.
//!
//! Each upstream is reached through a trait so handlers can be driven by
//! in-memory implementations in tests.
//!
//! # Implementations
//!
//! - [`HttpCodeListClient`] - code-list API
//! - [`HttpDatasetClient`] - dataset API
//! - [`HttpRenderClient`] - page renderer
//!
//! All three also implement [`Checker`](crate::health::Checker) against the
//! service's `/health` endpoint.

mod codelist;
mod dataset;
mod renderer;
mod service;

pub use codelist::HttpCodeListClient;
pub use dataset::HttpDatasetClient;
pub use renderer::HttpRenderClient;

use crate::error::UpstreamError;
use crate::types::{
    CodeListResults, CodeResult, CodesResults, DatasetDetails, DatasetsResult,
    EditionsListResults,
};
use async_trait::async_trait;
use bytes::Bytes;

pub(crate) const FLORENCE_TOKEN_HEADER: &str = "X-Florence-Token";
pub(crate) const COLLECTION_ID_HEADER: &str = "Collection-Id";

/// Credentials and collection forwarded with every upstream call of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Auth {
    pub user_token: String,
    pub service_token: String,
    pub collection_id: String,
}

#[async_trait]
pub trait CodeListClient: Send + Sync {
    async fn geography_code_lists(&self, auth: &Auth) -> Result<CodeListResults, UpstreamError>;

    async fn code_list_editions(
        &self,
        auth: &Auth,
        code_list_id: &str,
    ) -> Result<EditionsListResults, UpstreamError>;

    async fn codes(
        &self,
        auth: &Auth,
        code_list_id: &str,
        edition: &str,
    ) -> Result<CodesResults, UpstreamError>;

    async fn code(
        &self,
        auth: &Auth,
        code_list_id: &str,
        edition: &str,
        code_id: &str,
    ) -> Result<CodeResult, UpstreamError>;

    /// Datasets that use the given code.
    async fn datasets_by_code(
        &self,
        auth: &Auth,
        code_list_id: &str,
        edition: &str,
        code_id: &str,
    ) -> Result<DatasetsResult, UpstreamError>;
}

#[async_trait]
pub trait DatasetClient: Send + Sync {
    async fn dataset(&self, auth: &Auth, dataset_id: &str) -> Result<DatasetDetails, UpstreamError>;
}

#[async_trait]
pub trait RenderClient: Send + Sync {
    /// Render `template` with the JSON page model, returning HTML.
    async fn render(&self, template: &str, model: Vec<u8>) -> Result<Bytes, UpstreamError>;
}
