use super::{AREA_TEMPLATE, AppState, render, sort_by_label};
use crate::clients::{Auth, DatasetClient};
use crate::error::UpstreamError;
use crate::model::{AreaAttributes, AreaData, AreaPage, Dataset, breadcrumb};
use crate::request::RequestContext;
use crate::types::DatasetRef;
use crate::{Error, Result};
use axum::{
    extract::{Path, State},
    response::Html,
};
use bytes::Bytes;
use std::sync::Arc;

/// Shows one area code together with every dataset that uses it.
///
/// Dataset details are looked up concurrently; if any lookup fails the page
/// is not rendered.
pub async fn area_page(
    State(state): State<AppState>,
    Path((code_list_id, code_id)): Path<(String, String)>,
    ctx: RequestContext,
) -> Result<Html<Bytes>> {
    let editions = state
        .code_lists
        .code_list_editions(&ctx.auth, &code_list_id)
        .await
        .map_err(|e| {
            tracing::error!(code_list_id = %code_list_id, code_id = %code_id, error = %e, "error getting editions for a code-list");
            Error::primary(format!("code-list {}", code_list_id), e)
        })?;

    let mut parent_name = String::new();
    let mut title = String::new();
    let mut datasets = Vec::new();

    if let Some(edition) = editions.items.into_iter().next() {
        parent_name = edition.label;

        tracing::info!(code_list_id = %code_list_id, code_id = %code_id, edition = %edition.edition, "getting data about code");
        let code = state
            .code_lists
            .code(&ctx.auth, &code_list_id, &edition.edition, &code_id)
            .await
            .map_err(|e| {
                tracing::error!(code_list_id = %code_list_id, code_id = %code_id, error = %e, "error getting code data");
                Error::primary(format!("code {}/{}", code_list_id, code_id), e)
            })?;
        title = code.label;

        let related = state
            .code_lists
            .datasets_by_code(&ctx.auth, &code_list_id, &edition.edition, &code_id)
            .await
            .map_err(|e| {
                tracing::error!(code_list_id = %code_list_id, code_id = %code_id, error = %e, "error getting datasets related to code");
                Error::primary(format!("datasets for code {}/{}", code_list_id, code_id), e)
            })?;

        if !related.items.is_empty() {
            datasets = resolve_datasets(&state, &ctx.auth, related.items)
                .await
                .inspect_err(|e| {
                    tracing::error!(code_list_id = %code_list_id, code_id = %code_id, error = %e, "error getting dataset details");
                })?;
            sort_by_label(&mut datasets, |dataset| &dataset.label, |dataset| &dataset.uri);
        }
    }

    let trail = breadcrumb(
        Some((code_list_id.as_str(), parent_name.as_str())),
        Some((code_id.as_str(), title.as_str())),
    );
    let page = AreaPage {
        page: state.base_page(&ctx, title, trail),
        data: AreaData {
            attributes: AreaAttributes { code: code_id },
            datasets,
        },
    };

    render(state.renderer.as_ref(), AREA_TEMPLATE, &page).await
}

async fn resolve_datasets(
    state: &AppState,
    auth: &Auth,
    references: Vec<DatasetRef>,
) -> std::result::Result<Vec<Dataset>, crate::error::AggregationError> {
    let client = state.datasets.clone();
    let auth = auth.clone();
    let api_router_version = Arc::new(state.settings.api_router_version.clone());

    state
        .aggregator
        .resolve_all(references, move |reference: DatasetRef| {
            resolve_dataset(
                client.clone(),
                auth.clone(),
                api_router_version.clone(),
                reference,
            )
        })
        .await
}

async fn resolve_dataset(
    client: Arc<dyn DatasetClient>,
    auth: Auth,
    api_router_version: Arc<String>,
    reference: DatasetRef,
) -> std::result::Result<Dataset, UpstreamError> {
    let dataset_id = reference.links.self_link.id;
    let edition = reference
        .editions
        .into_iter()
        .next()
        .ok_or_else(|| UpstreamError::Invalid(format!("dataset {} has no editions", dataset_id)))?;

    let details = client.dataset(&auth, &dataset_id).await.inspect_err(|e| {
        tracing::error!(dataset_id = %dataset_id, error = %e, "error getting dataset");
    })?;

    let uri = website_path(&edition.links.latest_version.href, &api_router_version)?;

    Ok(Dataset {
        id: edition.links.self_link.id,
        label: details.title,
        description: details.description,
        uri,
    })
}

/// Path of an API link with the router's version prefix removed.
fn website_path(href: &str, api_router_version: &str) -> std::result::Result<String, UpstreamError> {
    let url = url::Url::parse(href).map_err(|e| {
        UpstreamError::Invalid(format!("error parsing dataset href {:?}: {}", href, e))
    })?;

    let path = url.path();
    Ok(path
        .strip_prefix(api_router_version)
        .unwrap_or(path)
        .to_string())
}
