mod area;
mod health;
mod homepage;
mod list;

pub use area::area_page;
pub use health::health;
pub use homepage::homepage;
pub use list::list_page;

use crate::aggregator::Aggregator;
use crate::clients::{CodeListClient, DatasetClient, RenderClient};
use crate::health::HealthCheck;
use crate::model::{Metadata, Page, TaxonomyNode};
use crate::request::RequestContext;
use crate::{Error, Result};
use axum::{Router, response::Html, routing::get};
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub const HOMEPAGE_TEMPLATE: &str = "geography-homepage";
pub const LIST_TEMPLATE: &str = "geography-list";
pub const AREA_TEMPLATE: &str = "geography-area";

/// Settings copied onto every page model.
#[derive(Debug, Clone, Default)]
pub struct PageSettings {
    /// Path prefix of the API router, stripped from dataset links.
    pub api_router_version: String,
    pub taxonomy_domain: Option<String>,
    pub enable_loop11: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub code_lists: Arc<dyn CodeListClient>,
    pub datasets: Arc<dyn DatasetClient>,
    pub renderer: Arc<dyn RenderClient>,
    pub health: Arc<HealthCheck>,
    pub aggregator: Aggregator,
    pub settings: PageSettings,
}

impl AppState {
    fn base_page(&self, ctx: &RequestContext, title: String, breadcrumb: Vec<TaxonomyNode>) -> Page {
        let mut page = Page {
            beta_banner_enabled: true,
            enable_loop11: self.settings.enable_loop11,
            taxonomy_domain: self.settings.taxonomy_domain.clone(),
            metadata: Metadata { title },
            breadcrumb,
            ..Default::default()
        };
        ctx.apply_to(&mut page);
        page
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/geography", get(homepage))
        .route("/geography/:code_list_id", get(list_page))
        .route("/geography/:code_list_id/:code_id", get(area_page))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// Serialize the page model and have the renderer turn it into HTML.
async fn render<M: Serialize>(
    renderer: &dyn RenderClient,
    template: &str,
    page: &M,
) -> Result<Html<Bytes>> {
    let model = serde_json::to_vec(page).map_err(|e| {
        tracing::error!(template, error = %e, "error marshalling page data to JSON");
        Error::Serialization(e)
    })?;

    let html = renderer.render(template, model).await.map_err(|e| {
        tracing::error!(template, error = %e, "error rendering page");
        Error::Render(e)
    })?;

    Ok(Html(html))
}

/// Display order is by label, whatever order the lookups finished in.
/// Equal labels are ordered by `tie_break`, which must be unique per item.
fn sort_by_label<T>(
    items: &mut [T],
    label: impl Fn(&T) -> &str,
    tie_break: impl Fn(&T) -> &str,
) {
    items.sort_by(|a, b| {
        label(a)
            .cmp(label(b))
            .then_with(|| tie_break(a).cmp(tie_break(b)))
    });
}
