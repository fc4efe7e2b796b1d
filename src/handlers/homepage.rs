use super::{AppState, HOMEPAGE_TEMPLATE, render, sort_by_label};
use crate::error::UpstreamError;
use crate::model::{GEOGRAPHY_URI, HomepagePage, Item, ItemsData, breadcrumb};
use crate::request::RequestContext;
use crate::{Error, Result};
use axum::{extract::State, response::Html};
use bytes::Bytes;

/// Lists the geography types, labelled by the first edition of each code list.
pub async fn homepage(State(state): State<AppState>, ctx: RequestContext) -> Result<Html<Bytes>> {
    let code_lists = state
        .code_lists
        .geography_code_lists(&ctx.auth)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "error getting geography code-lists");
            Error::primary("geography code-lists", e)
        })?;

    let code_list_ids: Vec<String> = code_lists
        .items
        .into_iter()
        .map(|code_list| code_list.links.self_link.id)
        .collect();

    let client = state.code_lists.clone();
    let auth = ctx.auth.clone();
    let resolved = state
        .aggregator
        .resolve_all(code_list_ids, move |code_list_id: String| {
            let client = client.clone();
            let auth = auth.clone();
            async move {
                let editions = client
                    .code_list_editions(&auth, &code_list_id)
                    .await
                    .inspect_err(|e| {
                        tracing::error!(code_list_id = %code_list_id, error = %e, "error getting editions for code-list");
                    })?;

                // Code lists without a labelled edition are left off the page.
                Ok::<_, UpstreamError>(editions
                    .items
                    .into_iter()
                    .next()
                    .filter(|edition| !edition.label.is_empty())
                    .map(|edition| Item {
                        label: edition.label,
                        uri: format!("{}/{}", GEOGRAPHY_URI, code_list_id),
                        id: code_list_id,
                    }))
            }
        })
        .await?;

    let mut items: Vec<Item> = resolved.into_iter().flatten().collect();
    sort_by_label(&mut items, |item| &item.label, |item| &item.id);

    let page = HomepagePage {
        page: state.base_page(&ctx, "Geography".to_string(), breadcrumb(None, None)),
        data: ItemsData { items },
    };

    render(state.renderer.as_ref(), HOMEPAGE_TEMPLATE, &page).await
}
