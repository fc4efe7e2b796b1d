use super::{AppState, LIST_TEMPLATE, render, sort_by_label};
use crate::model::{GEOGRAPHY_URI, Item, ItemsData, ListPage, breadcrumb};
use crate::request::RequestContext;
use crate::{Error, Result};
use axum::{
    extract::{Path, State},
    response::Html,
};
use bytes::Bytes;

/// Lists the codes of the first edition of a code list.
pub async fn list_page(
    State(state): State<AppState>,
    Path(code_list_id): Path<String>,
    ctx: RequestContext,
) -> Result<Html<Bytes>> {
    let editions = state
        .code_lists
        .code_list_editions(&ctx.auth, &code_list_id)
        .await
        .map_err(|e| {
            tracing::error!(code_list_id = %code_list_id, error = %e, "error getting editions for a code-list");
            Error::primary(format!("code-list {}", code_list_id), e)
        })?;

    let mut title = String::new();
    let mut items = Vec::new();

    if let Some(edition) = editions.items.into_iter().next() {
        title = edition.label;

        tracing::info!(code_list_id = %code_list_id, edition = %edition.edition, "getting codes for edition of a code list");
        let codes = state
            .code_lists
            .codes(&ctx.auth, &code_list_id, &edition.edition)
            .await
            .map_err(|e| {
                tracing::error!(
                    code_list_id = %code_list_id,
                    edition = %edition.edition,
                    error = %e,
                    "error getting codes for an edition of a code-list"
                );
                Error::primary(format!("codes of {}/{}", code_list_id, edition.edition), e)
            })?;

        items = codes
            .items
            .into_iter()
            .map(|code| Item {
                uri: format!("{}/{}/{}", GEOGRAPHY_URI, code_list_id, code.code),
                id: code.code,
                label: code.label,
            })
            .collect();
        sort_by_label(&mut items, |item| &item.label, |item| &item.id);
    }

    let trail = breadcrumb(Some((code_list_id.as_str(), title.as_str())), None);
    let page = ListPage {
        page: state.base_page(&ctx, title, trail),
        data: ItemsData { items },
    };

    render(state.renderer.as_ref(), LIST_TEMPLATE, &page).await
}
