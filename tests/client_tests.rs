//! HTTP clients exercised against stub upstream services on a local port.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    routing::{get, post},
};
use geography_frontend::{
    clients::{
        Auth, CodeListClient, DatasetClient, HttpCodeListClient, HttpDatasetClient,
        HttpRenderClient, RenderClient,
    },
    error::UpstreamError,
    health::{Checker, Status},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Duration;

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn header(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn auth() -> Auth {
    Auth {
        user_token: "user-token".to_string(),
        service_token: "service-token".to_string(),
        collection_id: "collection".to_string(),
    }
}

fn code_list_api() -> Router {
    Router::new()
        .route(
            "/code-lists",
            get(
                |Query(query): Query<HashMap<String, String>>, headers: HeaderMap| async move {
                    if query.get("type").map(String::as_str) != Some("geography") {
                        return Err(StatusCode::BAD_REQUEST);
                    }
                    // Echo the forwarded credentials back as ids.
                    Ok(Json(json!({
                        "count": 3,
                        "items": [
                            {"links": {"self": {"id": header(&headers, "x-florence-token")}}},
                            {"links": {"self": {"id": header(&headers, "authorization")}}},
                            {"links": {"self": {"id": header(&headers, "collection-id")}}}
                        ]
                    })))
                },
            ),
        )
        .route(
            "/code-lists/:id/editions",
            get(|Path(id): Path<String>| async move {
                if id == "missing" {
                    return Err(StatusCode::NOT_FOUND);
                }
                Ok(Json(json!({
                    "count": 1,
                    "items": [{"edition": "2016", "label": format!("{} label", id)}]
                })))
            }),
        )
        .route(
            "/code-lists/:id/editions/:edition/codes",
            get(|| async {
                Json(json!({
                    "count": 2,
                    "items": [
                        {"code": "E06000028", "label": "Bournemouth"},
                        {"code": "S12000033", "label": "Aberdeen City"}
                    ]
                }))
            }),
        )
        .route(
            "/code-lists/:id/editions/:edition/codes/:code",
            get(|Path((_, _, code)): Path<(String, String, String)>| async move {
                Json(json!({"id": code, "label": "Bournemouth"}))
            }),
        )
        .route(
            "/code-lists/:id/editions/:edition/codes/:code/datasets",
            get(|| async {
                Json(json!({
                    "count": 1,
                    "items": [{
                        "dimension_label": "Geography",
                        "links": {"self": {"id": "cpih01"}},
                        "editions": [{
                            "links": {
                                "self": {"id": "time-series"},
                                "latest_version": {"href": "http://localhost:23200/v1/datasets/cpih01/editions/time-series/versions/3", "id": "3"}
                            }
                        }]
                    }]
                }))
            }),
        )
        .route("/health", get(|| async { StatusCode::OK }))
}

fn dataset_api() -> Router {
    Router::new()
        .route(
            "/datasets/:id",
            get(|Path(id): Path<String>, headers: HeaderMap| async move {
                let details = json!({"id": id, "title": "Consumer price inflation", "description": "CPIH"});
                let body = match id.as_str() {
                    "broken" => "not json".to_string(),
                    _ if headers.contains_key("authorization") => {
                        json!({"next": details, "current": details}).to_string()
                    }
                    _ => details.to_string(),
                };
                ([(CONTENT_TYPE, "application/json")], body)
            }),
        )
        .route("/health", get(|| async { StatusCode::TOO_MANY_REQUESTS }))
}

fn renderer() -> Router {
    Router::new()
        .route(
            "/:template",
            post(|Path(template): Path<String>, headers: HeaderMap, body: Bytes| async move {
                if template == "geography-broken" {
                    return Err(StatusCode::INTERNAL_SERVER_ERROR);
                }
                let model: Value = serde_json::from_slice(&body).map_err(|_| StatusCode::BAD_REQUEST)?;
                Ok(format!(
                    "<h1>{}</h1><p>{}</p><p>{}</p>",
                    template,
                    model["metadata"]["title"].as_str().unwrap_or_default(),
                    header(&headers, "content-type")
                ))
            }),
        )
        .route("/health", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
}

#[tokio::test]
async fn test_code_list_client_forwards_auth() {
    let base = spawn(code_list_api()).await;
    let client = HttpCodeListClient::new(&base, Duration::from_secs(5)).unwrap();

    let results = client.geography_code_lists(&auth()).await.unwrap();
    let ids: Vec<&str> = results
        .items
        .iter()
        .map(|item| item.links.self_link.id.as_str())
        .collect();
    assert_eq!(ids, vec!["user-token", "Bearer service-token", "collection"]);
}

#[tokio::test]
async fn test_code_list_client_omits_empty_auth() {
    let base = spawn(code_list_api()).await;
    let client = HttpCodeListClient::new(&base, Duration::from_secs(5)).unwrap();

    let results = client.geography_code_lists(&Auth::default()).await.unwrap();
    assert!(results.items.iter().all(|item| item.links.self_link.id.is_empty()));
}

#[tokio::test]
async fn test_code_list_client_editions_codes_and_datasets() {
    let base = spawn(code_list_api()).await;
    let client = HttpCodeListClient::new(&base, Duration::from_secs(5)).unwrap();
    let auth = auth();

    let editions = client
        .code_list_editions(&auth, "local-authority")
        .await
        .unwrap();
    assert_eq!(editions.items[0].edition, "2016");
    assert_eq!(editions.items[0].label, "local-authority label");

    let codes = client.codes(&auth, "local-authority", "2016").await.unwrap();
    assert_eq!(codes.count, 2);
    assert_eq!(codes.items[1].label, "Aberdeen City");

    let code = client
        .code(&auth, "local-authority", "2016", "E06000028")
        .await
        .unwrap();
    assert_eq!(code.id, "E06000028");
    assert_eq!(code.label, "Bournemouth");

    let datasets = client
        .datasets_by_code(&auth, "local-authority", "2016", "E06000028")
        .await
        .unwrap();
    assert_eq!(datasets.items[0].links.self_link.id, "cpih01");
    assert_eq!(
        datasets.items[0].editions[0].links.self_link.id,
        "time-series"
    );
}

#[tokio::test]
async fn test_code_list_client_escapes_ids() {
    let base = spawn(code_list_api()).await;
    let client = HttpCodeListClient::new(&base, Duration::from_secs(5)).unwrap();

    // Reaches the editions route with the id intact, not the code-lists query.
    let editions = client
        .code_list_editions(&auth(), "a?type=geography")
        .await
        .unwrap();
    assert_eq!(editions.items[0].label, "a?type=geography label");
}

#[tokio::test]
async fn test_code_list_client_not_found_keeps_status() {
    let base = spawn(code_list_api()).await;
    let client = HttpCodeListClient::new(&base, Duration::from_secs(5)).unwrap();

    let err = client
        .code_list_editions(&auth(), "missing")
        .await
        .unwrap_err();
    assert!(matches!(err, UpstreamError::Status { .. }));
    assert_eq!(err.status_code(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn test_dataset_client_plain_and_wrapped() {
    let base = spawn(dataset_api()).await;
    let client = HttpDatasetClient::new(&base, Duration::from_secs(5)).unwrap();

    let plain = client.dataset(&Auth::default(), "cpih01").await.unwrap();
    assert_eq!(plain.title, "Consumer price inflation");

    let wrapped = client.dataset(&auth(), "cpih01").await.unwrap();
    assert_eq!(wrapped, plain);
}

#[tokio::test]
async fn test_dataset_client_decode_error() {
    let base = spawn(dataset_api()).await;
    let client = HttpDatasetClient::new(&base, Duration::from_secs(5)).unwrap();

    let err = client.dataset(&auth(), "broken").await.unwrap_err();
    assert!(matches!(err, UpstreamError::Decode { .. }));
    assert_eq!(err.status_code(), None);
}

#[tokio::test]
async fn test_render_client_posts_model() {
    let base = spawn(renderer()).await;
    let client = HttpRenderClient::new(&base, Duration::from_secs(5)).unwrap();

    let model = serde_json::to_vec(&json!({"metadata": {"title": "Geography"}})).unwrap();
    let html = client.render("geography-homepage", model).await.unwrap();
    assert_eq!(
        &html[..],
        b"<h1>geography-homepage</h1><p>Geography</p><p>application/json</p>"
    );
}

#[tokio::test]
async fn test_render_client_error_status() {
    let base = spawn(renderer()).await;
    let client = HttpRenderClient::new(&base, Duration::from_secs(5)).unwrap();

    let err = client
        .render("geography-broken", b"{}".to_vec())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(StatusCode::INTERNAL_SERVER_ERROR));
}

#[tokio::test]
async fn test_health_checks_map_status_codes() {
    let code_lists =
        HttpCodeListClient::new(&spawn(code_list_api()).await, Duration::from_secs(5)).unwrap();
    let datasets =
        HttpDatasetClient::new(&spawn(dataset_api()).await, Duration::from_secs(5)).unwrap();
    let renderer =
        HttpRenderClient::new(&spawn(renderer()).await, Duration::from_secs(5)).unwrap();

    let ok = code_lists.check().await;
    assert_eq!(ok.status, Status::Ok);
    assert_eq!(ok.status_code, Some(200));

    let warning = datasets.check().await;
    assert_eq!(warning.status, Status::Warning);
    assert_eq!(warning.status_code, Some(429));

    let critical = renderer.check().await;
    assert_eq!(critical.status, Status::Critical);
    assert_eq!(critical.status_code, Some(503));
}

#[tokio::test]
async fn test_health_check_unreachable_service() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client =
        HttpDatasetClient::new(&format!("http://{}", addr), Duration::from_secs(2)).unwrap();
    let result = client.check().await;
    assert_eq!(result.status, Status::Critical);
    assert_eq!(result.status_code, None);

    let err = client.dataset(&auth(), "cpih01").await.unwrap_err();
    assert!(matches!(err, UpstreamError::Transport { .. }));
}
