//! Shared HTTP plumbing for upstream services.

use super::{Auth, COLLECTION_ID_HEADER, FLORENCE_TOKEN_HEADER};
use crate::error::UpstreamError;
use crate::health::{CheckResult, Status};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// A reqwest client bound to one upstream base URL.
#[derive(Debug, Clone)]
pub(crate) struct ServiceClient {
    client: Client,
    base_url: Url,
    service: &'static str,
}

impl ServiceClient {
    pub(crate) fn new(
        service: &'static str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            UpstreamError::Invalid(format!("invalid {} URL {:?}: {}", service, base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::Invalid(format!(
                "{} URL {} cannot have a path",
                service, base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Transport { service, source: e })?;

        Ok(Self {
            client,
            base_url,
            service,
        })
    }

    pub(crate) fn service(&self) -> &'static str {
        self.service
    }

    /// URL of `segments` below the base URL. Each segment is percent-encoded,
    /// so ids taken from request paths cannot add path levels or a query.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub(crate) fn get(&self, url: Url) -> RequestBuilder {
        self.client.get(url)
    }

    pub(crate) fn post(&self, url: Url) -> RequestBuilder {
        self.client.post(url)
    }

    /// GET `url` with the caller's credentials and decode a 200 JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        auth: &Auth,
    ) -> Result<T, UpstreamError> {
        let uri = url.to_string();
        let request = with_auth(self.get(url), auth);
        let response = self.send(request).await?;

        if response.status() != StatusCode::OK {
            return Err(UpstreamError::Status {
                service: self.service,
                uri,
                actual: response.status(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| UpstreamError::Decode {
                service: self.service,
                uri,
                source: e,
            })
    }

    pub(crate) async fn send(
        &self,
        request: RequestBuilder,
    ) -> Result<reqwest::Response, UpstreamError> {
        request.send().await.map_err(|e| UpstreamError::Transport {
            service: self.service,
            source: e,
        })
    }

    /// Probe the service's `/health` endpoint.
    pub(crate) async fn check_health(&self) -> CheckResult {
        let url = self.endpoint(&["health"]);

        match self.get(url).send().await {
            Ok(response) => {
                let code = response.status();
                let status = match code {
                    StatusCode::OK => Status::Ok,
                    StatusCode::TOO_MANY_REQUESTS => Status::Warning,
                    _ => Status::Critical,
                };
                let message = match status {
                    Status::Ok => format!("{} is ok", self.service),
                    Status::Warning => format!("{} is degraded, but at least partially functioning", self.service),
                    Status::Critical => format!("{} functionality is unavailable or non-functioning", self.service),
                };
                CheckResult {
                    status,
                    status_code: Some(code.as_u16()),
                    message,
                }
            }
            Err(e) => {
                tracing::warn!(service = self.service, error = %e, "health check request failed");
                CheckResult {
                    status: Status::Critical,
                    status_code: None,
                    message: format!("{} is unreachable: {}", self.service, e),
                }
            }
        }
    }
}

/// Attach the user token, service token and collection id, skipping empty values.
pub(crate) fn with_auth(mut request: RequestBuilder, auth: &Auth) -> RequestBuilder {
    if !auth.user_token.is_empty() {
        request = request.header(FLORENCE_TOKEN_HEADER, &auth.user_token);
    }
    if !auth.service_token.is_empty() {
        request = request.bearer_auth(&auth.service_token);
    }
    if !auth.collection_id.is_empty() {
        request = request.header(COLLECTION_ID_HEADER, &auth.collection_id);
    }
    request
}
