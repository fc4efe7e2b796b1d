use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single call to an upstream service.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("invalid response from {service} - should be: 200, got: {actual}, path: {uri}")]
    Status {
        service: &'static str,
        uri: String,
        actual: StatusCode,
    },

    #[error("request to {service} failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode {service} response from {uri}: {source}")]
    Decode {
        service: &'static str,
        uri: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{0}")]
    Invalid(String),
}

impl UpstreamError {
    /// Status code returned by the upstream, when it answered at all.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            UpstreamError::Status { actual, .. } => Some(*actual),
            UpstreamError::Transport { source, .. } | UpstreamError::Decode { source, .. } => {
                source.status()
            }
            UpstreamError::Invalid(_) => None,
        }
    }
}

/// One or more lookups of a fan-out batch failed; nothing from the batch is kept.
#[derive(Debug, thiserror::Error)]
#[error("{failed} of {total} lookups failed, first error: {first}")]
pub struct AggregationError {
    pub failed: usize,
    pub total: usize,
    #[source]
    pub first: UpstreamError,
}

/// Page-level failure, mapped to a bare HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to fetch {resource}: {source}")]
    PrimaryFetch {
        resource: String,
        #[source]
        source: UpstreamError,
    },

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error("render failed: {0}")]
    Render(#[source] UpstreamError),

    #[error("failed to serialize page model: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn primary(resource: impl Into<String>, source: UpstreamError) -> Self {
        Error::PrimaryFetch {
            resource: resource.into(),
            source,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::PrimaryFetch { source, .. }
                if source.status_code() == Some(StatusCode::NOT_FOUND) =>
            {
                StatusCode::NOT_FOUND
            }
            Error::PrimaryFetch { .. }
            | Error::Aggregation(_)
            | Error::Render(_)
            | Error::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::error!(error = %self, status = status.as_u16(), "setting response status");
        status.into_response()
    }
}
