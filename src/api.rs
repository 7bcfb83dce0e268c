//! HTTP surface: range queries over axum.
//!
//! `GET /fibonacci?from=<start>&to=<end>` answers with the JSON array of terms,
//! written as exact integers however many digits they have. The same handler is
//! mounted at `/fibonachi/` for existing clients.
//!
//! Failures use one body shape, `{"type": ..., "message": ...}`:
//!
//! | type               | status |
//! |--------------------|--------|
//! | `PARAMETERS_ERROR` | 400    |
//! | `RESOURCE_ERROR`   | 404    |
//! | `SYSTEM_ERROR`     | 500    |

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{debug, error, info, Instrument};

use crate::errors::SequenceError;
use crate::request::RangeRequest;
use crate::sequence::{RangeResolver, ResolvedSequence};
use crate::tracing::spans;

/// Primary route
pub const SEQUENCE_PATH: &str = "/fibonacci";
/// Route kept for clients of the first release
pub const LEGACY_SEQUENCE_PATH: &str = "/fibonachi/";

/// Error category reported in the `type` field of a failure body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseType {
    ParametersError,
    ResourceError,
    SystemError,
}

impl ResponseType {
    pub fn status(&self) -> StatusCode {
        match self {
            ResponseType::ParametersError => StatusCode::BAD_REQUEST,
            ResponseType::ResourceError => StatusCode::NOT_FOUND,
            ResponseType::SystemError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A failed request, rendered as `{"type": ..., "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub message: String,
}

impl ApiError {
    pub fn new(response_type: ResponseType, message: impl Into<String>) -> Self {
        Self {
            response_type,
            message: message.into(),
        }
    }
}

impl From<SequenceError> for ApiError {
    fn from(err: SequenceError) -> Self {
        if err.kind().is_client_error() {
            ApiError::new(ResponseType::ParametersError, err.reason())
        } else {
            ApiError::new(ResponseType::SystemError, err.to_string())
        }
    }
}

/// A query string the extractor could not decode, e.g. a repeated `from`.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::new(ResponseType::ParametersError, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.response_type.status(), Json(self)).into_response()
    }
}

/// Query parameters for the sequence endpoints.
///
/// Both are kept as raw strings so that missing and non-integer values are
/// reported through validation. Only a malformed query string is rejected by the
/// extractor, and that rejection is still answered with a JSON body.
#[derive(Debug, Default, Deserialize)]
pub struct SequenceQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Handler for the sequence endpoints.
async fn get_sequence(
    State(resolver): State<RangeResolver>,
    query: Result<Query<SequenceQuery>, QueryRejection>,
) -> Result<Json<ResolvedSequence>, ApiError> {
    let Query(params) = query.inspect_err(|rejection| {
        debug!(error = %rejection, "Rejected sequence query string");
    })?;
    let from = params.from.as_deref();
    let to = params.to.as_deref();

    async move {
        let range = RangeRequest::new(from, to).validate()?;
        let sequence = resolver.resolve(range).await?;
        Ok::<_, SequenceError>(Json(sequence))
    }
    .instrument(spans::sequence_request(from, to))
    .await
    .map_err(|err| {
        if err.kind().is_client_error() {
            debug!(error = %err, "Rejected sequence request");
        } else {
            error!(error = %err, kind = %err.kind(), "Sequence request failed");
        }
        ApiError::from(err)
    })
}

async fn not_found() -> ApiError {
    ApiError::new(ResponseType::ResourceError, "resource not found")
}

/// Builds the application router around a shared resolver.
pub fn router(resolver: RangeResolver) -> Router {
    Router::new()
        .route(SEQUENCE_PATH, get(get_sequence))
        .route(LEGACY_SEQUENCE_PATH, get(get_sequence))
        .fallback(not_found)
        .with_state(resolver)
}

/// Starts the API server.
pub async fn serve_api(listener: TcpListener, resolver: RangeResolver) -> anyhow::Result<()> {
    let app = router(resolver);

    let addr = listener.local_addr()?;

    info!(address = ?addr, "Starting server");

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreError;

    #[test]
    fn test_response_type_serialization() {
        let body =
            serde_json::to_value(ApiError::new(ResponseType::ParametersError, "x")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"type": "PARAMETERS_ERROR", "message": "x"})
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ResponseType::ParametersError.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ResponseType::ResourceError.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ResponseType::SystemError.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_sequence_error_mapping() {
        let err = ApiError::from(SequenceError::invalid_argument("start must be positive"));
        assert_eq!(err.response_type, ResponseType::ParametersError);
        assert_eq!(err.message, "start must be positive");

        let err = ApiError::from(SequenceError::from(StoreError::unavailable(
            "DiskStore",
            "lock timeout",
        )));
        assert_eq!(err.response_type, ResponseType::SystemError);
        assert!(err.message.contains("lock timeout"));

        let err = ApiError::from(SequenceError::from(StoreError::corrupt_entry("7", "bad term")));
        assert_eq!(err.response_type, ResponseType::SystemError);
    }
}
