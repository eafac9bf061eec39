use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use relay_core::{parse_request, RelayError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

// Output: GET /
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
}

// Output: every failure, `{"detail": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

// The one place a failure turns into HTTP
#[derive(Debug)]
pub enum ApiError {
    Relay(RelayError),
    // The body couldn't even be read (too large, aborted). Keeps axum's status.
    Body { status: StatusCode, detail: String },
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        ApiError::Relay(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Relay(RelayError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Relay(RelayError::Upstream { .. }) => StatusCode::BAD_GATEWAY,
            ApiError::Relay(RelayError::Config(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Body { status, .. } => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            ApiError::Relay(err) => err.to_string(),
            ApiError::Body { detail, .. } => detail,
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

// Input: a JSON body decoded into one of the request shapes.
// Unlike axum's `Json`, it doesn't insist on a Content-Type header and
// rejects with our own `{"detail": ...}` shape.
#[derive(Debug)]
pub struct RelayJson<T>(pub T);

impl<T, S> FromRequest<S> for RelayJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| {
                warn!("Failed to read request body: {}", e.body_text());
                ApiError::Body {
                    status: e.status(),
                    detail: e.body_text(),
                }
            })?;

        match parse_request(&body) {
            Ok(value) => Ok(RelayJson(value)),
            Err(e) => {
                warn!("Rejected request body: {}", e);
                Err(ApiError::Relay(e))
            }
        }
    }
}
