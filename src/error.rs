use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Failures surfaced by the token lifecycle, the upstream client and the endpoints.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    // ── Token lifecycle ─────────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Token refresh failed ({status}): {body}")]
    UpstreamAuth { status: u16, body: String },

    #[error("Malformed token response: {0}")]
    MalformedTokenResponse(String),

    #[error("Token store error: {0}")]
    TokenStore(#[from] std::io::Error),

    // ── Upstream resources ──────────────────────────────────────────────
    #[error("BQE Error: {body}")]
    UpstreamRequest { status: u16, body: String },

    #[error("Upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),

    // ── Endpoint ────────────────────────────────────────────────────────
    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid parameter: {0}")]
    Validation(String),
}

pub type ProxyResult<T> = Result<T, ProxyError>;

impl ProxyError {
    /// Whether pagination may stop here and keep the pages it already has.
    pub fn is_page_failure(&self) -> bool {
        matches!(
            self,
            ProxyError::UpstreamRequest { .. } | ProxyError::Transport(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::UpstreamAuth { .. } => StatusCode::BAD_GATEWAY,
            ProxyError::MalformedTokenResponse(_) => StatusCode::BAD_GATEWAY,
            ProxyError::TokenStore(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::UpstreamRequest { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ProxyError::Transport(_) => StatusCode::BAD_GATEWAY,
            ProxyError::NotFound(_) => StatusCode::NOT_FOUND,
            ProxyError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ProxyError::Configuration(_) => "configuration_error",
            ProxyError::UpstreamAuth { .. } => "upstream_auth_error",
            ProxyError::MalformedTokenResponse(_) => "malformed_token_response",
            ProxyError::TokenStore(_) => "token_store_error",
            ProxyError::UpstreamRequest { .. } => "upstream_request_error",
            ProxyError::Transport(_) => "upstream_transport_error",
            ProxyError::NotFound(_) => "not_found",
            ProxyError::Validation(_) => "validation_error",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        }

        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}
