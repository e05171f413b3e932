//! Request gatekeeping for the control API
//!
//! Every route except `/health` needs the per-launch control token, sent in
//! the `x-control-token` header or, for `EventSource` clients that cannot set
//! headers, as a `token` query parameter. Requests carrying an `Origin` that is
//! not on the allow-list are refused even with a valid token.

use std::{
    io,
    path::{Path, PathBuf},
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use tokio::fs;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{error::AccessError, state::AppState};
use super::responses::ErrorResponse;

pub const TOKEN_HEADER: &str = "x-control-token";
const TOKEN_QUERY_KEY: &str = "token";
const TOKEN_FILE_NAME: &str = "control.token";

/// Who may talk to the control API
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    token: String,
    allowed_origins: Vec<HeaderValue>,
}

impl AccessPolicy {
    pub fn new(token: impl Into<String>, allowed_origins: &[String]) -> Self {
        let allowed_origins = allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring malformed allowed origin {:?}", origin);
                    None
                }
            })
            .collect();

        Self {
            token: token.into(),
            allowed_origins,
        }
    }

    /// Fresh random token for this launch
    pub fn generate(allowed_origins: &[String]) -> Self {
        Self::new(Uuid::new_v4().simple().to_string(), allowed_origins)
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn allowed_origins(&self) -> &[HeaderValue] {
        &self.allowed_origins
    }

    pub fn check(&self, headers: &HeaderMap, uri: &Uri) -> Result<(), AccessError> {
        if let Some(origin) = headers.get(header::ORIGIN) {
            if !self.allowed_origins.iter().any(|allowed| allowed == origin) {
                let origin = origin.to_str().unwrap_or("<non-ascii>").to_string();
                return Err(AccessError::ForeignOrigin(origin));
            }
        }

        let presented = headers
            .get(TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .or_else(|| query_token(uri))
            .ok_or(AccessError::MissingToken)?;

        if tokens_match(presented.as_bytes(), self.token.as_bytes()) {
            Ok(())
        } else {
            Err(AccessError::InvalidToken)
        }
    }

    /// CORS for the surfaces' own origins; `None` sends no CORS headers at all
    pub fn cors_layer(&self) -> Option<CorsLayer> {
        if self.allowed_origins.is_empty() {
            return None;
        }

        Some(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(self.allowed_origins.clone()))
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(TOKEN_HEADER)]),
        )
    }
}

fn query_token(uri: &Uri) -> Option<&str> {
    uri.query()?
        .split('&')
        .find_map(|pair| pair.strip_prefix(TOKEN_QUERY_KEY)?.strip_prefix('='))
}

/// Length-revealing but otherwise constant-time comparison
fn tokens_match(presented: &[u8], expected: &[u8]) -> bool {
    presented.len() == expected.len()
        && presented
            .iter()
            .zip(expected)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let status = match self {
            AccessError::MissingToken | AccessError::InvalidToken => StatusCode::UNAUTHORIZED,
            AccessError::ForeignOrigin(_) => StatusCode::FORBIDDEN,
        };
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Middleware guarding every protected route
pub async fn require_access(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Err(denied) = state.access.check(request.headers(), request.uri()) {
        warn!("Refused {} {}: {}", request.method(), request.uri().path(), denied);
        return denied.into_response();
    }
    next.run(request).await
}

/// Where the surfaces pick the token up
pub fn token_path(data_dir: &Path) -> PathBuf {
    data_dir.join(TOKEN_FILE_NAME)
}

/// Write the token to `<data-dir>/control.token`, readable by the owner only
pub async fn write_token_file(data_dir: &Path, token: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(data_dir).await?;
    let path = token_path(data_dir);
    fs::write(&path, token).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).await?;
    }

    info!("Control token written to {}", path.display());
    Ok(path)
}
