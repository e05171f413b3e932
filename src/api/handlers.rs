//! HTTP endpoint handlers
//!
//! Every body is untrusted input; the control loop re-validates it.

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use crate::{
    control::SurfaceEvent,
    error::ControlError,
    services::ClearOutcome,
    state::AppState,
    surfaces::MenuModel,
};
use super::responses::{
    ApiResponse, DevelopmentResponse, DigitBody, DigitResponse, ErrorResponse, HealthResponse,
    IdleTimeoutBody, KeyBody, KeyResponse, PasscodeBody, StatusResponse,
};

/// Maps control failures onto status codes with an inline message
#[derive(Debug)]
pub struct ApiError(pub ControlError);

impl From<ControlError> for ApiError {
    fn from(e: ControlError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ControlError::Closed => StatusCode::SERVICE_UNAVAILABLE,
            ControlError::InvalidDigit(_) => StatusCode::BAD_REQUEST,
            ControlError::Settings(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            ControlError::Settings(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        (status, Json(ErrorResponse::new(self.0.to_string()))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Handle POST /unlock - caller has already matched the passcode
pub async fn unlock_handler(State(state): State<AppState>) -> ApiResult<ApiResponse> {
    if state.control.unlock().await? {
        info!("Unlock endpoint called - app unlocked");
        Ok(Json(ApiResponse::ok("App unlocked")))
    } else {
        Ok(Json(ApiResponse::refused("App is already unlocked")))
    }
}

/// Handle POST /lock - boss key or menu entry
pub async fn lock_handler(State(state): State<AppState>) -> ApiResult<ApiResponse> {
    if state.control.lock().await? {
        info!("Lock endpoint called - app locked");
        Ok(Json(ApiResponse::ok("App locked")))
    } else {
        Ok(Json(ApiResponse::refused("App is already locked or content is not loaded")))
    }
}

/// Handle GET /passcode
pub async fn get_passcode_handler(State(state): State<AppState>) -> ApiResult<PasscodeBody> {
    let passcode = state.control.passcode().await?;
    Ok(Json(PasscodeBody { passcode }))
}

/// Handle PUT /passcode
pub async fn set_passcode_handler(
    State(state): State<AppState>,
    Json(body): Json<PasscodeBody>,
) -> ApiResult<ApiResponse> {
    state.control.set_passcode(body.passcode).await?;
    Ok(Json(ApiResponse::ok("Passcode saved")))
}

/// Handle DELETE /passcode - back to defaults
pub async fn reset_passcode_handler(State(state): State<AppState>) -> ApiResult<ApiResponse> {
    state.control.reset_passcode().await?;
    Ok(Json(ApiResponse::ok("Passcode reset to default")))
}

/// Handle GET /idle-timeout
pub async fn get_idle_timeout_handler(State(state): State<AppState>) -> ApiResult<IdleTimeoutBody> {
    let seconds = state.control.idle_timeout().await?;
    Ok(Json(IdleTimeoutBody { seconds }))
}

/// Handle PUT /idle-timeout
pub async fn set_idle_timeout_handler(
    State(state): State<AppState>,
    Json(body): Json<IdleTimeoutBody>,
) -> ApiResult<ApiResponse> {
    state.control.set_idle_timeout(body.seconds).await?;
    Ok(Json(ApiResponse::ok("Idle timeout saved")))
}

/// Handle POST /panic - always reports success once the loop handled it
pub async fn panic_handler(State(state): State<AppState>) -> ApiResult<ApiResponse> {
    state.control.panic().await?;
    Ok(Json(ApiResponse::ok("Locked")))
}

/// Handle POST /content-data/clear
pub async fn clear_content_data_handler(State(state): State<AppState>) -> ApiResult<ClearOutcome> {
    let outcome = state.control.clear_content_data().await?;
    Ok(Json(outcome))
}

/// Handle GET /development
pub async fn development_handler(State(state): State<AppState>) -> ApiResult<DevelopmentResponse> {
    let development = state.control.is_development_mode().await?;
    Ok(Json(DevelopmentResponse { development }))
}

/// Handle POST /disguise/digits - one calculator digit
pub async fn digit_handler(
    State(state): State<AppState>,
    Json(body): Json<DigitBody>,
) -> ApiResult<DigitResponse> {
    let outcome = state.control.disguise_digit(body.digit).await?;
    Ok(Json(DigitResponse { outcome }))
}

/// Handle DELETE /disguise/digits - calculator all-clear
pub async fn clear_digits_handler(State(state): State<AppState>) -> ApiResult<ApiResponse> {
    state.control.disguise_clear().await?;
    Ok(Json(ApiResponse::ok("Cleared")))
}

/// Handle POST /content/keys - raw keystream of the embedded view
pub async fn content_key_handler(
    State(state): State<AppState>,
    Json(body): Json<KeyBody>,
) -> ApiResult<KeyResponse> {
    let panic_triggered = state.control.content_key(body.key).await?;
    Ok(Json(KeyResponse { panic_triggered }))
}

/// Handle POST /events - window and content view signals
pub async fn surface_event_handler(
    State(state): State<AppState>,
    Json(event): Json<SurfaceEvent>,
) -> ApiResult<ApiResponse> {
    state.control.surface_event(event).await?;
    Ok(Json(ApiResponse::ok("Event recorded")))
}

/// Handle POST /settings/open
pub async fn open_settings_handler(State(state): State<AppState>) -> ApiResult<ApiResponse> {
    if state.control.open_settings().await? {
        Ok(Json(ApiResponse::ok("Settings opened")))
    } else {
        warn!("Settings refused while locked");
        Ok(Json(ApiResponse::refused("Settings are unavailable")))
    }
}

/// Handle POST /settings/close
pub async fn close_settings_handler(State(state): State<AppState>) -> ApiResult<ApiResponse> {
    if state.control.close_settings().await? {
        Ok(Json(ApiResponse::ok("Settings closed")))
    } else {
        Ok(Json(ApiResponse::refused("Settings were not open")))
    }
}

/// Handle GET /notifications - server-sent events, one JSON notification each
pub async fn notifications_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let notifications = state.control.subscribe();

    let events = stream::unfold(notifications, |mut notifications| async move {
        loop {
            match notifications.recv().await {
                Ok(notification) => {
                    let event = Event::default().json_data(&notification);
                    return Some((event, notifications));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Notification stream lagged by {} messages", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /menu
pub async fn menu_handler(State(state): State<AppState>) -> Json<MenuModel> {
    Json(state.current_menu())
}

/// Handle GET /status - Return current lock and idle status
pub async fn status_handler(State(state): State<AppState>) -> ApiResult<StatusResponse> {
    let status = state.control.status().await?;

    Ok(Json(StatusResponse {
        status,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
