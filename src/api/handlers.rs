use crate::api::state::AppState;
use crate::auth::Claims;
use crate::core::RunOutcome;
use crate::utils::error::AppError;
use axum::{
    extract::{FromRequestParts, Path, State},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Error body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    fn new(code: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = match self.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "BAD_REQUEST" => StatusCode::BAD_REQUEST,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "CONFLICT" => StatusCode::CONFLICT,
            "SNAPSHOT_PENDING" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<AppError> for ErrorResponse {
    fn from(e: AppError) -> Self {
        match e {
            AppError::SnapshotMissing { .. } => {
                ErrorResponse::new("SNAPSHOT_PENDING", "Data temporarily unavailable")
            }
            AppError::Conflict { message } => ErrorResponse::new("CONFLICT", message),
            other => {
                tracing::error!("Request failed: {}", other);
                ErrorResponse::new("INTERNAL", "Internal server error")
            }
        }
    }
}

/// The authenticated caller, extracted from the `Authorization: Bearer`
/// header. A missing header is 401; a bad or expired token is 403.
pub struct AuthUser(pub Claims);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ErrorResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| ErrorResponse::new("UNAUTHORIZED", "Missing bearer token"))?;

        let claims = state
            .signer
            .verify(token)
            .map_err(|e| ErrorResponse::new("FORBIDDEN", e.to_string()))?;

        Ok(AuthUser(claims))
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub phone_number: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_name: String,
}

pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let rejected = || ErrorResponse::new("UNAUTHORIZED", "Wrong name or phone number");

    let user = state
        .users
        .find_by_name(&request.name)
        .await
        .map_err(ErrorResponse::from)?
        .ok_or_else(rejected)?;

    if !crate::auth::verify_phone(&request.phone_number, &user.phone_hash) {
        return Err(rejected());
    }

    let token = state
        .signer
        .issue(user.id, &user.name)
        .map_err(ErrorResponse::from)?;

    Ok(Json(LoginResponse {
        token,
        user_name: user.name,
    }))
}

async fn serve_snapshot(state: &AppState, name: &str) -> Result<Response, ErrorResponse> {
    let payload = state.snapshots.get(name).await.map_err(ErrorResponse::from)?;
    Ok(([(header::CONTENT_TYPE, "application/json")], payload).into_response())
}

pub async fn detailed_debts_handler(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ErrorResponse> {
    serve_snapshot(&state, crate::storage::DETAILED_SNAPSHOT).await
}

pub async fn summary_debts_handler(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ErrorResponse> {
    serve_snapshot(&state, crate::storage::SUMMARY_SNAPSHOT).await
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub message: String,
}

/// Manual pipeline trigger. The refresh runs in the background; the in-flight
/// guard inside the runner resolves the race with a scheduled run.
pub async fn refresh_handler(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ErrorResponse> {
    if state.runner.is_running() {
        return Err(ErrorResponse::new("CONFLICT", "A snapshot run is already in flight"));
    }

    let runner = state.runner.clone();
    tokio::spawn(async move {
        match runner.try_run().await {
            Ok(RunOutcome::Completed(_)) | Ok(RunOutcome::AlreadyRunning) => {}
            Err(e) => tracing::error!("Manual refresh failed: {}", e),
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(RefreshResponse {
            message: "Snapshot refresh started".to_string(),
        }),
    ))
}

pub async fn list_notes_handler(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<String>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let notes = state
        .notes
        .list_by_customer(&customer_id)
        .await
        .map_err(ErrorResponse::from)?;
    Ok(Json(notes))
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub note_text: String,
}

pub async fn create_note_handler(
    AuthUser(claims): AuthUser,
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateNoteRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    if request.customer_id.trim().is_empty() || request.note_text.trim().is_empty() {
        return Err(ErrorResponse::new(
            "BAD_REQUEST",
            "customer_id and note_text are required",
        ));
    }

    let note = state
        .notes
        .create(&request.customer_id, &request.note_text, &claims.name)
        .await
        .map_err(ErrorResponse::from)?;

    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn list_users_handler(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let users = state.users.list().await.map_err(ErrorResponse::from)?;
    Ok(Json(users))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
}

pub async fn create_user_handler(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    if request.name.trim().is_empty() || request.phone_number.trim().is_empty() {
        return Err(ErrorResponse::new(
            "BAD_REQUEST",
            "name and phone_number are required",
        ));
    }

    let phone_hash = crate::auth::hash_phone(&request.phone_number).map_err(ErrorResponse::from)?;
    let created = state
        .users
        .create(&request.name, &phone_hash)
        .await
        .map_err(ErrorResponse::from)?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub message: String,
}

pub async fn delete_user_handler(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let target = state
        .users
        .find_by_id(id)
        .await
        .map_err(ErrorResponse::from)?
        .ok_or_else(|| ErrorResponse::new("NOT_FOUND", "User not found"))?;

    if target.name == state.admin_name {
        return Err(ErrorResponse::new(
            "FORBIDDEN",
            format!("The administrator account '{}' cannot be deleted", state.admin_name),
        ));
    }

    state.users.delete(id).await.map_err(ErrorResponse::from)?;

    Ok(Json(DeleteUserResponse {
        message: "User deleted".to_string(),
    }))
}
