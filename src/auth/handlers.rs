use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;
use tracing::{instrument, warn};

use crate::{
    auth::dto::{AuthResponse, LoginRequest, RegisterRequest, VerifyResponse},
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 6;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/verify", get(verify))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn bad_request(message: &'static str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), Response> {
    if !is_valid_email(&payload.email) {
        warn!("invalid email");
        return Err(bad_request("Invalid email"));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(bad_request("Password must be at least 6 characters"));
    }
    if payload.name.trim().is_empty() {
        warn!("missing name");
        return Err(bad_request("Name is required"));
    }

    let session = state
        .authority
        .register(&payload.email, &payload.password, &payload.name)
        .await
        .map_err(IntoResponse::into_response)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token: session.token,
            user: session.user,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, Response> {
    if !is_valid_email(&payload.email) {
        warn!("invalid email");
        return Err(bad_request("Invalid email"));
    }
    if payload.password.is_empty() {
        return Err(bad_request("Password is required"));
    }

    let session = state
        .authority
        .login(&payload.email, &payload.password)
        .await
        .map_err(IntoResponse::into_response)?;

    Ok(Json(AuthResponse {
        token: session.token,
        user: session.user,
    }))
}

#[instrument(skip(state, headers))]
pub async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<VerifyResponse>, Response> {
    let raw = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let claims = state
        .authority
        .verify_token(raw)
        .map_err(IntoResponse::into_response)?;

    Ok(Json(VerifyResponse {
        valid: true,
        user_id: claims.user_id,
        email: claims.email,
    }))
}
