use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, RegisterRequest},
        password::{hash_password, verify_password},
        repo::UserRepo,
        repo_types::{NewUser, User},
    },
    db::StoreError,
    error::{ApiError, ErrorBody},
    extract::{AppJson, AppPath},
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users/:id", get(get_user))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody),
    )
)]
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    let name = payload.name.trim().to_string();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::validation("Invalid email"));
    }
    if payload.password.chars().count() < 8 {
        return Err(ApiError::validation("Password must be at least 8 characters"));
    }
    if name.is_empty() {
        return Err(ApiError::validation("Name is required"));
    }

    match state.store.find_user_by_email(&payload.email).await {
        Ok(None) => {}
        Ok(Some(_)) => {
            warn!(email = %payload.email, "email already registered");
            return Err(ApiError::conflict("Email already registered"));
        }
        Err(e) => return Err(ApiError::internal("Could not register user", e)),
    }

    let password_hash =
        hash_password(&payload.password).map_err(|e| ApiError::internal("Something went wrong", e))?;

    let user = state
        .store
        .insert_user(NewUser {
            name,
            email: payload.email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            StoreError::UniqueViolation => ApiError::conflict("Email already registered"),
            e => ApiError::internal("Could not register user", e),
        })?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed session token", body = LoginResponse),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 401, description = "Invalid email or password", body = ErrorBody),
    )
)]
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        return Err(ApiError::validation("Invalid email"));
    }
    if payload.password.chars().count() < 8 {
        return Err(ApiError::validation("Password must be at least 8 characters"));
    }

    let user = match state.store.find_user_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::unauthenticated(INVALID_CREDENTIALS));
        }
        Err(e) => return Err(ApiError::internal("Something went wrong", e)),
    };

    let ok = verify_password(&payload.password, &user.password_hash)
        .map_err(|e| ApiError::internal("Something went wrong", e))?;
    if !ok {
        warn!(user_id = user.id, "login invalid password");
        return Err(ApiError::unauthenticated(INVALID_CREDENTIALS));
    }

    let token = state
        .tokens
        .issue(user.id, OffsetDateTime::now_utc())
        .map_err(|e| ApiError::internal("Something went wrong", e))?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(LoginResponse { token }))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, body = User),
        (status = 404, description = "User not found", body = ErrorBody),
    )
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<User>, ApiError> {
    match state.store.find_user_by_id(id).await {
        Ok(Some(user)) => Ok(Json(user)),
        Ok(None) => Err(ApiError::not_found("User not found")),
        Err(e) => Err(ApiError::internal("Failed to retrieve user details", e)),
    }
}
