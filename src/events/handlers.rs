use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::EventRequest,
    repo::EventRepo,
    repo_types::Event,
    services::{create_event, delete_event, update_event},
};
use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, ErrorBody},
    extract::{AppJson, AppPath},
    state::AppState,
};

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/:id", get(get_event))
}

/// Every handler here takes [`AuthUser`], so none is reachable without a token.
pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/events", post(create))
        .route("/events/:id", put(update).delete(remove))
}

// --- handlers ---

#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "events",
    responses((status = 200, body = [Event]))
)]
#[instrument(skip(state))]
pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, ApiError> {
    let events = state
        .store
        .list_events()
        .await
        .map_err(|e| ApiError::internal("Failed to retrieve events", e))?;
    Ok(Json(events))
}

#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    tag = "events",
    params(("id" = i64, Path, description = "Event ID")),
    responses(
        (status = 200, body = Event),
        (status = 404, description = "Event not found", body = ErrorBody),
    )
)]
#[instrument(skip(state))]
pub async fn get_event(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Event>, ApiError> {
    match state.store.find_event(id).await {
        Ok(Some(event)) => Ok(Json(event)),
        Ok(None) => Err(ApiError::not_found("Event not found")),
        Err(e) => Err(ApiError::internal("Failed to retrieve event", e)),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "events",
    request_body = EventRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Event created, owned by the caller", body = Event),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
    )
)]
#[instrument(skip(state, user, body), fields(user_id = user.id))]
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(body): AppJson<EventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let input = body.validate()?;
    let event = create_event(state.store.as_ref(), &user, input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

#[utoipa::path(
    put,
    path = "/api/v1/events/{id}",
    tag = "events",
    params(("id" = i64, Path, description = "Event ID")),
    request_body = EventRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = Event),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Caller does not own the event", body = ErrorBody),
        (status = 404, description = "Event not found", body = ErrorBody),
    )
)]
#[instrument(skip(state, user, body), fields(user_id = user.id))]
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<i64>,
    AppJson(body): AppJson<EventRequest>,
) -> Result<Json<Event>, ApiError> {
    let event = update_event(state.store.as_ref(), &user, id, body).await?;
    Ok(Json(event))
}

#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}",
    tag = "events",
    params(("id" = i64, Path, description = "Event ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Caller does not own the event", body = ErrorBody),
        (status = 404, description = "Event not found", body = ErrorBody),
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, ApiError> {
    delete_event(state.store.as_ref(), &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
