use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    repo::AttendeeRepo,
    repo_types::Attendee,
    services::{add_attendee, remove_attendee},
};
use crate::{
    auth::{extractors::AuthUser, repo_types::User},
    error::{ApiError, ErrorBody},
    events::repo_types::Event,
    extract::AppPath,
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/events/:id/attendees", get(attendees_of_event))
        .route("/attendees/:id/events", get(events_of_attendee))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route(
        "/events/:id/attendees/:user_id",
        post(add).delete(remove),
    )
}

#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/attendees",
    tag = "attendees",
    params(("id" = i64, Path, description = "Event ID")),
    responses((status = 200, description = "Users attending the event", body = [User]))
)]
#[instrument(skip(state))]
pub async fn attendees_of_event(
    State(state): State<AppState>,
    AppPath(event_id): AppPath<i64>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = state
        .store
        .list_attendees_of_event(event_id)
        .await
        .map_err(|e| ApiError::internal("Failed to retrieve attendees for event", e))?;
    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/api/v1/attendees/{id}/events",
    tag = "attendees",
    params(("id" = i64, Path, description = "User ID")),
    responses((status = 200, description = "Events the user attends", body = [Event]))
)]
#[instrument(skip(state))]
pub async fn events_of_attendee(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<i64>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let events = state
        .store
        .list_events_of_attendee(user_id)
        .await
        .map_err(|e| ApiError::internal("Failed to retrieve events for attendee", e))?;
    Ok(Json(events))
}

#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/attendees/{user_id}",
    tag = "attendees",
    params(
        ("id" = i64, Path, description = "Event ID"),
        ("user_id" = i64, Path, description = "User to add"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = Attendee),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Caller does not own the event", body = ErrorBody),
        (status = 404, description = "Event or user not found", body = ErrorBody),
        (status = 409, description = "Attendee already exist", body = ErrorBody),
    )
)]
#[instrument(skip(state, caller), fields(caller_id = caller.id))]
pub async fn add(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppPath((event_id, user_id)): AppPath<(i64, i64)>,
) -> Result<(StatusCode, Json<Attendee>), ApiError> {
    let attendee = add_attendee(state.store.as_ref(), &caller, event_id, user_id).await?;
    Ok((StatusCode::CREATED, Json(attendee)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}/attendees/{user_id}",
    tag = "attendees",
    params(
        ("id" = i64, Path, description = "Event ID"),
        ("user_id" = i64, Path, description = "User to remove"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Attendee removed"),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Caller does not own the event", body = ErrorBody),
        (status = 404, description = "Event or attendee not found", body = ErrorBody),
    )
)]
#[instrument(skip(state, caller), fields(caller_id = caller.id))]
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppPath((event_id, user_id)): AppPath<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    remove_attendee(state.store.as_ref(), &caller, event_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
