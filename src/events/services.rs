//! Event mutations. Each one loads the target, checks that the caller owns it
//! and only then writes.

use tracing::{info, warn};

use crate::{
    auth::repo_types::User,
    db::Store,
    error::ApiError,
    events::{
        dto::EventRequest,
        repo::EventRepo,
        repo_types::{Event, EventInput},
    },
};

/// Loads an event for a mutation, mapping absence to 404.
pub(crate) async fn load_event(store: &dyn Store, id: i64) -> Result<Event, ApiError> {
    match store.find_event(id).await {
        Ok(Some(event)) => Ok(event),
        Ok(None) => Err(ApiError::not_found("Event not found")),
        Err(e) => Err(ApiError::internal("Failed to retrieve event", e)),
    }
}

/// 403 unless `user` owns `event`. `action` completes "You are not authorized to ...".
pub(crate) fn ensure_owner(user: &User, event: &Event, action: &str) -> Result<(), ApiError> {
    if user.id != event.owner_id {
        warn!(
            user_id = user.id,
            event_id = event.id,
            owner_id = event.owner_id,
            action,
            "ownership check failed"
        );
        return Err(ApiError::forbidden(format!("You are not authorized to {action}")));
    }
    Ok(())
}

pub async fn create_event(store: &dyn Store, owner: &User, input: EventInput) -> Result<Event, ApiError> {
    let event = store
        .insert_event(owner.id, input)
        .await
        .map_err(|e| ApiError::internal("Failed to create event", e))?;
    info!(event_id = event.id, owner_id = owner.id, "event created");
    Ok(event)
}

/// Replaces the event's fields. The body is only validated once the event is
/// known to exist and to belong to `user`.
pub async fn update_event(
    store: &dyn Store,
    user: &User,
    id: i64,
    body: EventRequest,
) -> Result<Event, ApiError> {
    let existing = load_event(store, id).await?;
    ensure_owner(user, &existing, "update this event")?;
    let input = body.validate()?;

    match store.update_event(id, input).await {
        Ok(Some(event)) => {
            info!(event_id = id, "event updated");
            Ok(event)
        }
        Ok(None) => Err(ApiError::not_found("Event not found")),
        Err(e) => Err(ApiError::internal("Failed to update event", e)),
    }
}

pub async fn delete_event(store: &dyn Store, user: &User, id: i64) -> Result<(), ApiError> {
    let existing = load_event(store, id).await?;
    ensure_owner(user, &existing, "delete this event")?;

    match store.delete_event(id).await {
        Ok(true) => {
            info!(event_id = id, "event deleted");
            Ok(())
        }
        Ok(false) => Err(ApiError::not_found("Event not found")),
        Err(e) => Err(ApiError::internal("Failed to delete event", e)),
    }
}
