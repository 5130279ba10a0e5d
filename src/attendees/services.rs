use tracing::{info, warn};

use crate::{
    attendees::{repo::AttendeeRepo, repo_types::Attendee},
    auth::{repo::UserRepo, repo_types::User},
    db::{Store, StoreError},
    error::ApiError,
    events::services::{ensure_owner, load_event},
};

const DUPLICATE: &str = "Attendee already exist";

/// Adds `user_id` to the event. Checked in order: event exists, user exists,
/// pair not yet present, then the caller must own the event.
pub async fn add_attendee(
    store: &dyn Store,
    caller: &User,
    event_id: i64,
    user_id: i64,
) -> Result<Attendee, ApiError> {
    let event = load_event(store, event_id).await?;

    match store.find_user_by_id(user_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(ApiError::not_found("User not found")),
        Err(e) => return Err(ApiError::internal("Failed to retrieve user details", e)),
    }

    match store.find_attendee(event_id, user_id).await {
        Ok(None) => {}
        Ok(Some(_)) => {
            warn!(event_id, user_id, "attendee already present");
            return Err(ApiError::conflict(DUPLICATE));
        }
        Err(e) => return Err(ApiError::internal("Failed to check existing attendee", e)),
    }

    ensure_owner(caller, &event, "add an attendee")?;

    // the unique index catches a concurrent insert that passed the check above
    let attendee = store
        .insert_attendee(event_id, user_id)
        .await
        .map_err(|e| match e {
            StoreError::UniqueViolation => ApiError::conflict(DUPLICATE),
            e => ApiError::internal("Failed to add attendee", e),
        })?;
    info!(event_id, user_id, attendee_id = attendee.id, "attendee added");
    Ok(attendee)
}

pub async fn remove_attendee(
    store: &dyn Store,
    caller: &User,
    event_id: i64,
    user_id: i64,
) -> Result<(), ApiError> {
    let event = load_event(store, event_id).await?;
    ensure_owner(caller, &event, "delete an attendee")?;

    match store.delete_attendee(event_id, user_id).await {
        Ok(true) => {
            info!(event_id, user_id, "attendee removed");
            Ok(())
        }
        Ok(false) => Err(ApiError::not_found("Attendee not found")),
        Err(e) => Err(ApiError::internal("Failed to delete attendee", e)),
    }
}
