use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Join row between an event and a user; unique per (event_id, user_id).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
}
