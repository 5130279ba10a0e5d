use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::Date;
use utoipa::ToSchema;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Event record in the database. `owner_id` never changes after insert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq, ToSchema)]
pub struct Event {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: String,
    #[serde(with = "iso_date")]
    #[schema(example = "2025-01-01")]
    pub date: Date,
    pub location: String,
}

/// Validated, owner-less event fields used for both insert and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventInput {
    pub name: String,
    pub description: String,
    pub date: Date,
    pub location: String,
}
