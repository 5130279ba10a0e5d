use serde::Deserialize;
use time::{macros::format_description, Date};
use utoipa::ToSchema;

use crate::{error::ApiError, events::repo_types::EventInput};

/// Body of `POST /events` and `PUT /events/{id}`. An `owner_id` sent by the
/// client is ignored.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EventRequest {
    pub name: String,
    pub description: String,
    #[schema(example = "2025-01-01")]
    pub date: String,
    pub location: String,
}

impl EventRequest {
    pub fn validate(self) -> Result<EventInput, ApiError> {
        let name = required("name", &self.name)?;
        let description = required("description", &self.description)?;
        let location = required("location", &self.location)?;
        let date = Date::parse(self.date.trim(), format_description!("[year]-[month]-[day]"))
            .map_err(|_| ApiError::validation("date must be a valid YYYY-MM-DD date"))?;

        Ok(EventInput {
            name,
            description,
            date,
            location,
        })
    }
}

fn required(field: &str, value: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}
