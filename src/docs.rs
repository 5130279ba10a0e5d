//! OpenAPI document for the HTTP surface, served as JSON and through Swagger UI.

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::{
    attendees::{self, repo_types::Attendee},
    auth::{
        self,
        dto::{LoginRequest, LoginResponse, RegisterRequest},
        repo_types::User,
    },
    error::ErrorBody,
    events::{self, dto::EventRequest, repo_types::Event},
};

pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(title = "eventhub", description = "Events, users and attendees"),
    paths(
        auth::handlers::register,
        auth::handlers::login,
        auth::handlers::get_user,
        events::handlers::list_events,
        events::handlers::get_event,
        events::handlers::create,
        events::handlers::update,
        events::handlers::remove,
        attendees::handlers::attendees_of_event,
        attendees::handlers::events_of_attendee,
        attendees::handlers::add,
        attendees::handlers::remove,
    ),
    components(schemas(
        User,
        Event,
        Attendee,
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        EventRequest,
        ErrorBody,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "User lookup"),
        (name = "events", description = "Event CRUD"),
        (name = "attendees", description = "Event attendance"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
