//! In-memory [`Store`] and request helpers for handler tests.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::Value;
use time::{macros::date, OffsetDateTime};
use tower::ServiceExt;

use crate::{
    app::build_app,
    attendees::{repo::AttendeeRepo, repo_types::Attendee},
    auth::{
        repo::UserRepo,
        repo_types::{NewUser, User},
    },
    config::AppConfig,
    db::{Store, StoreError},
    events::{
        repo::EventRepo,
        repo_types::{Event, EventInput},
    },
    state::AppState,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    events: Vec<Event>,
    attendees: Vec<Attendee>,
    next_user: i64,
    next_event: i64,
    next_attendee: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing: AtomicBool,
    skip_attendee_lookup: AtomicBool,
}

impl MemoryStore {
    /// Makes every subsequent call fail as if the database timed out.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Makes `find_attendee` report nothing, as a racing request would see it.
    pub fn skip_attendee_lookup(&self, skip: bool) {
        self.skip_attendee_lookup.store(skip, Ordering::SeqCst);
    }

    pub fn seed_user(&self, name: &str, email: &str) -> User {
        let mut t = self.tables.lock().unwrap();
        t.next_user += 1;
        let user = User {
            id: t.next_user,
            name: name.into(),
            email: email.into(),
            password_hash: "$argon2id$seeded".into(),
        };
        t.users.push(user.clone());
        user
    }

    pub fn seed_event(&self, owner_id: i64, name: &str) -> Event {
        let mut t = self.tables.lock().unwrap();
        t.next_event += 1;
        let event = Event {
            id: t.next_event,
            owner_id,
            name: name.into(),
            description: "A talk.".into(),
            date: date!(2025 - 01 - 01),
            location: "Hall".into(),
        };
        t.events.push(event.clone());
        event
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        let t = self.tables.lock().unwrap();
        t.users.iter().find(|u| u.email == email).cloned()
    }

    pub fn events(&self) -> Vec<Event> {
        self.tables.lock().unwrap().events.clone()
    }

    pub fn attendee_rows(&self, event_id: i64, user_id: i64) -> usize {
        let t = self.tables.lock().unwrap();
        t.attendees
            .iter()
            .filter(|a| a.event_id == event_id && a.user_id == user_id)
            .count()
    }

    fn check(&self, op: &'static str) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Timeout {
                op,
                after: Duration::from_secs(3),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        self.check("users.insert")?;
        let mut t = self.tables.lock().unwrap();
        if t.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation);
        }
        t.next_user += 1;
        let user = User {
            id: t.next_user,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        self.check("users.find_by_id")?;
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.check("users.find_by_email")?;
        Ok(self.user_by_email(email))
    }
}

#[async_trait]
impl EventRepo for MemoryStore {
    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        self.check("events.list")?;
        Ok(self.events())
    }

    async fn find_event(&self, id: i64) -> Result<Option<Event>, StoreError> {
        self.check("events.find")?;
        let t = self.tables.lock().unwrap();
        Ok(t.events.iter().find(|e| e.id == id).cloned())
    }

    async fn insert_event(&self, owner_id: i64, input: EventInput) -> Result<Event, StoreError> {
        self.check("events.insert")?;
        let mut t = self.tables.lock().unwrap();
        t.next_event += 1;
        let event = Event {
            id: t.next_event,
            owner_id,
            name: input.name,
            description: input.description,
            date: input.date,
            location: input.location,
        };
        t.events.push(event.clone());
        Ok(event)
    }

    async fn update_event(&self, id: i64, input: EventInput) -> Result<Option<Event>, StoreError> {
        self.check("events.update")?;
        let mut t = self.tables.lock().unwrap();
        Ok(t.events.iter_mut().find(|e| e.id == id).map(|e| {
            e.name = input.name;
            e.description = input.description;
            e.date = input.date;
            e.location = input.location;
            e.clone()
        }))
    }

    async fn delete_event(&self, id: i64) -> Result<bool, StoreError> {
        self.check("events.delete")?;
        let mut t = self.tables.lock().unwrap();
        let before = t.events.len();
        t.events.retain(|e| e.id != id);
        let deleted = t.events.len() != before;
        if deleted {
            t.attendees.retain(|a| a.event_id != id);
        }
        Ok(deleted)
    }
}

#[async_trait]
impl AttendeeRepo for MemoryStore {
    async fn find_attendee(&self, event_id: i64, user_id: i64) -> Result<Option<Attendee>, StoreError> {
        self.check("attendees.find")?;
        if self.skip_attendee_lookup.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let t = self.tables.lock().unwrap();
        Ok(t.attendees
            .iter()
            .find(|a| a.event_id == event_id && a.user_id == user_id)
            .cloned())
    }

    async fn insert_attendee(&self, event_id: i64, user_id: i64) -> Result<Attendee, StoreError> {
        self.check("attendees.insert")?;
        let mut t = self.tables.lock().unwrap();
        if t.attendees
            .iter()
            .any(|a| a.event_id == event_id && a.user_id == user_id)
        {
            return Err(StoreError::UniqueViolation);
        }
        t.next_attendee += 1;
        let attendee = Attendee {
            id: t.next_attendee,
            event_id,
            user_id,
        };
        t.attendees.push(attendee.clone());
        Ok(attendee)
    }

    async fn delete_attendee(&self, event_id: i64, user_id: i64) -> Result<bool, StoreError> {
        self.check("attendees.delete")?;
        let mut t = self.tables.lock().unwrap();
        let before = t.attendees.len();
        t.attendees
            .retain(|a| !(a.event_id == event_id && a.user_id == user_id));
        Ok(t.attendees.len() != before)
    }

    async fn list_attendees_of_event(&self, event_id: i64) -> Result<Vec<User>, StoreError> {
        self.check("attendees.list_by_event")?;
        let t = self.tables.lock().unwrap();
        Ok(t.attendees
            .iter()
            .filter(|a| a.event_id == event_id)
            .filter_map(|a| t.users.iter().find(|u| u.id == a.user_id).cloned())
            .collect())
    }

    async fn list_events_of_attendee(&self, user_id: i64) -> Result<Vec<Event>, StoreError> {
        self.check("attendees.list_by_user")?;
        let t = self.tables.lock().unwrap();
        Ok(t.attendees
            .iter()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| t.events.iter().find(|e| e.id == a.event_id).cloned())
            .collect())
    }
}

pub fn test_state() -> (AppState, Arc<MemoryStore>) {
    let config = AppConfig::from_lookup(|key| match key {
        "JWT_SECRET" => Some("test-secret".into()),
        _ => None,
    })
    .expect("test config");
    let store = Arc::new(MemoryStore::default());
    let state = AppState::from_parts(store.clone() as Arc<dyn Store>, Arc::new(config));
    (state, store)
}

/// A ready-to-send `Authorization` header value for `user_id`.
pub fn bearer_for(state: &AppState, user_id: i64) -> String {
    let token = state
        .tokens
        .issue(user_id, OffsetDateTime::now_utc())
        .expect("sign token");
    format!("Bearer {token}")
}

pub fn request(method: &str, uri: &str, auth: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Runs one request through the full router. An empty body comes back as
/// `Null` and a non-JSON body as a string.
pub async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
    let response = build_app(state.clone()).oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}
