use async_trait::async_trait;

use crate::{
    attendees::repo_types::Attendee,
    auth::repo_types::User,
    db::{bounded, PgStore, StoreError},
    events::repo_types::Event,
};

#[async_trait]
pub trait AttendeeRepo: Send + Sync {
    async fn find_attendee(&self, event_id: i64, user_id: i64) -> Result<Option<Attendee>, StoreError>;

    /// A second row for the same pair yields [`StoreError::UniqueViolation`].
    async fn insert_attendee(&self, event_id: i64, user_id: i64) -> Result<Attendee, StoreError>;

    /// Returns whether a row was deleted.
    async fn delete_attendee(&self, event_id: i64, user_id: i64) -> Result<bool, StoreError>;

    async fn list_attendees_of_event(&self, event_id: i64) -> Result<Vec<User>, StoreError>;

    async fn list_events_of_attendee(&self, user_id: i64) -> Result<Vec<Event>, StoreError>;
}

#[async_trait]
impl AttendeeRepo for PgStore {
    async fn find_attendee(&self, event_id: i64, user_id: i64) -> Result<Option<Attendee>, StoreError> {
        bounded(
            self.timeout,
            "attendees.find",
            sqlx::query_as::<_, Attendee>(
                r#"
                SELECT id, event_id, user_id
                FROM attendees
                WHERE event_id = $1 AND user_id = $2
                "#,
            )
            .bind(event_id)
            .bind(user_id)
            .fetch_optional(&self.pool),
        )
        .await
    }

    async fn insert_attendee(&self, event_id: i64, user_id: i64) -> Result<Attendee, StoreError> {
        bounded(
            self.timeout,
            "attendees.insert",
            sqlx::query_as::<_, Attendee>(
                r#"
                INSERT INTO attendees (event_id, user_id)
                VALUES ($1, $2)
                RETURNING id, event_id, user_id
                "#,
            )
            .bind(event_id)
            .bind(user_id)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn delete_attendee(&self, event_id: i64, user_id: i64) -> Result<bool, StoreError> {
        let result = bounded(
            self.timeout,
            "attendees.delete",
            sqlx::query("DELETE FROM attendees WHERE event_id = $1 AND user_id = $2")
                .bind(event_id)
                .bind(user_id)
                .execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_attendees_of_event(&self, event_id: i64) -> Result<Vec<User>, StoreError> {
        bounded(
            self.timeout,
            "attendees.list_by_event",
            sqlx::query_as::<_, User>(
                r#"
                SELECT u.id, u.name, u.email, u.password_hash
                  FROM users u
                  JOIN attendees a ON a.user_id = u.id
                 WHERE a.event_id = $1
                 ORDER BY a.id
                "#,
            )
            .bind(event_id)
            .fetch_all(&self.pool),
        )
        .await
    }

    async fn list_events_of_attendee(&self, user_id: i64) -> Result<Vec<Event>, StoreError> {
        bounded(
            self.timeout,
            "attendees.list_by_user",
            sqlx::query_as::<_, Event>(
                r#"
                SELECT e.id, e.owner_id, e.name, e.description, e.date, e.location
                  FROM events e
                  JOIN attendees a ON a.event_id = e.id
                 WHERE a.user_id = $1
                 ORDER BY a.id
                "#,
            )
            .bind(user_id)
            .fetch_all(&self.pool),
        )
        .await
    }
}
