use async_trait::async_trait;

use crate::{
    db::{bounded, PgStore, StoreError},
    events::repo_types::{Event, EventInput},
};

#[async_trait]
pub trait EventRepo: Send + Sync {
    async fn list_events(&self) -> Result<Vec<Event>, StoreError>;

    async fn find_event(&self, id: i64) -> Result<Option<Event>, StoreError>;

    async fn insert_event(&self, owner_id: i64, input: EventInput) -> Result<Event, StoreError>;

    /// Overwrites the mutable fields; `None` if the event vanished meanwhile.
    async fn update_event(&self, id: i64, input: EventInput) -> Result<Option<Event>, StoreError>;

    /// Returns whether a row was deleted.
    async fn delete_event(&self, id: i64) -> Result<bool, StoreError>;
}

#[async_trait]
impl EventRepo for PgStore {
    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        bounded(
            self.timeout,
            "events.list",
            sqlx::query_as::<_, Event>(
                r#"
                SELECT id, owner_id, name, description, date, location
                FROM events
                ORDER BY id
                "#,
            )
            .fetch_all(&self.pool),
        )
        .await
    }

    async fn find_event(&self, id: i64) -> Result<Option<Event>, StoreError> {
        bounded(
            self.timeout,
            "events.find",
            sqlx::query_as::<_, Event>(
                r#"
                SELECT id, owner_id, name, description, date, location
                FROM events
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await
    }

    async fn insert_event(&self, owner_id: i64, input: EventInput) -> Result<Event, StoreError> {
        bounded(
            self.timeout,
            "events.insert",
            sqlx::query_as::<_, Event>(
                r#"
                INSERT INTO events (owner_id, name, description, date, location)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, owner_id, name, description, date, location
                "#,
            )
            .bind(owner_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.date)
            .bind(&input.location)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn update_event(&self, id: i64, input: EventInput) -> Result<Option<Event>, StoreError> {
        bounded(
            self.timeout,
            "events.update",
            sqlx::query_as::<_, Event>(
                r#"
                UPDATE events
                   SET name = $1, description = $2, date = $3, location = $4
                 WHERE id = $5
                RETURNING id, owner_id, name, description, date, location
                "#,
            )
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.date)
            .bind(&input.location)
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await
    }

    async fn delete_event(&self, id: i64) -> Result<bool, StoreError> {
        let result = bounded(
            self.timeout,
            "events.delete",
            sqlx::query("DELETE FROM events WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
