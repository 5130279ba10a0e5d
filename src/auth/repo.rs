use async_trait::async_trait;

use crate::{
    auth::repo_types::{NewUser, User},
    db::{bounded, PgStore, StoreError},
};

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert a user; a taken email yields [`StoreError::UniqueViolation`].
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

#[async_trait]
impl UserRepo for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        bounded(
            self.timeout,
            "users.insert",
            sqlx::query_as::<_, User>(
                r#"
                INSERT INTO users (name, email, password_hash)
                VALUES ($1, $2, $3)
                RETURNING id, name, email, password_hash
                "#,
            )
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        bounded(
            self.timeout,
            "users.find_by_id",
            sqlx::query_as::<_, User>(
                r#"SELECT id, name, email, password_hash FROM users WHERE id = $1"#,
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        bounded(
            self.timeout,
            "users.find_by_email",
            sqlx::query_as::<_, User>(
                r#"
                SELECT id, name, email, password_hash
                FROM users
                WHERE email = $1
                "#,
            )
            .bind(email)
            .fetch_optional(&self.pool),
        )
        .await
    }
}
