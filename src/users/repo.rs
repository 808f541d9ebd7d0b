use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::error::StoreError;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub display_name: String,
    pub email: String,
    pub password_hash: String, // Argon2 PHC string, never rendered
    pub image: Option<String>,
}

/// The parts of a user that other users may see.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub display_name: String,
    pub email: String,
    pub image: Option<String>,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            display_name: u.display_name,
            email: u.email,
            image: u.image,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub display_name: String,
    pub email: String,
    pub password_hash: String,
    pub image: Option<String>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
    /// Exact, case-sensitive email match.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn exists_email(&self, email: &str) -> Result<bool, StoreError>;
    async fn list(&self) -> Result<Vec<UserProfile>, StoreError>;
    /// Fails with `StoreError::DuplicateEmail` when the email is taken.
    async fn create(&self, new: NewUser) -> Result<User, StoreError>;
    /// Removes the user and, through the foreign key, their posts.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, display_name, email, password_hash, image
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, display_name, email, password_hash, image
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn exists_email(&self, email: &str) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar(r#"SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)"#)
                .bind(email)
                .fetch_one(&self.db)
                .await?;
        Ok(exists)
    }

    async fn list(&self) -> Result<Vec<UserProfile>, StoreError> {
        let rows = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, display_name, email, image
            FROM users
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (display_name, email, password_hash, image)
            VALUES ($1, $2, $3, $4)
            RETURNING id, display_name, email, password_hash, image
            "#,
        )
        .bind(&new.display_name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.image)
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::DuplicateEmail)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
