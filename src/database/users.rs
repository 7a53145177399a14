use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{NewUser, User};

use super::manager::{classify_unique, DatabaseError};

const DUPLICATE_ACCOUNT: &str = "Account already exists";

const USER_COLUMNS: &str =
    "id, username, email, password_hash, avatar, refresh_token, created_at";

/// Account persistence. Email lookups are case-insensitive so registration
/// and login agree on which address is taken.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, draft: NewUser) -> Result<User, DatabaseError>;
    async fn get(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
    /// Stores the active refresh token, or clears it when `token` is `None`.
    async fn set_refresh_token(
        &self,
        id: Uuid,
        token: Option<String>,
    ) -> Result<(), DatabaseError>;
    async fn ping(&self) -> Result<(), DatabaseError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, draft: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (id, username, email, password_hash, avatar) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&draft.username)
            .bind(&draft.email)
            .bind(&draft.password_hash)
            .bind(&draft.avatar)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify_unique(e, DUPLICATE_ACCOUNT))
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn set_refresh_token(
        &self,
        id: Uuid,
        token: Option<String>,
    ) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE users SET refresh_token = $2 WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, draft: NewUser) -> Result<User, DatabaseError> {
        let mut users = self.users.write().await;

        let taken = users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&draft.email));
        if taken {
            return Err(DatabaseError::Duplicate(DUPLICATE_ACCOUNT.to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: draft.username,
            email: draft.email,
            password_hash: draft.password_hash,
            avatar: draft.avatar,
            refresh_token: None,
            created_at: chrono::Utc::now(),
        };

        users.push(user.clone());
        Ok(user)
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let user = self.users.read().await.iter().find(|u| u.id == id).cloned();
        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned();
        Ok(user)
    }

    async fn set_refresh_token(
        &self,
        id: Uuid,
        token: Option<String>,
    ) -> Result<(), DatabaseError> {
        let mut users = self.users.write().await;
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.refresh_token = token;
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
