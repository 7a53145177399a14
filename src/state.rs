use std::sync::Arc;

use sqlx::PgPool;

use crate::database::{
    ContactStore, MemoryContactStore, MemoryUserStore, PgContactStore, PgUserStore, UserStore,
};

/// Shared handler state. Both stores hide behind trait objects so the same
/// router runs against Postgres in production and the in-memory backend in
/// tests.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub contacts: Arc<dyn ContactStore>,
}

impl AppState {
    pub fn new(users: Arc<dyn UserStore>, contacts: Arc<dyn ContactStore>) -> Self {
        Self { users, contacts }
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryContactStore::new()),
        )
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self::new(
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgContactStore::new(pool)),
        )
    }
}
