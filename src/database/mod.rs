pub mod contacts;
pub mod manager;
pub mod users;

pub use contacts::{ContactStore, MemoryContactStore, PgContactStore};
pub use manager::DatabaseError;
pub use users::{MemoryUserStore, PgUserStore, UserStore};

/// Offset/limit window for list and search scans. Values are validated at
/// the handler boundary; stores apply them as-is.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}
