// Endpoints behind the bearer-token guard, all under /api.

pub mod contacts;
pub mod users;
