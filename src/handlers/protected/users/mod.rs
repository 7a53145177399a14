// Account endpoints under /api/users.

pub mod me; // GET /api/users/me

pub use me::me_get;
