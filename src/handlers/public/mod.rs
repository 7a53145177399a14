// Endpoints reachable without a JWT.

pub mod auth;
