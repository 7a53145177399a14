pub mod api;
pub mod app;
pub mod auth;
pub mod birthdays;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
