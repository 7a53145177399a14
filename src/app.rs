use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config;
use crate::middleware::require_auth;
use crate::state::AppState;

/// Assemble the full router over the given stores: public routes at the
/// root and under /auth, the guarded tier under /api.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected API
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(TraceLayer::new_for_http());

    if config::config().security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use axum::routing::post;
    use crate::handlers::public::auth;

    Router::new()
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
        .route("/auth/refresh", post(auth::refresh_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    contact_routes()
        .merge(user_routes())
        .route_layer(from_fn_with_state(state, require_auth))
}

fn contact_routes() -> Router<AppState> {
    use crate::handlers::protected::contacts;

    Router::new()
        // Collection operations
        .route(
            "/api/contacts",
            get(contacts::contacts_get).post(contacts::contacts_post),
        )
        // Derived views
        .route("/api/contacts/search", get(contacts::search_get))
        .route(
            "/api/contacts/upcoming-birthdays",
            get(contacts::upcoming_birthdays_get),
        )
        // Record operations
        .route(
            "/api/contacts/:id",
            get(contacts::contact_get)
                .put(contacts::contact_update)
                .patch(contacts::contact_update)
                .delete(contacts::contact_delete),
        )
}

fn user_routes() -> Router<AppState> {
    use crate::handlers::protected::users;

    Router::new().route("/api/users/me", get(users::me_get))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Contacts API",
            "version": version,
            "description": "Contact management REST API with per-user scoping, search and birthday reminders",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/auth/register, /auth/login, /auth/refresh (public - token acquisition)",
                "contacts": "/api/contacts[/:id] (protected)",
                "search": "/api/contacts/search?query= (protected)",
                "birthdays": "/api/contacts/upcoming-birthdays?days= (protected)",
                "users": "/api/users/me (protected)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.contacts.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
