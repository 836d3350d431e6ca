// handlers/public/root.rs - API index, health and route listing

use axum::{http::StatusCode, response::Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::config::config;
use crate::database::DatabaseManager;

const AUTH_ROUTES: &[&str] = &[
    "POST /api/auth/register",
    "POST /api/auth/login",
    "POST /api/auth/refresh",
    "GET /api/auth/github",
    "GET /api/auth/github/callback",
    "GET /api/auth/me",
];

const PROJECT_ROUTES: &[&str] = &[
    "GET /api/projects",
    "GET /api/projects/my-projects",
    "GET /api/projects/:id",
    "GET /api/projects/:id/readme",
    "GET /api/projects/:id/contributors",
    "GET /api/projects/:id/languages",
    "POST /api/projects",
    "PUT /api/projects/:id",
    "DELETE /api/projects/:id",
    "POST /api/projects/:id/like",
    "POST /api/projects/:id/comments",
    "POST /api/projects/:id/refresh-github",
    "PUT /api/projects/:id/featured",
];

const USER_ROUTES: &[&str] = &[
    "GET /api/users",
    "GET /api/users/profile",
    "GET /api/users/profile/:id",
    "PUT /api/users/profile",
    "POST /api/users/follow/:id",
    "POST /api/users/unfollow/:id",
];

/// GET / - API info and endpoint map
pub async fn root() -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": "Welcome to Collaborate API",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now(),
        "endpoints": {
            "health": "/api/health",
            "routes": "/api/debug/routes",
            "auth": "/api/auth/*",
            "projects": "/api/projects/*",
            "users": "/api/users/*"
        },
        "documentation": "Visit /api/debug/routes for detailed endpoint information"
    }))
}

/// GET /api/health - Liveness plus database reachability
pub async fn health() -> (StatusCode, Json<Value>) {
    let environment = config().environment.as_str();

    match DatabaseManager::health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "message": "Server is running",
                "timestamp": Utc::now(),
                "environment": environment,
                "database": "connected"
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "error",
                    "message": "Database unavailable",
                    "timestamp": Utc::now(),
                    "environment": environment,
                    "database": "disconnected"
                })),
            )
        }
    }
}

/// GET /api/debug/routes - Every route the API serves
pub async fn debug_routes() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Available API routes",
        "routes": {
            "auth": AUTH_ROUTES,
            "projects": PROJECT_ROUTES,
            "users": USER_ROUTES,
            "health": ["GET /api/health"]
        }
    }))
}
