pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod validation;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::config;
use crate::error::ApiError;
use crate::middleware::{jwt_auth_middleware, rate_limit_middleware, with_security_headers};

/// The full HTTP application with its middleware stack
pub fn app() -> Router {
    let api = &config().api;

    let mut router = Router::new()
        .merge(public_routes())
        .merge(auth_public_routes())
        .merge(auth_routes())
        .merge(project_public_routes())
        .merge(project_routes())
        .merge(user_public_routes())
        .merge(user_routes())
        .nest_service(&config().uploads.public_path, ServeDir::new(&config().uploads.dir))
        .fallback(route_not_found);

    if api.enable_rate_limiting {
        router = router.layer(from_fn(rate_limit_middleware));
    }

    let router = router
        .layer(DefaultBodyLimit::max(api.max_request_size_bytes))
        .layer(cors_layer());

    with_security_headers(router).layer(TraceLayer::new_for_http())
}

fn public_routes() -> Router {
    use handlers::public::root;

    Router::new()
        .route("/", get(root::root))
        .route("/api/health", get(root::health))
        .route("/api/debug/routes", get(root::debug_routes))
}

fn auth_public_routes() -> Router {
    use handlers::public::auth;

    Router::new()
        .route("/api/auth/register", post(auth::register_post))
        .route("/api/auth/login", post(auth::login_post))
        .route("/api/auth/refresh", post(auth::refresh_post))
        .route("/api/auth/github", get(auth::github_login))
        .route("/api/auth/github/callback", get(auth::github_callback))
}

fn auth_routes() -> Router {
    use handlers::protected::auth;

    Router::new()
        .route("/api/auth/me", get(auth::me))
        .route_layer(from_fn(jwt_auth_middleware))
}

fn project_public_routes() -> Router {
    use handlers::public::projects;

    Router::new()
        .route("/api/projects", get(projects::list))
        .route("/api/projects/:id", get(projects::get))
        .route("/api/projects/:id/readme", get(projects::readme))
        .route("/api/projects/:id/contributors", get(projects::contributors))
        .route("/api/projects/:id/languages", get(projects::languages))
}

fn project_routes() -> Router {
    use axum::routing::put;
    use handlers::protected::projects;

    Router::new()
        .route("/api/projects", post(projects::create))
        .route("/api/projects/my-projects", get(projects::my_projects))
        .route("/api/projects/:id", put(projects::update).delete(projects::delete))
        .route("/api/projects/:id/like", post(projects::toggle_like))
        .route("/api/projects/:id/comments", post(projects::add_comment))
        .route("/api/projects/:id/refresh-github", post(projects::refresh_github))
        .route("/api/projects/:id/featured", put(projects::set_featured))
        .route_layer(from_fn(jwt_auth_middleware))
}

fn user_public_routes() -> Router {
    use handlers::public::users;

    Router::new()
        .route("/api/users", get(users::list))
        .route("/api/users/profile/:id", get(users::profile_by_id))
}

fn user_routes() -> Router {
    use handlers::protected::users;

    Router::new()
        .route("/api/users/profile", get(users::profile_get).put(users::profile_put))
        .route("/api/users/follow/:id", post(users::follow))
        .route("/api/users/unfollow/:id", post(users::unfollow))
        .route_layer(from_fn(jwt_auth_middleware))
}

fn cors_layer() -> CorsLayer {
    let origins = &config().security.cors_origins;

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| HeaderValue::from_str(o).ok()).collect();
    layer.allow_origin(AllowOrigin::list(allowed)).allow_credentials(true)
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
