//! A local stand-in for the GitHub REST API, so project writes can run offline.
//!
//! Repository names pick the behavior:
//! - `missing-*` answers 404 for the repository itself
//! - `broken-*` serves the repository but fails the contributors call with 500
//! - anything else serves a small, fixed repository

use std::sync::OnceLock;

use axum::{extract::Path, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;

#[allow(dead_code)]
pub const STARS: i64 = 42;
#[allow(dead_code)]
pub const CONTRIBUTORS: i64 = 2;

static BASE_URL: OnceLock<String> = OnceLock::new();

/// Start the stub once per test binary and return its base URL
pub fn base_url() -> &'static str {
    BASE_URL.get_or_init(|| {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind GitHub stub");
        listener.set_nonblocking(true).expect("non-blocking GitHub stub listener");
        let addr = listener.local_addr().expect("GitHub stub address");

        // Own runtime on its own thread so it outlives each #[tokio::test] runtime
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("GitHub stub runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).expect("GitHub stub listener");
                axum::serve(listener, router()).await.expect("GitHub stub server");
            });
        });

        format!("http://{}", addr)
    })
}

fn router() -> Router {
    Router::new()
        .route("/repos/:owner/:repo", get(repository))
        .route("/repos/:owner/:repo/contributors", get(contributors))
        .route("/repos/:owner/:repo/languages", get(languages))
}

async fn repository(Path((owner, repo)): Path<(String, String)>) -> impl IntoResponse {
    if repo.starts_with("missing") {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" })));
    }

    (
        StatusCode::OK,
        Json(json!({
            "full_name": format!("{}/{}", owner, repo),
            "stargazers_count": STARS,
            "forks_count": 7,
            "watchers_count": STARS,
            "language": "Rust",
            "updated_at": "2026-01-15T10:00:00Z",
            "description": "A repository served by the test stub",
            "topics": ["api", "rust"],
            "default_branch": "main",
            "size": 512,
            "open_issues_count": 3,
            "license": { "name": "MIT License" },
            "homepage": ""
        })),
    )
}

async fn contributors(Path((_owner, repo)): Path<(String, String)>) -> impl IntoResponse {
    if repo.starts_with("broken") {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "Server Error" })));
    }

    let people: Vec<_> = ["ada", "grace"]
        .iter()
        .enumerate()
        .map(|(i, login)| {
            json!({
                "id": i + 1,
                "login": login,
                "avatar_url": format!("https://avatars.example/{}", login),
                "html_url": format!("https://github.com/{}", login),
                "contributions": 10 - i,
                "type": "User"
            })
        })
        .collect();
    (StatusCode::OK, Json(json!(people)))
}

async fn languages() -> Json<serde_json::Value> {
    Json(json!({ "Rust": 12000, "Shell": 300 }))
}
