mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn malformed_project_id_is_404() -> Result<()> {
    let server = common::ensure_server().await?;

    for path in ["/api/projects/xyz", "/api/projects/xyz/readme", "/api/projects/xyz/contributors", "/api/projects/xyz/languages"] {
        let res = reqwest::get(server.url(path)).await?;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{}", path);
        let body: Value = res.json().await?;
        assert_eq!(body["message"], "Project not found");
    }
    Ok(())
}

#[tokio::test]
async fn writes_require_authentication() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let id = uuid::Uuid::new_v4();

    let res = client.post(server.url("/api/projects")).json(&json!({})).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client.post(server.url(&format!("/api/projects/{}/like", id))).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client.delete(server.url(&format!("/api/projects/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn listing_and_validation() -> Result<()> {
    let server = common::ensure_server().await?;
    if !server.has_database().await {
        eprintln!("skipping: no database configured");
        return Ok(());
    }
    let client = reqwest::Client::new();

    let body: Value = reqwest::get(server.url("/api/projects?category=all&sortBy=likes&limit=5"))
        .await?
        .json()
        .await?;
    assert_eq!(body["status"], "success");
    assert!(body["data"]["pagination"]["totalProjects"].is_number());

    let (token, _) = server.register(&client, "Builder").await?;

    let res = client
        .post(server.url("/api/projects"))
        .bearer_auth(&token)
        .json(&json!({ "title": "", "githubUrl": "https://gitlab.com/a/b" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Validation failed");

    let body: Value = client
        .get(server.url("/api/projects/my-projects"))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["data"]["projects"].as_array().map(Vec::len), Some(0));

    let res = client
        .post(server.url(&format!("/api/projects/{}/like", uuid::Uuid::new_v4())))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
