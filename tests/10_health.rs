mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::get(server.url("/api/health")).await?;
    let status = res.status();
    assert!(
        status == StatusCode::OK || status == StatusCode::SERVICE_UNAVAILABLE,
        "unexpected status: {}",
        status
    );

    let body: Value = res.json().await?;
    let expected = if status == StatusCode::OK { "connected" } else { "disconnected" };
    assert_eq!(body["database"], expected);
    assert_eq!(body["environment"], "development");
    Ok(())
}

#[tokio::test]
async fn root_and_route_listing() -> Result<()> {
    let server = common::ensure_server().await?;

    let body: Value = reqwest::get(server.url("/")).await?.json().await?;
    assert_eq!(body["status"], "success");
    assert_eq!(body["endpoints"]["users"], "/api/users/*");

    let body: Value = reqwest::get(server.url("/api/debug/routes")).await?.json().await?;
    assert!(body["routes"]["auth"].as_array().is_some_and(|r| !r.is_empty()));
    Ok(())
}

#[tokio::test]
async fn unknown_route_returns_error_envelope() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::get(server.url("/api/does-not-exist")).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: Value = res.json().await?;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Route not found");
    Ok(())
}
