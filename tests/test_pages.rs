mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn about_us_twice_gets_suffix() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    let token = common::super_token(&server).await;

    let mut slugs = Vec::new();
    for _ in 0..2 {
        let response = server
            .post("/api/pages")
            .authorization_bearer(&token)
            .json(&json!({ "pageTitle": "About Us" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["message"].as_str(), Some("Page created successfully"));
        slugs.push(body["data"]["slug"].as_str().unwrap().to_string());
    }
    assert_eq!(slugs, vec!["about-us", "about-us-1"]);
}

#[tokio::test]
async fn page_and_content_slugs_are_independent() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    let token = common::super_token(&server).await;

    common::create_content(&server, &token, common::blog("Contact", "draft")).await;
    let response = server
        .post("/api/pages")
        .authorization_bearer(&token)
        .json(&json!({ "pageTitle": "Contact" }))
        .await;
    assert_eq!(response.json::<Value>()["data"]["slug"].as_str(), Some("contact"));
}

#[tokio::test]
async fn page_fields_are_validated() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();
    let token = common::super_token(&server).await;

    let response = server
        .post("/api/pages")
        .authorization_bearer(&token)
        .json(&json!({
            "googleAnalyticsId": "UA-12345-1",
            "metaPixelCode": "abc",
            "metaDescription": "d".repeat(161)
        }))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(
        fields,
        vec!["pageTitle", "metaDescription", "googleAnalyticsId", "metaPixelCode"]
    );
    assert_eq!(
        body["errors"][0]["message"].as_str(),
        Some("Page title is required")
    );
}

#[tokio::test]
async fn full_page_lifecycle() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();
    let token = common::super_token(&server).await;

    let response = server
        .post("/api/pages")
        .authorization_bearer(&token)
        .json(&json!({
            "pageTitle": "Landing",
            "editorContent": "<h1>Hello</h1>",
            "keywords": "launch, Product",
            "googleAnalyticsId": "G-ABCDEF1234",
            "metaPixelCode": "1234567890"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json::<Value>()["data"].clone();
    assert_eq!(created["keywords"], json!(["launch", "product"]));
    assert_eq!(created["editorContent"].as_str(), Some("<h1>Hello</h1>"));

    let response = server
        .put("/api/pages/landing")
        .authorization_bearer(&token)
        .json(&json!({ "pageTitle": "Landing v2", "metaPixelCode": "" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"].as_str(), Some("Page updated successfully"));
    assert_eq!(body["data"]["slug"].as_str(), Some("landing"));
    assert_eq!(body["data"]["pageTitle"].as_str(), Some("Landing v2"));
    assert!(body["data"].get("metaPixelCode").is_none());

    let response = server
        .get("/api/pages/landing")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.json::<Value>()["message"].as_str(), Some("Page retrieved successfully"));

    let response = server
        .delete("/api/pages/landing")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["message"].as_str(), Some("Page deleted successfully"));

    let response = server
        .get("/api/pages/landing")
        .authorization_bearer(&token)
        .await;
    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["message"].as_str(), Some("Page not found"));
}

#[tokio::test]
async fn duplicate_explicit_slug_on_update() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();
    let token = common::super_token(&server).await;

    for title in ["Terms", "Privacy"] {
        server
            .post("/api/pages")
            .authorization_bearer(&token)
            .json(&json!({ "pageTitle": title }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = server
        .put("/api/pages/privacy")
        .authorization_bearer(&token)
        .json(&json!({ "slug": "terms" }))
        .await;
    response.assert_status_bad_request();
    assert_eq!(
        response.json::<Value>()["message"].as_str(),
        Some("Page with this slug already exists")
    );
}

#[tokio::test]
async fn list_pages_filters_by_title() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    let token = common::super_token(&server).await;

    for title in ["Team", "Careers", "Team History"] {
        server
            .post("/api/pages")
            .authorization_bearer(&token)
            .json(&json!({ "pageTitle": title }))
            .await;
    }

    let response = server
        .get("/api/pages")
        .authorization_bearer(&token)
        .add_query_param("title", "team")
        .add_query_param("sort", "pageTitle")
        .await;
    let body: Value = response.json();
    assert_eq!(body["message"].as_str(), Some("Pages retrieved successfully"));
    assert_eq!(body["pagination"]["totalCount"], 2);
    assert_eq!(body["data"][0]["pageTitle"].as_str(), Some("Team"));
    assert_eq!(body["data"][1]["pageTitle"].as_str(), Some("Team History"));
}

#[tokio::test]
async fn pages_require_a_token() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();

    server
        .post("/api/pages")
        .json(&json!({ "pageTitle": "Sneaky" }))
        .await
        .assert_status_unauthorized();
}
