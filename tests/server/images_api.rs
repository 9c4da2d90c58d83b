use std::collections::HashSet;

use promptshot::domain::ids::ImageId;
use promptshot::domain::images::ImageSummary;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{JPEG_BYTES, content_type, spawn_app};

async fn created_id(response: reqwest::Response) -> ImageId {
    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.expect("generate body is json");
    body["imageId"]
        .as_str()
        .expect("imageId is a string")
        .parse()
        .expect("imageId is a valid id")
}

#[tokio::test]
async fn generate_then_fetch_returns_stored_bytes() {
    let app = spawn_app().await;
    app.stub_generated_image(JPEG_BYTES.to_vec()).await;

    let id = created_id(app.generate("a red bicycle").await).await;

    let response = reqwest::get(app.url(&format!("/images/{id}")))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    assert_eq!(content_type(&response), Some("image/jpeg"));
    assert_eq!(
        response
            .headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok()),
        Some("public, max-age=31536000, immutable")
    );
    assert_eq!(response.bytes().await.unwrap().as_ref(), JPEG_BYTES);
}

#[tokio::test]
async fn unrecognised_image_bytes_are_served_as_jpeg() {
    let app = spawn_app().await;
    let bytes = vec![0xFF, 0xD8, 0x00, 0x01];

    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"url": format!("{}/img.png", app.mock_server.uri())}]
        })))
        .mount(&app.mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/octet-stream")
                .set_body_bytes(bytes.clone()),
        )
        .mount(&app.mock_server)
        .await;

    let id = created_id(app.generate("a red bicycle").await).await;

    let response = reqwest::get(app.url(&format!("/images/{id}")))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    assert_eq!(content_type(&response), Some("image/jpeg"));
    assert_eq!(response.bytes().await.unwrap().to_vec(), bytes);
}

#[tokio::test]
async fn generate_forwards_prompt_to_image_api() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .and(body_partial_json(serde_json::json!({
            "prompt": "a red bicycle",
            "n": 1,
            "size": "256x256"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"url": format!("{}/img.png", app.mock_server.uri())}]
        })))
        .expect(1)
        .mount(&app.mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(JPEG_BYTES.to_vec()))
        .mount(&app.mock_server)
        .await;

    let response = app.generate("a red bicycle").await;
    assert_eq!(response.status(), 201);
}

#[tokio::test]
async fn unknown_image_returns_404() {
    let app = spawn_app().await;

    let response = reqwest::get(app.url(&format!("/images/{}", ImageId::generate())))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 404);
    assert_eq!(response.text().await.unwrap(), "Not found");
}

#[tokio::test]
async fn malformed_image_id_returns_404() {
    let app = spawn_app().await;

    let response = reqwest::get(app.url("/images/not-an-id"))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn list_contains_prompt_without_bytes() {
    let app = spawn_app().await;
    app.stub_generated_image(JPEG_BYTES.to_vec()).await;

    let id = created_id(app.generate("a red bicycle").await).await;

    let response = reqwest::get(app.url("/images"))
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let raw: serde_json::Value = response.json().await.unwrap();
    let entries = raw.as_array().expect("list is an array");
    assert_eq!(entries.len(), 1);
    assert!(entries[0].get("image_data").is_none());
    assert!(entries[0].get("data").is_none());

    let summaries: Vec<ImageSummary> = serde_json::from_value(raw).unwrap();
    assert_eq!(summaries[0].id, id);
    assert_eq!(summaries[0].prompt, "a red bicycle");
}

#[tokio::test]
async fn concurrent_identical_prompts_get_distinct_ids() {
    let app = spawn_app().await;
    app.stub_generated_image(JPEG_BYTES.to_vec()).await;

    let responses =
        futures::future::join_all((0..2).map(|_| app.generate("a red bicycle"))).await;

    let mut ids = HashSet::new();
    for response in responses {
        ids.insert(created_id(response).await);
    }
    assert_eq!(ids.len(), 2);

    let stored = app.image_repo.list().await.unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|s| s.prompt == "a red bicycle"));
}

#[tokio::test]
async fn generation_failure_returns_500_and_stores_nothing() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {"message": "Your request was rejected by the safety system."}
        })))
        .mount(&app.mock_server)
        .await;

    let response = app.generate("something forbidden").await;

    assert_eq!(response.status(), 500);
    assert_eq!(response.text().await.unwrap(), "Something went wrong!");
    assert!(app.image_repo.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn download_failure_returns_500_and_stores_nothing() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"url": format!("{}/expired.png", app.mock_server.uri())}]
        })))
        .mount(&app.mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/expired.png"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&app.mock_server)
        .await;

    let response = app.generate("a red bicycle").await;

    assert_eq!(response.status(), 500);
    assert!(app.image_repo.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn absent_or_unreadable_prompt_is_sent_as_empty() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .and(body_partial_json(serde_json::json!({ "prompt": "" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"url": format!("{}/img.png", app.mock_server.uri())}]
        })))
        .expect(3)
        .mount(&app.mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(JPEG_BYTES.to_vec()))
        .mount(&app.mock_server)
        .await;

    let client = reqwest::Client::new();
    for (content_type, body) in [
        ("application/json", "{}"),
        ("application/json", r#"{"prompt": null}"#),
        ("application/x-www-form-urlencoded", "prompt=a+red+bicycle"),
    ] {
        let response = client
            .post(app.url("/generate-image"))
            .header("content-type", content_type)
            .body(body)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), 201, "body {body:?} was rejected");
    }

    assert_eq!(app.image_repo.list().await.unwrap().len(), 3);
}

#[tokio::test]
async fn storage_failure_returns_generic_500() {
    let app = spawn_app().await;
    app.stub_generated_image(JPEG_BYTES.to_vec()).await;

    sqlx::query("DROP TABLE images")
        .execute(&app.pool)
        .await
        .expect("Failed to drop images table");

    let response = app.generate("a red bicycle").await;

    assert_eq!(response.status(), 500);
    assert_eq!(response.text().await.unwrap(), "Something went wrong!");
}

#[tokio::test]
async fn responses_carry_nosniff_and_cors_headers() {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .get(app.url("/images"))
        .header("Origin", "http://localhost:3001")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    assert_eq!(
        response
            .headers()
            .get("x-content-type-options")
            .and_then(|v| v.to_str().ok()),
        Some("nosniff")
    );
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3001")
    );
}
