use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{content_type, spawn_app};

#[tokio::test]
async fn suggestion_returns_upstream_text_verbatim() {
    let app = spawn_app().await;
    app.stub_completion("A watercolor of a dragon").await;

    let response = reqwest::get(app.url("/suggestion"))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    assert!(
        content_type(&response).is_some_and(|ct| ct.starts_with("text/plain")),
        "expected plain text, got {:?}",
        content_type(&response)
    );
    assert_eq!(response.text().await.unwrap(), "A watercolor of a dragon");
}

#[tokio::test]
async fn root_serves_the_suggestion_too() {
    let app = spawn_app().await;
    app.stub_completion("\n\nAn oil painting of a lighthouse at dusk").await;

    let response = reqwest::get(app.url("/"))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.text().await.unwrap(),
        "\n\nAn oil painting of a lighthouse at dusk"
    );
}

#[tokio::test]
async fn upstream_failure_returns_generic_500() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&app.mock_server)
        .await;

    let response = reqwest::get(app.url("/suggestion"))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 500);
    assert_eq!(response.text().await.unwrap(), "Something went wrong!");
}

#[tokio::test]
async fn empty_choice_list_returns_500() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": []
        })))
        .mount(&app.mock_server)
        .await;

    let response = reqwest::get(app.url("/suggestion"))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 500);
}

#[tokio::test]
async fn empty_text_is_passed_through() {
    let app = spawn_app().await;
    app.stub_completion("").await;

    let response = reqwest::get(app.url("/suggestion"))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "");
}
