use promptshot::domain::ids::ImageId;
use promptshot::infrastructure::client::PromptshotClient;

use crate::helpers::{JPEG_BYTES, spawn_app};

#[tokio::test]
async fn client_round_trips_against_running_server() {
    let app = spawn_app().await;
    app.stub_completion("A charcoal sketch of a sleeping fox").await;
    app.stub_generated_image(JPEG_BYTES.to_vec()).await;

    let client = PromptshotClient::from_base_url(&app.address).unwrap();

    let suggestion = client.suggestion().await.unwrap();
    assert_eq!(suggestion, "A charcoal sketch of a sleeping fox");

    let id = client.images().generate(&suggestion).await.unwrap();

    let listed = client.images().list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id);
    assert_eq!(listed[0].prompt, suggestion);

    let fetched = client.images().fetch(id).await.unwrap();
    assert_eq!(fetched.content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(fetched.data, JPEG_BYTES);
}

#[tokio::test]
async fn client_surfaces_server_errors() {
    let app = spawn_app().await;
    let client = PromptshotClient::from_base_url(&app.address).unwrap();

    let err = client
        .images()
        .fetch(ImageId::generate())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("404"), "unexpected error: {err}");

    // Nothing stubbed upstream, so the completion call fails.
    let err = client.suggestion().await.unwrap_err();
    assert!(
        err.to_string().contains("Something went wrong!"),
        "unexpected error: {err}"
    );
}
