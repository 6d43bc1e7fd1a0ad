//! Podcast API integration tests.
//!
//! Run with: `cargo test -p tbc-api --test podcasts_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use axum_test::multipart::MultipartForm;
use chrono::Datelike;
use helpers::{
    count_rows, file_part, is_upload_of, podcast_form, register_test_user, setup_test_app, TestUser,
};
use serde_json::Value;

async fn create_podcast(
    client: &axum_test::TestServer,
    user: &TestUser,
    title: &str,
    cover: &str,
    video: &str,
) -> Value {
    let response = client
        .post("/api/v1/podcasts")
        .add_header("Authorization", user.bearer())
        .multipart(podcast_form(title, cover, video))
        .await;
    assert_eq!(response.status_code(), 201, "create failed: {}", response.text());
    response.json::<Value>()
}

#[tokio::test]
async fn test_create_podcast() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, "host").await;

    let body = create_podcast(client, &user, "Faith Talks", "faith.png", "Episode 1.mp4").await;

    let year = chrono::Utc::now().year();
    assert_eq!(body["title"], "Faith Talks");
    assert_eq!(body["running_episodes"], 3);
    assert!(is_upload_of(
        &body["video_public_id"],
        &format!("podcast/videos/{}/Episode_1", year)
    ));
    assert!(is_upload_of(
        &body["cover_image_public_id"],
        &format!("podcast/images/{}/faith", year)
    ));
    assert!(app.asset_exists(body["video_public_id"].as_str().unwrap()));
}

#[tokio::test]
async fn test_create_podcast_validates_fields() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, "invalid").await;

    let form = MultipartForm::new()
        .add_text("title", "Faith Talks")
        .add_text("running_episodes", "0")
        .add_part("cover_image", file_part("faith.png", "png-bytes"))
        .add_part("video_file", file_part("ep.mp4", "mp4-bytes"));
    let response = client
        .post("/api/v1/podcasts")
        .add_header("Authorization", user.bearer())
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(count_rows(app.pool(), "podcasts").await, 0);
}

#[tokio::test]
async fn test_video_slot_rejects_audio_file() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, "wrongkind").await;

    let response = client
        .post("/api/v1/podcasts")
        .add_header("Authorization", user.bearer())
        .multipart(podcast_form("Faith Talks", "faith.png", "episode.mp3"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body = response.json::<Value>();
    assert_eq!(body["code"], "UNSUPPORTED_MEDIA_TYPE");
    assert!(body["error"].as_str().unwrap().contains("video_file"));
}

#[tokio::test]
async fn test_replace_requires_both_files() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, "partial").await;
    let created = create_podcast(client, &user, "Faith Talks", "faith.png", "ep1.mp4").await;
    let id = created["id"].as_i64().unwrap();

    let form = MultipartForm::new()
        .add_text("title", "Hope Talks")
        .add_text("running_episodes", "4")
        .add_part("cover_image", file_part("hope.png", "png-bytes"));
    let response = client
        .put(&format!("/api/v1/podcasts/{}", id))
        .add_header("Authorization", user.bearer())
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(response.text().contains("video_file"));
}

#[tokio::test]
async fn test_replace_swaps_every_asset() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, "replace").await;
    let created = create_podcast(client, &user, "Faith Talks", "faith.png", "ep1.mp4").await;
    let id = created["id"].as_i64().unwrap();

    let response = client
        .put(&format!("/api/v1/podcasts/{}", id))
        .add_header("Authorization", user.bearer())
        .multipart(podcast_form("Hope Talks", "hope.png", "ep2.mkv"))
        .await;

    assert_eq!(response.status_code(), 200, "{}", response.text());
    let body = response.json::<Value>();
    assert_eq!(body["title"], "Hope Talks");
    for (old, new) in [
        (&created["cover_image_public_id"], &body["cover_image_public_id"]),
        (&created["video_public_id"], &body["video_public_id"]),
    ] {
        assert_ne!(old, new);
        assert!(!app.asset_exists(old.as_str().unwrap()));
        assert!(app.asset_exists(new.as_str().unwrap()));
    }
}

#[tokio::test]
async fn test_patch_title_only_leaves_assets_alone() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, "rename").await;
    let created = create_podcast(client, &user, "Faith Talks", "faith.png", "ep1.mp4").await;
    let id = created["id"].as_i64().unwrap();

    let response = client
        .patch(&format!("/api/v1/podcasts/{}", id))
        .add_header("Authorization", user.bearer())
        .multipart(MultipartForm::new().add_text("title", "Faith Talks Weekly"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body = response.json::<Value>();
    assert_eq!(body["title"], "Faith Talks Weekly");
    assert_eq!(body["video_public_id"], created["video_public_id"]);
    assert!(app.asset_exists(created["video_public_id"].as_str().unwrap()));
}

#[tokio::test]
async fn test_list_is_newest_first_and_paginated() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, "lister").await;
    create_podcast(client, &user, "First", "first.png", "first.mp4").await;
    create_podcast(client, &user, "Second", "second.png", "second.mp4").await;

    let response = client.get("/api/v1/podcasts").await;
    assert_eq!(response.status_code(), 200);
    let titles: Vec<String> = response
        .json::<Vec<Value>>()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Second", "First"]);

    let response = client.get("/api/v1/podcasts?limit=1&offset=1").await;
    let page = response.json::<Vec<Value>>();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["title"], "First");
}

#[tokio::test]
async fn test_delete_podcast() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, "remover").await;
    let created = create_podcast(client, &user, "Faith Talks", "faith.png", "ep1.mp4").await;
    let id = created["id"].as_i64().unwrap();

    let response = client
        .delete(&format!("/api/v1/podcasts/{}", id))
        .add_header("Authorization", user.bearer())
        .await;

    assert_eq!(response.status_code(), 204);
    assert_eq!(count_rows(app.pool(), "podcasts").await, 0);
    assert!(!app.asset_exists(created["video_public_id"].as_str().unwrap()));
}
