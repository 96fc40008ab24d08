//! End-to-end tests for the generate endpoint
//!
//! Tests cover validation, the mood and story flows, and upstream failures.

mod common;

use common::*;
use moodsync_server::llm::LlmError;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

#[tokio::test]
async fn test_missing_fields_return_400_without_upstream_calls() {
    let server = TestServer::spawn(FakeLlm::replying(&["happy", "desc"]), FakeCatalog::empty()).await;
    let client = TestClient::new(server.base_url.clone());

    for body in [
        json!({}),
        json!({ "genre": "jazz" }),
        json!({ "image": TEST_IMAGE_B64 }),
        json!({ "image": "", "genre": "jazz" }),
        json!({ "image": TEST_IMAGE_B64, "genre": "   " }),
    ] {
        let response = client.generate(body.clone()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], REQUIRED_FIELDS_ERROR);
    }

    assert_eq!(server.llm.call_count(), 0);
    assert_eq!(server.catalog.auth_calls(), 0);
}

#[tokio::test]
async fn test_invalid_input_returns_400() {
    let server = TestServer::spawn(FakeLlm::replying(&[]), FakeCatalog::empty()).await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.generate_raw("{\"image\": \"abc\", ").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .generate(json!({ "image": "not base64 at all!", "genre": "jazz" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .generate(json!({ "image": TEST_IMAGE_B64, "genre": "jazz", "mood": "bewildered" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("bewildered"));

    assert_eq!(server.llm.call_count(), 0);
}

#[tokio::test]
async fn test_non_post_methods_return_405() {
    let server = TestServer::spawn(FakeLlm::replying(&[]), FakeCatalog::empty()).await;
    let client = TestClient::new(server.base_url.clone());

    for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
        let response = client.generate_with_method(method.clone()).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "error": METHOD_NOT_ALLOWED_ERROR }));
    }
    assert_eq!(server.llm.call_count(), 0);
}

#[tokio::test]
async fn test_happy_jazz_playlist() {
    let server = TestServer::spawn(
        FakeLlm::replying(&[
            "happy",
            "After analyzing your photo, we can see that you appear to be in a happy mood.",
        ]),
        FakeCatalog::with_tracks(sample_tracks(3)),
    )
    .await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.generate_for_genre(TEST_GENRE).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["storyData"],
        json!({
            "mood": "happy",
            "moodDescription": "After analyzing your photo, we can see that you appear to be in a happy mood.",
            "genre": "jazz",
        })
    );

    let tracks = body["tracks"].as_array().unwrap();
    assert_eq!(tracks.len(), 3);
    assert_eq!(tracks[0]["id"], "track-0");
    assert_eq!(tracks[0]["name"], "Song 0");
    assert_eq!(tracks[0]["artist"], "Artist 0");
    assert_eq!(tracks[0]["album"], "Album 0");
    assert_eq!(tracks[0]["duration_ms"], 200_000);
    assert_eq!(tracks[0]["external_url"], "https://open.spotify.com/track/0");
    assert_eq!(tracks[1]["preview_url"], Value::Null);

    assert_eq!(server.llm.call_count(), 2);
    assert_eq!(server.catalog.auth_calls(), 1);
    assert_eq!(
        server.catalog.searches(),
        vec![("genre:jazz happy".to_string(), 10)]
    );

    let prompts = server.llm.prompts();
    assert!(prompts[0][0].has_image());
    assert!(!prompts[1][0].has_image());
}

#[tokio::test]
async fn test_plain_base64_image_is_accepted() {
    let server = TestServer::spawn(
        FakeLlm::replying(&["sad", "You look a bit down."]),
        FakeCatalog::empty(),
    )
    .await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .generate(json!({ "image": TEST_IMAGE_B64, "genre": "classical" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let prompts = server.llm.prompts();
    let image_url = prompts[0][0]
        .content
        .iter()
        .find_map(|part| match part {
            moodsync_server::llm::ContentPart::ImageUrl { url, .. } => Some(url.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(image_url, TEST_IMAGE_DATA_URL);
}

#[tokio::test]
async fn test_unrecognised_mood_falls_back_to_calm() {
    let server = TestServer::spawn(
        FakeLlm::replying(&["Somewhat pensive, I think", "A calm description."]),
        FakeCatalog::empty(),
    )
    .await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.generate_for_genre("rock").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["storyData"]["mood"], "calm");
    assert_eq!(body["tracks"], json!([]));
    assert_eq!(server.catalog.searches()[0].0, "genre:rock calm");
}

#[tokio::test]
async fn test_track_list_is_capped_at_ten_in_catalog_order() {
    let server = TestServer::spawn(
        FakeLlm::replying(&["energetic", "Full of energy."]),
        FakeCatalog::with_tracks(sample_tracks(25)),
    )
    .await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.generate_for_genre("electronic").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    let ids: Vec<&str> = body["tracks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    let expected: Vec<String> = (0..10).map(|n| format!("track-{n}")).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_multi_word_genre_is_quoted() {
    let server = TestServer::spawn(
        FakeLlm::replying(&["confident", "Confident."]),
        FakeCatalog::empty(),
    )
    .await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.generate_for_genre("hip hop").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        server.catalog.searches()[0].0,
        "genre:\"hip hop\" confident"
    );
}

#[tokio::test]
async fn test_mood_hint_overrides_search_mood() {
    let server = TestServer::spawn(
        FakeLlm::replying(&["sad", "Looks sad."]),
        FakeCatalog::empty(),
    )
    .await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .generate(json!({ "image": TEST_IMAGE_B64, "genre": "pop", "mood": "Peaceful" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["storyData"]["mood"], "sad");
    assert_eq!(server.catalog.searches()[0].0, "genre:pop peaceful");
}

#[tokio::test]
async fn test_story_variant() {
    let server = TestServer::spawn(
        FakeLlm::replying(&[
            "A person grinning under neon lights.",
            "The city hummed as you stepped out...",
        ]),
        FakeCatalog::with_tracks(sample_tracks(2)),
    )
    .await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .generate(json!({
            "image": TEST_IMAGE_DATA_URL,
            "genre": "electronic",
            "variant": "story",
        }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["storyData"],
        json!({
            "story": "The city hummed as you stepped out...",
            "genre": "electronic",
        })
    );
    assert_eq!(body["tracks"].as_array().unwrap().len(), 2);
    assert_eq!(server.catalog.searches()[0].0, "genre:electronic calm");

    let prompts = server.llm.prompts();
    assert!(prompts[1][0].text().contains("grinning under neon lights"));
}

#[tokio::test]
async fn test_vision_failure_returns_generic_500() {
    let server = TestServer::spawn(
        FakeLlm::scripted(vec![Err(LlmError::Api {
            status: 401,
            message: "Incorrect API key provided: sk-secret".into(),
        })]),
        FakeCatalog::with_tracks(sample_tracks(3)),
    )
    .await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.generate_for_genre(TEST_GENRE).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let text = response.text().await.unwrap();
    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body, json!({ "error": GENERATION_FAILED_ERROR }));
    assert!(!text.contains("sk-secret"));

    assert_eq!(server.llm.call_count(), 1);
    assert_eq!(server.catalog.auth_calls(), 0);
}

#[tokio::test]
async fn test_empty_description_returns_500() {
    let server = TestServer::spawn(
        FakeLlm::replying(&["happy", ""]),
        FakeCatalog::with_tracks(sample_tracks(3)),
    )
    .await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.generate_for_genre(TEST_GENRE).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(server.catalog.auth_calls(), 0);
}

#[tokio::test]
async fn test_catalog_failures_return_500_without_partial_payload() {
    for catalog in [FakeCatalog::failing_auth(), FakeCatalog::failing_search()] {
        let server =
            TestServer::spawn(FakeLlm::replying(&["happy", "Looks happy."]), catalog).await;
        let client = TestClient::new(server.base_url.clone());

        let response = client.generate_for_genre(TEST_GENRE).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "error": GENERATION_FAILED_ERROR }));
        assert!(body.get("storyData").is_none());
        assert_eq!(server.llm.call_count(), 2);
    }
}

#[tokio::test]
async fn test_home_and_health() {
    let server = TestServer::spawn(FakeLlm::replying(&[]), FakeCatalog::empty()).await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.health().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "status": "ok" }));

    let response = client.home().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert!(body["uptime"].as_str().unwrap().starts_with("0d "));
    assert!(body["hash"].is_string());
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let server = TestServer::spawn_with_config(
        FakeLlm::replying(&[]),
        FakeCatalog::empty(),
        moodsync_server::server::ServerConfig {
            max_upload_bytes: 1024,
            ..Default::default()
        },
    )
    .await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .generate(json!({ "image": "A".repeat(4096), "genre": "jazz" }))
        .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(server.llm.call_count(), 0);
}
