//! HTTP client for end-to-end tests
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::{Method, Response};
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ========================================================================
    // Server info
    // ========================================================================

    /// GET /
    pub async fn home(&self) -> Response {
        self.client
            .get(self.url("/"))
            .send()
            .await
            .expect("Home request failed")
    }

    /// GET /api/health
    pub async fn health(&self) -> Response {
        self.client
            .get(self.url("/api/health"))
            .send()
            .await
            .expect("Health request failed")
    }

    // ========================================================================
    // Generation
    // ========================================================================

    /// POST /api/generate with an arbitrary JSON body
    pub async fn generate(&self, body: Value) -> Response {
        self.client
            .post(self.url("/api/generate"))
            .json(&body)
            .send()
            .await
            .expect("Generate request failed")
    }

    /// POST /api/generate with the test image and `genre`
    pub async fn generate_for_genre(&self, genre: &str) -> Response {
        self.generate(json!({ "image": TEST_IMAGE_DATA_URL, "genre": genre }))
            .await
    }

    /// POST /api/generate with a raw, possibly malformed body
    pub async fn generate_raw(&self, body: &str) -> Response {
        self.client
            .post(self.url("/api/generate"))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Generate request failed")
    }

    /// Any method on /api/generate
    pub async fn generate_with_method(&self, method: Method) -> Response {
        self.client
            .request(method, self.url("/api/generate"))
            .send()
            .await
            .expect("Generate request failed")
    }
}
