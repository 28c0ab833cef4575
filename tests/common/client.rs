//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all admin endpoints.
//!
//! When API routes or request formats change, update only this file.
#![allow(dead_code)]

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client, optionally acting as an admin on write endpoints
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    /// Sent as X-Admin-Email on write requests when set
    pub admin_email: Option<String>,
}

impl TestClient {
    /// Creates a client that sends no admin identity
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            admin_email: None,
        }
    }

    /// Creates a client acting as [`ADMIN_EMAIL`]
    pub fn admin(base_url: String) -> Self {
        Self {
            admin_email: Some(ADMIN_EMAIL.to_string()),
            ..Self::new(base_url)
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_admin(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.admin_email {
            Some(email) => request.header("X-Admin-Email", email),
            None => request,
        }
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    // ========================================================================
    // Reports
    // ========================================================================

    /// GET /v1/admin/dashboard
    pub async fn get_dashboard(&self) -> Response {
        self.get("/v1/admin/dashboard").await
    }

    /// GET /v1/admin/growth, `days` passed through verbatim when present
    pub async fn get_growth(&self, days: Option<&str>) -> Response {
        match days {
            Some(days) => self.get(&format!("/v1/admin/growth?days={}", days)).await,
            None => self.get("/v1/admin/growth").await,
        }
    }

    /// GET /v1/admin/lessons with a raw query string (without the leading '?')
    pub async fn get_lessons(&self, query: &str) -> Response {
        self.get(&format!("/v1/admin/lessons?{}", query)).await
    }

    /// GET /v1/admin/reports with a raw query string (without the leading '?')
    pub async fn get_reports(&self, query: &str) -> Response {
        self.get(&format!("/v1/admin/reports?{}", query)).await
    }

    /// GET /v1/admin/activity with a raw query string (without the leading '?')
    pub async fn get_activity(&self, query: &str) -> Response {
        self.get(&format!("/v1/admin/activity?{}", query)).await
    }

    // ========================================================================
    // Moderation
    // ========================================================================

    /// PATCH /v1/admin/lessons/{id}
    pub async fn patch_lesson(&self, lesson_id: &str, body: Value) -> Response {
        self.with_admin(self.client.patch(self.url(&format!("/v1/admin/lessons/{}", lesson_id))))
            .json(&body)
            .send()
            .await
            .expect("PATCH request failed")
    }

    /// DELETE /v1/admin/lessons/{id}
    pub async fn delete_lesson(&self, lesson_id: &str) -> Response {
        self.with_admin(self.client.delete(self.url(&format!("/v1/admin/lessons/{}", lesson_id))))
            .send()
            .await
            .expect("DELETE request failed")
    }

    /// PATCH /v1/admin/reports/{lessonId}
    pub async fn review_reports(&self, lesson_id: &str, status: &str) -> Response {
        self.with_admin(self.client.patch(self.url(&format!("/v1/admin/reports/{}", lesson_id))))
            .json(&json!({ "status": status }))
            .send()
            .await
            .expect("PATCH request failed")
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Reads a response body as JSON
    pub async fn json(response: Response) -> Value {
        response.json().await.expect("Response body is not JSON")
    }
}
