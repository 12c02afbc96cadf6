//! Notification API client.
//!
//! Provides the HTTP client for the persisted notification resource with
//! bearer authentication and pagination.

use crate::error::AppError;
use crate::models::{Notification, NotificationType, RelatedObjectType};
use chrono::{DateTime, Utc};
use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::future::Future;

/// Remote operations on the persisted notification history.
///
/// Implementations hold no state beyond what they need to reach the server.
pub trait NotificationApi: Send + Sync {
    /// Retrieve the full persisted history for the current principal, newest first.
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<Notification>, AppError>> + Send;

    /// Mark one persisted notification read.
    fn mark_read(&self, id: i64) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Mark every persisted notification read.
    fn mark_all_read(&self) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the dashboard API (e.g., `https://shelter.example.org/api`).
    pub base_url: String,

    /// Bearer credential for the signed-in principal.
    pub token: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Notification from the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiNotification {
    pub id: i64,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    #[serde(default)]
    pub related_object_type: Option<RelatedObjectType>,
    #[serde(default)]
    pub related_object_id: Option<i64>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ApiNotification> for Notification {
    fn from(n: ApiNotification) -> Self {
        Self {
            id: n.id,
            title: n.title,
            message: n.message,
            notification_type: n.notification_type,
            related_object_type: n.related_object_type,
            related_object_id: n.related_object_id,
            is_read: n.is_read,
            created_at: n.created_at,
        }
    }
}

/// List response body: either a bare array or a paginated envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Page {
        results: Vec<T>,
        #[serde(default)]
        next: Option<String>,
    },
    Plain(Vec<T>),
}

/// Notification API client.
#[derive(Debug, Clone)]
pub struct NotificationClient {
    client: Client,
    config: ApiConfig,
}

impl NotificationClient {
    /// Create a new notification client.
    pub fn new(config: ApiConfig) -> Result<Self, AppError> {
        if config.base_url.trim().is_empty() {
            return Err(AppError::invalid_input_field(
                "API base URL is required",
                "base_url",
            ));
        }

        let mut headers = header::HeaderMap::new();

        let token_value = header::HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| AppError::authentication("Invalid token format"))?;
        headers.insert(header::AUTHORIZATION, token_value);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Get the full URL for an API path.
    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Map a non-success response to an error.
    ///
    /// `id` names the notification the request targeted, if any.
    async fn error_for(response: Response, endpoint: &str, id: Option<i64>) -> AppError {
        let status = response.status();

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                AppError::authentication("Credential rejected by notification API")
            }
            StatusCode::NOT_FOUND => match id {
                Some(id) => AppError::not_found_with_id("Notification", id.to_string()),
                None => AppError::not_found(format!("Notification endpoint {}", endpoint)),
            },
            _ => {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<serde_json::Value>(&body)
                    .ok()
                    .and_then(|v| {
                        v.get("detail")
                            .or_else(|| v.get("error"))
                            .and_then(|m| m.as_str().map(str::to_string))
                    })
                    .unwrap_or_else(|| format!("Request failed ({}): {}", status.as_u16(), body));
                AppError::api_full(message, status.as_u16(), endpoint)
            }
        }
    }

    /// Handle API response errors and decode the body.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        endpoint: &str,
    ) -> Result<T, AppError> {
        if response.status().is_success() {
            response.json::<T>().await.map_err(|e| {
                AppError::malformed_snapshot(format!("Failed to parse {}: {}", endpoint, e))
            })
        } else {
            Err(Self::error_for(response, endpoint, None).await)
        }
    }

    /// Fetch a list endpoint, following `next` links until exhausted.
    async fn get_all_pages<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>, AppError> {
        let mut all_data = Vec::new();
        let mut url = self.api_url(endpoint);
        let mut visited = HashSet::new();

        loop {
            if !visited.insert(url.clone()) {
                log::warn!("[notifications] Pagination revisited {}, stopping", url);
                break;
            }

            let response = self.client.get(&url).send().await?;
            match self.handle_response::<ListBody<T>>(response, endpoint).await? {
                ListBody::Plain(data) => {
                    all_data.extend(data);
                    break;
                }
                ListBody::Page { results, next } => {
                    all_data.extend(results);
                    match next {
                        Some(next_url) => url = next_url,
                        None => break,
                    }
                }
            }
        }

        Ok(all_data)
    }

    /// Send a POST request to an endpoint, expecting only a success status.
    async fn post_empty(&self, endpoint: &str, id: Option<i64>) -> Result<(), AppError> {
        let url = self.api_url(endpoint);
        let response = self.client.post(&url).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_for(response, endpoint, id).await)
        }
    }
}

impl NotificationApi for NotificationClient {
    async fn fetch_all(&self) -> Result<Vec<Notification>, AppError> {
        let notifications = self
            .get_all_pages::<ApiNotification>("/notifications/")
            .await?;
        Ok(notifications.into_iter().map(Notification::from).collect())
    }

    async fn mark_read(&self, id: i64) -> Result<(), AppError> {
        self.post_empty(&format!("/notifications/{}/mark_read/", id), Some(id))
            .await
    }

    async fn mark_all_read(&self) -> Result<(), AppError> {
        self.post_empty("/notifications/mark_all_read/", None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            token: "test-token".to_string(),
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_api_url_construction() {
        let client = NotificationClient::new(config("https://shelter.example.org/api/")).unwrap();
        assert_eq!(
            client.api_url("/notifications/"),
            "https://shelter.example.org/api/notifications/"
        );
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let err = NotificationClient::new(config("  ")).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { .. }));
    }

    #[test]
    fn test_token_with_newline_rejected() {
        let mut cfg = config("https://shelter.example.org/api");
        cfg.token = "bad\ntoken".to_string();
        let err = NotificationClient::new(cfg).unwrap_err();
        assert!(matches!(err, AppError::Authentication { .. }));
    }

    #[test]
    fn test_list_body_accepts_both_shapes() {
        let plain: ListBody<i64> = serde_json::from_str("[1, 2]").unwrap();
        assert!(matches!(plain, ListBody::Plain(v) if v == vec![1, 2]));

        let page: ListBody<i64> =
            serde_json::from_str(r#"{"count": 3, "next": "https://x/?page=2", "results": [1]}"#)
                .unwrap();
        assert!(matches!(page, ListBody::Page { ref results, next: Some(_) } if results == &vec![1]));
    }

    #[test]
    fn test_api_notification_conversion() {
        let raw = r#"{
            "id": 42,
            "title": "New report",
            "message": "Report #42 filed",
            "notification_type": "report_update",
            "related_object_type": "report",
            "related_object_id": 42,
            "is_read": false,
            "created_at": "2026-03-01T12:00:00Z"
        }"#;
        let n: Notification = serde_json::from_str::<ApiNotification>(raw).unwrap().into();
        assert_eq!(n.id, 42);
        assert_eq!(n.notification_type, NotificationType::ReportUpdate);
        assert_eq!(n.related_object_type, Some(RelatedObjectType::Report));
        assert!(!n.is_read);
    }

    #[test]
    fn test_api_notification_missing_field_fails() {
        let raw = r#"{"id": 1, "title": "t", "is_read": false}"#;
        assert!(serde_json::from_str::<ApiNotification>(raw).is_err());
    }
}
