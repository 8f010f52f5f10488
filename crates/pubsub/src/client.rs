//! Google Pub/Sub REST publisher.
//!
//! Publishes normalized price records to a Pub/Sub topic over the REST
//! surface (`projects/{project}/topics/{topic}:publish`) with the record
//! JSON base64-encoded into the message `data` field.

use crate::error::{PublishError, Result};
use crate::publisher::Publisher;
use async_trait::async_trait;
use base64::Engine as _;
use pricefeed_core::{PriceRecord, PubSubConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Google Pub/Sub production endpoint.
pub const PUBSUB_PROD_URL: &str = "https://pubsub.googleapis.com";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the Pub/Sub publisher client.
#[derive(Debug, Clone)]
pub struct PubSubClientConfig {
    /// Base URL of the Pub/Sub service (override for emulators and tests).
    pub base_url: String,

    /// GCP project id owning the topic.
    pub project_id: String,

    /// Topic to publish to.
    pub topic: String,

    /// Per-call request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for PubSubClientConfig {
    fn default() -> Self {
        Self {
            base_url: PUBSUB_PROD_URL.to_string(),
            project_id: "dev-test-staging".to_string(),
            topic: "pricing-service-ingest-topic".to_string(),
            timeout_secs: 30,
        }
    }
}

impl PubSubClientConfig {
    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the project id.
    #[must_use]
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self
    }

    /// Sets the topic.
    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Sets the per-call timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl From<PubSubConfig> for PubSubClientConfig {
    fn from(config: PubSubConfig) -> Self {
        Self {
            base_url: config.base_url,
            project_id: config.project_id,
            topic: config.topic,
            timeout_secs: config.timeout_secs,
        }
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
struct PublishRequest {
    messages: Vec<PubSubMessage>,
}

#[derive(Debug, Serialize)]
struct PubSubMessage {
    data: String,
}

#[derive(Debug, Deserialize)]
struct RawPublishResponse {
    #[serde(rename = "messageIds")]
    message_ids: Option<Vec<String>>,
}

// =============================================================================
// Client
// =============================================================================

/// Pub/Sub REST publisher client.
#[derive(Debug)]
pub struct PubSubPublisher {
    http: Client,
    config: PubSubClientConfig,
}

impl PubSubPublisher {
    /// Creates a new publisher from configuration.
    ///
    /// # Errors
    ///
    /// Returns `PublishError::Configuration` if the project id or topic is
    /// empty, or if the HTTP client cannot be constructed.
    pub fn new(config: PubSubClientConfig) -> Result<Self> {
        if config.project_id.is_empty() {
            return Err(PublishError::Configuration(
                "project id must not be empty".to_string(),
            ));
        }
        if config.topic.is_empty() {
            return Err(PublishError::Configuration(
                "topic must not be empty".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PublishError::Configuration(e.to_string()))?;

        Ok(Self { http, config })
    }

    fn publish_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/topics/{}:publish",
            self.config.base_url, self.config.project_id, self.config.topic
        )
    }

    fn encode(record: &PriceRecord) -> Result<String> {
        let json = serde_json::to_vec(&record.to_payload())?;
        Ok(base64::engine::general_purpose::STANDARD.encode(json))
    }
}

#[async_trait]
impl Publisher for PubSubPublisher {
    async fn publish(&self, record: &PriceRecord) -> Result<String> {
        let body = PublishRequest {
            messages: vec![PubSubMessage {
                data: Self::encode(record)?,
            }],
        };

        let response = self
            .http
            .post(self.publish_url())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                topic = %self.config.topic,
                "pub/sub publish rejected"
            );
            return Err(PublishError::api(status.as_u16(), message));
        }

        let parsed: RawPublishResponse = response.json().await?;
        let message_id = parsed
            .message_ids
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| {
                PublishError::api(status.as_u16(), "publish response carried no message id")
            })?;

        tracing::debug!(message_id = %message_id, record_id = %record.id, "published record");
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_record() -> PriceRecord {
        PriceRecord {
            id: Uuid::parse_str("a17853e0-90ab-4613-94a4-ac7b179f8315").unwrap(),
            crypto_name: "Bitcoin".to_string(),
            crypto_symbol: "BTC".to_string(),
            fiat_currency: "USDT".to_string(),
            source: "Binance".to_string(),
            ticker: "BTCUSDT".to_string(),
            open: 88680.39,
            high: 89414.15,
            low: 82256.01,
            close: 84250.09,
            volume: 4_898_429_925.636_476_5,
            timestamp: Utc.with_ymd_and_hms(2025, 3, 4, 11, 53, 58).unwrap(),
            dividends: 0.0,
            stock_splits: 0.0,
            metadata: String::new(),
            insertion_timestamp: Utc.with_ymd_and_hms(2025, 3, 4, 11, 53, 58).unwrap(),
            is_deleted: false,
        }
    }

    fn test_config(base_url: &str) -> PubSubClientConfig {
        PubSubClientConfig::default()
            .with_base_url(base_url)
            .with_project_id("test-project")
            .with_topic("test-topic")
            .with_timeout_secs(5)
    }

    // ==================== Config Tests ====================

    #[test]
    fn test_client_config_default() {
        let config = PubSubClientConfig::default();
        assert_eq!(config.base_url, PUBSUB_PROD_URL);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_client_config_builder() {
        let config = PubSubClientConfig::default()
            .with_base_url("http://localhost:8085")
            .with_project_id("local")
            .with_topic("prices")
            .with_timeout_secs(2);

        assert_eq!(config.base_url, "http://localhost:8085");
        assert_eq!(config.project_id, "local");
        assert_eq!(config.topic, "prices");
        assert_eq!(config.timeout_secs, 2);
    }

    #[test]
    fn test_empty_project_id_rejected() {
        let config = PubSubClientConfig::default().with_project_id("");
        let err = PubSubPublisher::new(config).unwrap_err();
        assert!(matches!(err, PublishError::Configuration(_)));
    }

    #[test]
    fn test_empty_topic_rejected() {
        let config = PubSubClientConfig::default().with_topic("");
        let err = PubSubPublisher::new(config).unwrap_err();
        assert!(matches!(err, PublishError::Configuration(_)));
    }

    // ==================== Publish Tests ====================

    #[tokio::test]
    async fn test_publish_returns_message_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/projects/test-project/topics/test-topic:publish"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "messageIds": ["1234567890"]
                })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let publisher = PubSubPublisher::new(test_config(&server.uri())).unwrap();
        let message_id = publisher.publish(&sample_record()).await.unwrap();
        assert_eq!(message_id, "1234567890");
    }

    #[tokio::test]
    async fn test_publish_payload_matches_queue_schema() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "messageIds": ["1"]
                })),
            )
            .mount(&server)
            .await;

        let publisher = PubSubPublisher::new(test_config(&server.uri())).unwrap();
        publisher.publish(&sample_record()).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);

        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let data = body["messages"][0]["data"].as_str().unwrap();
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(data)
            .unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&decoded).unwrap();

        assert_eq!(payload["id"], "a17853e0-90ab-4613-94a4-ac7b179f8315");
        assert_eq!(payload["metadata"], "");
        assert!(payload["metadata"].is_string(), "metadata must never be null");
        assert_eq!(payload["is_deleted"], false);
        assert_eq!(payload["crypto_symbol"], "BTC");
    }

    #[tokio::test]
    async fn test_publish_api_error_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("topic not found"))
            .mount(&server)
            .await;

        let publisher = PubSubPublisher::new(test_config(&server.uri())).unwrap();
        let err = publisher.publish(&sample_record()).await.unwrap_err();
        assert!(matches!(err, PublishError::Api { status_code: 404, .. }));
        assert!(err.to_string().contains("topic not found"));
    }

    #[tokio::test]
    async fn test_publish_missing_message_id_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let publisher = PubSubPublisher::new(test_config(&server.uri())).unwrap();
        let err = publisher.publish(&sample_record()).await.unwrap_err();
        assert!(err.to_string().contains("no message id"), "was: {err}");
    }

    #[tokio::test]
    async fn test_publish_timeout_is_a_timeout_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "messageIds": ["1"] }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = test_config(&server.uri()).with_timeout_secs(1);
        let publisher = PubSubPublisher::new(config).unwrap();
        let err = publisher.publish(&sample_record()).await.unwrap_err();
        assert!(matches!(err, PublishError::Timeout(_)), "was: {err}");
        assert!(err.is_transient());
    }
}
