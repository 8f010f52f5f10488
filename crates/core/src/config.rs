use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pubsub: PubSubConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubSubConfig {
    pub base_url: String,
    pub project_id: String,
    pub topic: String,
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            pubsub: PubSubConfig {
                base_url: "https://pubsub.googleapis.com".to_string(),
                project_id: "dev-test-staging".to_string(),
                topic: "pricing-service-ingest-topic".to_string(),
                timeout_secs: 30,
            },
        }
    }
}
