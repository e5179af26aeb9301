use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path to the precomputed course embedding catalog (JSON)
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Base URL of the OpenAI-compatible embedding endpoint
    #[serde(default = "default_embedding_api_url")]
    pub embedding_api_url: String,

    /// Bearer token for the embedding endpoint, if it requires one
    #[serde(default)]
    pub embedding_api_key: Option<String>,

    /// Embedding model used for review texts
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Dimension shared by course and review embeddings
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,

    /// Per-request timeout for the embedding endpoint
    #[serde(default = "default_embedding_timeout_secs")]
    pub embedding_timeout_secs: u64,

    /// Maximum number of texts sent in one embedding request
    #[serde(default = "default_embedding_batch_size")]
    pub embedding_batch_size: usize,

    /// Number of courses whose reviews are embedded concurrently at load
    #[serde(default = "default_embedding_concurrency")]
    pub embedding_concurrency: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origin allowed by the CORS layer
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_catalog_path() -> String {
    "embedded_courses.json".to_string()
}

fn default_embedding_api_url() -> String {
    "http://localhost:8080/v1".to_string()
}

fn default_embedding_model() -> String {
    "all-MiniLM-L6-v2".to_string()
}

fn default_embedding_dimensions() -> usize {
    384
}

fn default_embedding_timeout_secs() -> u64 {
    30
}

fn default_embedding_batch_size() -> usize {
    64
}

fn default_embedding_concurrency() -> usize {
    4
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    12000
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.embedding_dimensions > 0,
            "EMBEDDING_DIMENSIONS must be positive"
        );
        anyhow::ensure!(
            self.embedding_batch_size > 0,
            "EMBEDDING_BATCH_SIZE must be positive"
        );
        anyhow::ensure!(
            self.embedding_concurrency > 0,
            "EMBEDDING_CONCURRENCY must be positive"
        );
        Ok(())
    }

    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.embedding_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
