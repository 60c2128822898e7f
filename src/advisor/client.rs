use anyhow::Result;
use serde::Serialize;

/// Sampling parameters forwarded to the advisory model.
#[derive(Debug, Clone, Serialize)]
pub struct AdvisorParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: usize,
}

impl From<&crate::config::AdvisorConfig> for AdvisorParams {
    fn from(cfg: &crate::config::AdvisorConfig) -> Self {
        Self { temperature: cfg.temperature, top_p: cfg.top_p, max_tokens: cfg.max_tokens }
    }
}

/// A qualitative-decision source. Implementations wrap whatever model
/// endpoint is available; the engine only ever sees the returned text.
#[async_trait::async_trait]
pub trait AdvisorClient: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str, params: &AdvisorParams) -> Result<String>;
}
