use anyhow::{anyhow, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::client::{AdvisorClient, AdvisorParams};

/// HTTP client for an advisory-model sidecar exposing a `/generate`
/// endpoint.
#[derive(Clone)]
pub struct SidecarAdvisor {
    http: Client,
    base_url: String,
}

impl SidecarAdvisor {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { http: Client::new(), base_url: base_url.into() }
    }
}

#[derive(Serialize)]
struct Req<'a> {
    system: &'a str,
    prompt: &'a str,
    #[serde(flatten)]
    params: &'a AdvisorParams,
}

#[derive(Deserialize)]
struct Resp {
    text: String,
}

#[async_trait::async_trait]
impl AdvisorClient for SidecarAdvisor {
    async fn generate(&self, system: &str, prompt: &str, params: &AdvisorParams) -> Result<String> {
        let url = format!("{}/generate", self.base_url);
        let r = self.http.post(url).json(&Req { system, prompt, params }).send().await?;
        if r.status() != StatusCode::OK {
            return Err(anyhow!("advisor sidecar error: {}", r.text().await?));
        }
        let body: Resp = r.json().await?;
        Ok(body.text)
    }
}
