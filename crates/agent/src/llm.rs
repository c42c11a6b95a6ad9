use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use shopfront_core::config::LlmConfig;
use tracing::warn;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Single-call client for the Gemini generateContent endpoint. No retries,
/// no streaming.
pub struct GeminiClient {
    http: Client,
    api_key: Option<SecretString>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            http: Client::new(),
            api_key: config
                .api_key
                .clone()
                .filter(|key| !key.expose_secret().trim().is_empty()),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let Some(api_key) = &self.api_key else {
            bail!("llm api key is not configured");
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = GenerateRequest {
            contents: [RequestContent { parts: [RequestPart { text: prompt }] }],
        };

        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key.expose_secret())])
            .json(&request)
            .send()
            .await
            .context("llm request failed")?
            .error_for_status()
            .context("llm returned an error status")?;

        let parsed: GenerateResponse =
            response.json().await.context("llm response was not valid JSON")?;

        let text = parsed
            .candidates
            .into_iter()
            .flat_map(|candidate| candidate.content.parts)
            .map(|part| part.text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Ok(text)
    }
}

/// Degrade generation failures to the empty string. The gateway contract is
/// that failure never crosses this boundary as an error; callers treat an
/// empty result as "model declined" and take their own fallback.
pub async fn generate_lenient(client: &dyn LlmClient, prompt: &str) -> String {
    match client.generate(prompt).await {
        Ok(text) => text,
        Err(error) => {
            warn!(error = %error, "llm generation failed");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;
    use async_trait::async_trait;
    use shopfront_core::config::AppConfig;

    use super::{generate_lenient, GeminiClient, LlmClient};

    struct FailingLlm;

    #[async_trait]
    impl LlmClient for FailingLlm {
        async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
            bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn lenient_generation_degrades_errors_to_empty_output() {
        assert_eq!(generate_lenient(&FailingLlm, "classify this").await, "");
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let client = GeminiClient::new(&AppConfig::default().llm);
        let error = client.generate("hello").await.expect_err("no key configured");
        assert!(error.to_string().contains("api key"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut llm = AppConfig::default().llm;
        llm.api_key = Some("   ".to_string().into());
        let client = GeminiClient::new(&llm);
        assert!(client.api_key.is_none());
    }
}
