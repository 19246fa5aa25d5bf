use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::types::LlmClient;
use super::PipelineError;
use crate::config::{AppConfig, DEFAULT_LLM_TIMEOUT_SECS, DEFAULT_OLLAMA_URL};

/// Ollama HTTP client for local LLM inference.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, PipelineError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PipelineError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    /// Default Ollama instance at localhost:11434 with 5-minute timeout.
    pub fn default_local() -> Result<Self, PipelineError> {
        Self::new(DEFAULT_OLLAMA_URL, DEFAULT_LLM_TIMEOUT_SECS)
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        Self::new(&config.ollama_url, config.llm_timeout_secs)
    }

    fn transport_error(&self, e: reqwest::Error) -> PipelineError {
        if e.is_connect() {
            PipelineError::OllamaConnection(self.base_url.clone())
        } else if e.is_timeout() {
            PipelineError::HttpClient(format!("Request timed out after {}s", self.timeout_secs))
        } else {
            PipelineError::HttpClient(e.to_string())
        }
    }

    fn check_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, PipelineError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(PipelineError::OllamaError {
            status: status.as_u16(),
            body,
        })
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

impl LlmClient for OllamaClient {
    fn generate(&self, model: &str, prompt: &str, system: &str) -> Result<String, PipelineError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model,
            prompt,
            system,
            stream: false,
        };

        tracing::debug!(model, prompt_chars = prompt.len(), "Sending generate request");
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.transport_error(e))?;

        let parsed: OllamaGenerateResponse = Self::check_status(response)?
            .json()
            .map_err(|e| PipelineError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response)
    }

    fn is_model_available(&self, model: &str) -> Result<bool, PipelineError> {
        let models = self.list_models()?;
        Ok(models.iter().any(|m| m.starts_with(model)))
    }

    fn list_models(&self) -> Result<Vec<String>, PipelineError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.transport_error(e))?;

        let parsed: OllamaTagsResponse = Self::check_status(response)?
            .json()
            .map_err(|e| PipelineError::ResponseParsing(e.to_string()))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }
}

/// Mock LLM client for testing. Replies are picked by prompt substring,
/// falling back to a default response.
pub struct MockLlmClient {
    response: String,
    replies: Vec<(String, String)>,
    available_models: Vec<String>,
    fail: bool,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            replies: Vec::new(),
            available_models: vec!["llama3.1:8b".to_string()],
            fail: false,
        }
    }

    /// Answer `reply` to any prompt containing `needle`. Earlier rules win.
    pub fn with_reply_for(mut self, needle: &str, reply: &str) -> Self {
        self.replies.push((needle.to_string(), reply.to_string()));
        self
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.available_models = models;
        self
    }

    /// Every request fails as if Ollama were down.
    pub fn unreachable() -> Self {
        Self {
            fail: true,
            ..Self::new("")
        }
    }
}

impl LlmClient for MockLlmClient {
    fn generate(&self, _model: &str, prompt: &str, _system: &str) -> Result<String, PipelineError> {
        if self.fail {
            return Err(PipelineError::OllamaConnection("mock".into()));
        }
        let reply = self
            .replies
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map_or(&self.response, |(_, reply)| reply);
        Ok(reply.clone())
    }

    fn is_model_available(&self, model: &str) -> Result<bool, PipelineError> {
        Ok(self.list_models()?.iter().any(|m| m.starts_with(model)))
    }

    fn list_models(&self) -> Result<Vec<String>, PipelineError> {
        if self.fail {
            return Err(PipelineError::OllamaConnection("mock".into()));
        }
        Ok(self.available_models.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_client_returns_configured_response() {
        let client = MockLlmClient::new("test response");
        assert_eq!(client.generate("model", "prompt", "system").unwrap(), "test response");
    }

    #[test]
    fn mock_client_routes_by_prompt() {
        let client = MockLlmClient::new("default").with_reply_for("generic", "Paracetamol");
        assert_eq!(client.generate("m", "the generic name of Crocin", "").unwrap(), "Paracetamol");
        assert_eq!(client.generate("m", "anything else", "").unwrap(), "default");
    }

    #[test]
    fn mock_client_model_availability() {
        let client = MockLlmClient::new("").with_models(vec!["llama3.1:8b".into(), "medllama2:latest".into()]);
        assert_eq!(client.list_models().unwrap().len(), 2);
        assert!(client.is_model_available("medllama2").unwrap());
        assert!(!client.is_model_available("mistral").unwrap());
    }

    #[test]
    fn unreachable_mock_fails_with_connection_error() {
        let client = MockLlmClient::unreachable();
        assert!(matches!(
            client.generate("m", "p", "s"),
            Err(PipelineError::OllamaConnection(_))
        ));
    }

    #[test]
    fn ollama_client_trims_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", 60).unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.timeout_secs, 60);
    }

    #[test]
    fn ollama_client_from_config() {
        let config = AppConfig {
            ollama_url: "http://gpu-box:11434".into(),
            llm_timeout_secs: 30,
            ..AppConfig::default()
        };
        let client = OllamaClient::from_config(&config).unwrap();
        assert_eq!(client.base_url, "http://gpu-box:11434");
        assert_eq!(client.timeout_secs, 30);
    }

    #[test]
    fn default_local_uses_standard_port() {
        let client = OllamaClient::default_local().unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
    }
}
