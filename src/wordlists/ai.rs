//! AI-assisted wordlist generation.
//!
//! A thin request/response client for an Anthropic-style messages API. The
//! generator turns company context into a prompt, sends one request, and
//! cleans the returned text into bare labels ready for the repository.

use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{AI_DEFAULT_ENDPOINT, AI_DEFAULT_MODEL, AI_REQUEST_TIMEOUT_SECS};

/// Context supplied by the user for generation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Company or organization name.
    pub company_name: String,
    /// Industry or sector.
    #[serde(default)]
    pub industry: String,
    /// Products and services.
    #[serde(default)]
    pub products: String,
    /// Known technology stack.
    #[serde(default)]
    pub technologies: String,
    /// Apex domain the wordlist targets.
    pub target_domain: String,
    /// Anything else worth telling the model.
    #[serde(default)]
    pub additional_context: String,
    /// Name to store the generated wordlist under.
    pub wordlist_name: String,
}

/// Failure modes of a generation request.
#[derive(Debug, Error)]
pub enum AiError {
    /// No API key configured in the environment.
    #[error("AI API key not configured; set ANTHROPIC_API_KEY or AI_API_KEY")]
    NotConfigured,

    /// The HTTP request itself failed.
    #[error("AI request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with an error status.
    #[error("AI API error (status {status}): {body}")]
    Api {
        /// HTTP status returned by the API.
        status: reqwest::StatusCode,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The API answered 200 but with no usable content.
    #[error("AI API returned no content")]
    EmptyResponse,
}

#[derive(Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    system: &'static str,
    messages: Vec<ApiMessage>,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ApiContent>,
}

#[derive(Deserialize)]
struct ApiContent {
    text: String,
}

/// Client for the wordlist generation API.
pub struct AiGenerator {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

impl AiGenerator {
    /// Builds a generator from environment configuration.
    ///
    /// `ANTHROPIC_API_KEY` (or `AI_API_KEY`) supplies the key;
    /// `AI_API_ENDPOINT` and `AI_MODEL` override the defaults.
    pub fn from_env() -> Self {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .or_else(|_| std::env::var("AI_API_KEY"))
            .ok();
        let endpoint =
            std::env::var("AI_API_ENDPOINT").unwrap_or_else(|_| AI_DEFAULT_ENDPOINT.to_string());
        let model = std::env::var("AI_MODEL").unwrap_or_else(|_| AI_DEFAULT_MODEL.to_string());

        Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint,
            model,
        }
    }

    /// Whether an API key is available.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// The model the generator will request.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generates candidate labels for the request.
    ///
    /// Returns the cleaned labels and the prompt that produced them (kept as
    /// wordlist metadata).
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<(Vec<String>, String), AiError> {
        let Some(api_key) = &self.api_key else {
            return Err(AiError::NotConfigured);
        };

        let prompt = build_prompt(request);
        let body = ApiRequest {
            model: self.model.clone(),
            max_tokens: 2000,
            temperature: 0.7,
            system: "You are a cybersecurity expert that helps generate subdomain wordlists \
                     for ethical hackers and security researchers.",
            messages: vec![ApiMessage {
                role: "user",
                content: prompt.clone(),
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(Duration::from_secs(AI_REQUEST_TIMEOUT_SECS))
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Api { status, body });
        }

        let parsed: ApiResponse = response.json().await?;
        let text = parsed
            .content
            .first()
            .map(|c| c.text.as_str())
            .ok_or(AiError::EmptyResponse)?;

        let labels = clean_labels(text, &request.target_domain);
        if labels.is_empty() {
            return Err(AiError::EmptyResponse);
        }

        info!(
            "AI generated {} labels for {}",
            labels.len(),
            request.target_domain
        );
        Ok((labels, prompt))
    }
}

/// Builds the generation prompt from the request context.
fn build_prompt(request: &GenerationRequest) -> String {
    format!(
        "You are a cybersecurity expert focusing on subdomain enumeration for ethical \
         hacking and penetration testing.\n\n\
         Generate a list of likely subdomains for the target company based on the \
         following information:\n\
         - Company Name: {}\n\
         - Industry/Sector: {}\n\
         - Products/Services: {}\n\
         - Technologies Used: {}\n\
         - Target Domain: {}\n\
         - Additional Context: {}\n\n\
         Consider common subdomains, product and service names, development and testing \
         environments, internal tools, geographic locations, acquired brands, and \
         technology-specific names.\n\n\
         Provide ONLY the list of subdomains, one per line, without the domain suffix.\n\
         For example: \"api\" not \"api.example.com\"\n\
         Do not include any explanations or other text.",
        request.company_name,
        request.industry,
        request.products,
        request.technologies,
        request.target_domain,
        request.additional_context,
    )
}

/// Cleans generated text into bare labels.
///
/// Blank lines and comments are dropped; entries that came back fully
/// qualified have the target apex stripped.
fn clean_labels(text: &str, target_domain: &str) -> Vec<String> {
    let suffix = format!(".{}", target_domain.to_lowercase());
    text.lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            line.strip_suffix(&suffix)
                .map(str::to_string)
                .unwrap_or(line)
        })
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_labels_strips_apex_suffix() {
        let text = "api\nmail.example.com\n\n# generated\nSTAGING\n";
        let labels = clean_labels(text, "example.com");
        assert_eq!(labels, vec!["api", "mail", "staging"]);
    }

    #[test]
    fn test_clean_labels_keeps_foreign_qualified_names() {
        let labels = clean_labels("cdn.example.org", "example.com");
        assert_eq!(labels, vec!["cdn.example.org"]);
    }

    #[test]
    fn test_prompt_mentions_target_domain() {
        let request = GenerationRequest {
            company_name: "Acme".into(),
            industry: String::new(),
            products: String::new(),
            technologies: String::new(),
            target_domain: "acme.dev".into(),
            additional_context: String::new(),
            wordlist_name: "acme".into(),
        };
        let prompt = build_prompt(&request);
        assert!(prompt.contains("acme.dev"));
        assert!(prompt.contains("one per line"));
    }
}
