//! Chat-completions client for text generation and image captioning
//!
//! Speaks the OpenAI-compatible API that Groq exposes.

use crate::agent::{
    retry::with_retry, CapabilityClientConfig, CapabilityError, ImageAnalyzer, TextGenerator,
    TokenUsage,
};
use crate::core::config::LlmConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Prompt sent alongside an image for caption suggestions
pub const CAPTION_PROMPT: &str = "Analyze this image. Suggest a journalistic caption.";

/// Language model client
#[derive(Debug, Clone)]
pub struct GroqClient {
    client: reqwest::Client,
    config: CapabilityClientConfig,
    model: String,
    vision_model: String,
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

impl GroqClient {
    pub fn new(config: CapabilityClientConfig, llm: &LlmConfig) -> Result<Self, CapabilityError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| CapabilityError::Http(e.to_string()))?;
        Ok(Self {
            client,
            config,
            model: llm.model.clone(),
            vision_model: llm.vision_model.clone(),
            temperature: llm.temperature,
        })
    }

    async fn complete_once(&self, request: &ChatRequest<'_>) -> Result<String, CapabilityError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| CapabilityError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CapabilityError::Api { status, body });
        }

        let text = response
            .text()
            .await
            .map_err(|e| CapabilityError::Http(e.to_string()))?;
        parse_completion(&text)
    }

    async fn complete(&self, label: &str, request: ChatRequest<'_>) -> Result<String, CapabilityError> {
        let policy = self.config.retry_policy();
        with_retry(&policy, label, || self.complete_once(&request)).await
    }
}

fn text_request<'a>(model: &'a str, prompt: &'a str, temperature: Option<f32>) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![ChatMessage {
            role: "user",
            content: MessageContent::Text(prompt),
        }],
        temperature,
    }
}

fn vision_request<'a>(model: &'a str, image_url: &'a str) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![ChatMessage {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::Text {
                    text: CAPTION_PROMPT,
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: image_url },
                },
            ]),
        }],
        temperature: None,
    }
}

/// Pull the first choice's text out of a completion response
fn parse_completion(text: &str) -> Result<String, CapabilityError> {
    let parsed: ChatResponse =
        serde_json::from_str(text).map_err(|e| CapabilityError::Parse(e.to_string()))?;

    if let Some(usage) = &parsed.usage {
        debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "completion usage"
        );
    }

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| CapabilityError::Parse("Missing choices".to_string()))
}

#[async_trait]
impl TextGenerator for GroqClient {
    async fn generate(&self, prompt: &str) -> Result<String, CapabilityError> {
        debug!(model = %self.model, prompt_len = prompt.len(), "generating");
        let request = text_request(&self.model, prompt, self.temperature);
        let content = self.complete("generate", request).await?;
        debug!(output_len = content.len(), "generation returned");
        Ok(content)
    }
}

#[async_trait]
impl ImageAnalyzer for GroqClient {
    async fn analyze(&self, image_url: &str) -> Result<String, CapabilityError> {
        debug!(model = %self.vision_model, image_url, "analyzing image");
        let request = vision_request(&self.vision_model, image_url);
        self.complete("analyze", request).await
    }
}
