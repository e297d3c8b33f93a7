use crate::error::{Result, SummaristError};
use crate::models::ContentSource;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

pub const SYSTEM_INSTRUCTION: &str =
    "You are an AI assistant specializing in summarization and insights.";

/// Longest input sent to the model, in bytes
pub const DEFAULT_MAX_INPUT_CHARS: usize = 100_000;

/// Anything that turns a prompt into generated text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Build the user prompt for a piece of extracted content.
pub fn build_prompt(source: &ContentSource, text: &str) -> String {
    if source.is_file() {
        format!(
            "Summarize the following content extracted from a file:\n\n{}",
            text
        )
    } else {
        format!("Summarize the following text:\n\n{}", text)
    }
}

/// Fixed sampling parameters sent with every request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
            response_mime_type: "text/plain".to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    system_instruction: InstructionContent<'a>,
    contents: Vec<RequestContent<'a>>,
    generation_config: &'a GenerationConfig,
}

#[derive(Serialize)]
struct InstructionContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

pub struct GeminiSummarizer {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    generation_config: GenerationConfig,
    max_input_chars: usize,
}

impl GeminiSummarizer {
    pub fn new(api_key: String, model: String, base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| SummaristError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            generation_config: GenerationConfig::default(),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        })
    }

    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    async fn try_generate(&self, prompt: &str) -> Result<String> {
        let prompt = truncate_to_boundary(prompt, self.max_input_chars);

        let request = GeminiRequest {
            system_instruction: InstructionContent {
                parts: vec![RequestPart {
                    text: SYSTEM_INSTRUCTION,
                }],
            },
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: &self.generation_config,
        };

        tracing::debug!(
            "Sending {} chars to {} ({})",
            prompt.len(),
            self.model,
            self.endpoint()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                SummaristError::Generation(format!("Failed to send request to Gemini API: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(SummaristError::Generation(format!(
                    "quota exceeded: {}",
                    error_text
                )));
            }
            return Err(SummaristError::Generation(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let gemini_response = response.json::<GeminiResponse>().await.map_err(|e| {
            SummaristError::Generation(format!("Failed to parse Gemini API response: {}", e))
        })?;

        let summary_text: String = gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if summary_text.trim().is_empty() {
            return Err(SummaristError::Generation(
                "Gemini API returned no text".to_string(),
            ));
        }

        Ok(summary_text)
    }
}

#[async_trait]
impl TextGenerator for GeminiSummarizer {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let result = self.try_generate(prompt).await;
        if let Err(e) = &result {
            tracing::warn!("Summary generation failed: {}", e);
        }
        result
    }
}

/// Truncate to at most `max` bytes, respecting UTF-8 boundaries.
fn truncate_to_boundary(content: &str, max: usize) -> &str {
    if content.len() <= max {
        return content;
    }
    let mut end = max;
    while end > 0 && !content.is_char_boundary(end) {
        end -= 1;
    }
    &content[..end]
}
