use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Shown from first render until a generated insight replaces it; kept for
/// good if generation fails.
pub const INSIGHT_PLACEHOLDER: &str = "טוען דבר תורה...";

const INSIGHT_PROMPT: &str = "אתה רב קהילה המכין דבר תורה קצר ללוח מודעות של בית כנסת. \
כתוב דבר תורה של שלושה עד ארבעה משפטים על פרשת השבוע שתינתן לך, בעברית פשוטה וחמה, \
מתאים לקריאה על מסך בלובי. ללא הקדמות וללא חתימה — הטקסט בלבד.";

const INSIGHT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InsightProvider {
    None,
    OpenAi,
    Claude,
}

/// Which text-generation service writes the daily insight. Comes from the
/// environment so a deployment can switch services without touching the
/// persisted schedule settings.
#[derive(Debug, Clone)]
pub struct InsightSettings {
    pub provider: InsightProvider,
    pub api_key: String,
    pub model: String,
}

impl InsightSettings {
    pub fn from_env() -> Self {
        let provider = match std::env::var("LUACH_INSIGHT_PROVIDER").as_deref() {
            Ok("openai") => InsightProvider::OpenAi,
            Ok("claude") => InsightProvider::Claude,
            _ => InsightProvider::None,
        };
        let api_key = std::env::var("LUACH_INSIGHT_API_KEY").unwrap_or_default();
        let model = std::env::var("LUACH_INSIGHT_MODEL").unwrap_or_else(|_| {
            match provider {
                InsightProvider::Claude => "claude-sonnet-4-20250514",
                _ => "gpt-4o-mini",
            }
            .to_string()
        });
        Self {
            provider,
            api_key,
            model,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("no insight provider configured")]
    NotConfigured,

    #[error("API key not set")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("insight service returned status {0}: {1}")]
    Status(reqwest::StatusCode, String),

    #[error("no text in provider response")]
    MissingContent,
}

/// Source of the daily d'var torah. The production implementation is the
/// HTTP client below; tests substitute stubs.
#[allow(async_fn_in_trait)]
pub trait InsightSource {
    async fn generate(&self, parasha: &str, hebrew_date: &str) -> Result<String, InsightError>;
}

pub struct InsightClient {
    client: Client,
    settings: InsightSettings,
}

impl InsightClient {
    pub fn new(client: Client, settings: InsightSettings) -> Self {
        Self { client, settings }
    }

    /// OpenAI Chat Completions API
    async fn generate_openai(&self, request: &str) -> Result<String, InsightError> {
        if self.settings.api_key.is_empty() {
            return Err(InsightError::MissingApiKey);
        }

        let body = serde_json::json!({
            "model": self.settings.model,
            "messages": [
                { "role": "system", "content": INSIGHT_PROMPT },
                { "role": "user", "content": request }
            ],
            "temperature": 0.7
        });

        let resp = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.settings.api_key))
            .json(&body)
            .timeout(INSIGHT_TIMEOUT)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(InsightError::Status(status, body));
        }

        let json: Value = resp.json().await?;
        extract_openai_text(&json)
    }

    /// Anthropic Messages API
    async fn generate_claude(&self, request: &str) -> Result<String, InsightError> {
        if self.settings.api_key.is_empty() {
            return Err(InsightError::MissingApiKey);
        }

        let body = serde_json::json!({
            "model": self.settings.model,
            "max_tokens": 1024,
            "system": INSIGHT_PROMPT,
            "messages": [
                { "role": "user", "content": request }
            ],
            "temperature": 0.7
        });

        let resp = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .timeout(INSIGHT_TIMEOUT)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(InsightError::Status(status, body));
        }

        let json: Value = resp.json().await?;
        extract_claude_text(&json)
    }
}

impl InsightSource for InsightClient {
    /// Generate a short d'var torah for the week's parasha. The result is
    /// supplementary; callers keep the placeholder on any error.
    async fn generate(&self, parasha: &str, hebrew_date: &str) -> Result<String, InsightError> {
        let request = format!("פרשת {}, {}", parasha, hebrew_date);
        match self.settings.provider {
            InsightProvider::None => Err(InsightError::NotConfigured),
            InsightProvider::OpenAi => self.generate_openai(&request).await,
            InsightProvider::Claude => self.generate_claude(&request).await,
        }
    }
}

fn extract_openai_text(json: &Value) -> Result<String, InsightError> {
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or(InsightError::MissingContent)
}

fn extract_claude_text(json: &Value) -> Result<String, InsightError> {
    json["content"][0]["text"]
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or(InsightError::MissingContent)
}
