use async_trait::async_trait;
use chrono::Utc;
use domain::{ModerationConfig, OpContext};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::analyzer::{Analysis, AnalysisError, Analyzer, Category, Decision};

#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gpt-3.5-turbo".to_string(),
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct OpenAiAnalyzer {
    settings: OpenAiSettings,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Deserialize)]
struct Verdict {
    confidence: f64,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    categories: Vec<String>,
}

impl OpenAiAnalyzer {
    pub fn new(settings: OpenAiSettings) -> Result<Self, AnalysisError> {
        if settings.api_key.is_empty() {
            return Err(AnalysisError::Configuration(
                "OpenAI API key is not configured".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| AnalysisError::Configuration(e.to_string()))?;
        Ok(Self { settings, client })
    }

    // 提示词只列出站点启用的类别
    fn build_prompt(text: &str, config: &ModerationConfig) -> String {
        let mut checks = Vec::new();
        if config.check_spam {
            checks.push("spam");
        }
        if config.check_offensive {
            checks.push("offensive language");
        }
        if config.check_aggressive {
            checks.push("aggressive or hostile tone");
        }
        if config.check_off_topic {
            checks.push("off-topic content");
        }

        format!(
            r#"Analyze the following comment for: {}.

Comment: "{}"

Respond with a JSON object in this exact format:
{{
  "confidence": <number between 0 and 1, where 1 means definitely problematic>,
  "reason": "<brief explanation>",
  "categories": [<list of detected issues from: "spam", "offensive", "aggressive", "off_topic">]
}}

Be strict but fair. Only flag content that clearly violates standards."#,
            checks.join(", "),
            text
        )
    }

    // 模型输出常夹带自由文本; 只取第一个 '{' 到最后一个 '}' 的片段解析
    fn extract_verdict(content: &str) -> Result<Verdict, AnalysisError> {
        let start = content
            .find('{')
            .ok_or_else(|| AnalysisError::Malformed("no JSON found in response".into()))?;
        let end = content
            .rfind('}')
            .ok_or_else(|| AnalysisError::Malformed("no JSON found in response".into()))?;
        if end < start {
            return Err(AnalysisError::Malformed("no JSON found in response".into()));
        }
        serde_json::from_str(&content[start..=end])
            .map_err(|e| AnalysisError::Malformed(format!("failed to parse JSON: {}", e)))
    }

    async fn call(
        &self,
        text: &str,
        config: &ModerationConfig,
    ) -> Result<Analysis, AnalysisError> {
        let prompt = Self::build_prompt(text, config);
        let request = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are a content moderation assistant. Analyze the provided \
                              comment and respond with a JSON object containing your analysis.",
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalysisError::Unreachable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::Unreachable(e.to_string()))?;

        if !status.is_success() {
            return Err(AnalysisError::Unreachable(format!(
                "analysis endpoint returned {}",
                status
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| AnalysisError::Malformed(format!("failed to parse response: {}", e)))?;
        if let Some(api_error) = parsed.error {
            return Err(AnalysisError::Unreachable(format!(
                "analysis endpoint error: {}",
                api_error.message
            )));
        }
        let content = &parsed
            .choices
            .first()
            .ok_or_else(|| AnalysisError::Malformed("no choices in response".into()))?
            .message
            .content;

        let verdict = Self::extract_verdict(content)?;
        let confidence = verdict.confidence.clamp(0.0, 1.0);
        let categories = verdict
            .categories
            .iter()
            .filter_map(|s| {
                let parsed = Category::parse_lenient(s);
                if parsed.is_none() {
                    warn!(category = %s, "analysis returned an unknown category label");
                }
                parsed
            })
            .collect();

        Ok(Analysis {
            decision: Decision::from_confidence(confidence),
            confidence,
            reason: verdict.reason,
            categories,
            analyzed_at: Utc::now(),
        })
    }
}

#[async_trait]
impl Analyzer for OpenAiAnalyzer {
    async fn analyze(
        &self,
        ctx: &OpContext,
        text: &str,
        config: &ModerationConfig,
    ) -> Result<Analysis, AnalysisError> {
        match ctx.run(self.call(text, config)).await {
            Some(result) => result,
            None => Err(AnalysisError::Canceled),
        }
    }
}
