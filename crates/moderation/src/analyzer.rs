use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{ModerationConfig, OpContext};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// 分析失败必须显式上抛, 不许退化成置信度 0 的"正常"结果
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analysis backend is not configured: {0}")]
    Configuration(String),

    #[error("analysis backend unreachable: {0}")]
    Unreachable(String),

    #[error("analysis backend returned malformed output: {0}")]
    Malformed(String),

    #[error("analysis canceled")]
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Spam,
    Offensive,
    Aggressive,
    OffTopic,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Spam => "spam",
            Category::Offensive => "offensive",
            Category::Aggressive => "aggressive",
            Category::OffTopic => "off_topic",
        }
    }

    // 外部模型输出宽容解析, 未知标签由调用方丢弃
    pub fn parse_lenient(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spam" => Some(Category::Spam),
            "offensive" => Some(Category::Offensive),
            "aggressive" => Some(Category::Aggressive),
            "off_topic" | "off-topic" | "offtopic" => Some(Category::OffTopic),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Flag,
    Reject,
}

impl Decision {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.7 {
            Decision::Reject
        } else if confidence <= 0.3 {
            Decision::Approve
        } else {
            Decision::Flag
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub decision: Decision,
    pub confidence: f64,
    pub reason: String,
    pub categories: Vec<Category>,
    pub analyzed_at: DateTime<Utc>,
}

#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(
        &self,
        ctx: &OpContext,
        text: &str,
        config: &ModerationConfig,
    ) -> Result<Analysis, AnalysisError>;
}
