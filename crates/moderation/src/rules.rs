use async_trait::async_trait;
use chrono::Utc;
use domain::{ModerationConfig, OpContext};

use crate::analyzer::{Analysis, AnalysisError, Analyzer, Category, Decision};

// 规则表全部外部注入, 分析器本身不藏任何词表, 方便独立测试
#[derive(Debug, Clone)]
pub struct RuleTables {
    pub spam_keywords: Vec<String>,
    pub spam_keyword_weight: f64,
    pub max_links: usize,
    pub link_weight: f64,
    pub profanity: Vec<String>,
    pub profanity_weight: f64,
    pub hostile_phrases: Vec<String>,
    pub hostile_weight: f64,
    pub caps_ratio: f64,
    pub caps_min_len: usize,
    pub caps_weight: f64,
}

impl Default for RuleTables {
    fn default() -> Self {
        let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            spam_keywords: list(&[
                "buy now",
                "click here",
                "limited offer",
                "act now",
                "viagra",
                "casino",
                "lottery",
                "prize",
            ]),
            spam_keyword_weight: 0.3,
            max_links: 2,
            link_weight: 0.2,
            profanity: list(&["fuck", "shit", "damn", "ass", "bitch", "bastard", "crap"]),
            profanity_weight: 0.4,
            hostile_phrases: list(&[
                "you're stupid",
                "you idiot",
                "shut up",
                "you're wrong",
                "you suck",
            ]),
            hostile_weight: 0.5,
            caps_ratio: 0.7,
            caps_min_len: 10,
            caps_weight: 0.3,
        }
    }
}

// 确定性的规则打分器, 无 I/O, 永不失败
#[derive(Debug, Clone, Default)]
pub struct RuleAnalyzer {
    tables: RuleTables,
}

impl RuleAnalyzer {
    pub fn new(tables: RuleTables) -> Self {
        Self { tables }
    }

    fn score(&self, text: &str, config: &ModerationConfig) -> (f64, Vec<Category>) {
        let t = &self.tables;
        let lower = text.to_lowercase();
        let mut confidence = 0.0;
        let mut categories = Vec::new();

        if config.check_spam {
            if t.spam_keywords.iter().any(|kw| lower.contains(kw.as_str())) {
                categories.push(Category::Spam);
                confidence += t.spam_keyword_weight;
            }
            let links = text.matches("http://").count() + text.matches("https://").count();
            if links > t.max_links {
                categories.push(Category::Spam);
                confidence += t.link_weight;
            }
        }

        if config.check_offensive
            && t.profanity.iter().any(|w| lower.contains(w.as_str()))
        {
            categories.push(Category::Offensive);
            confidence += t.profanity_weight;
        }

        if config.check_aggressive {
            if t
                .hostile_phrases
                .iter()
                .any(|p| lower.contains(p.as_str()))
            {
                categories.push(Category::Aggressive);
                confidence += t.hostile_weight;
            }

            let total = text.chars().count();
            if total > t.caps_min_len {
                let caps = text.chars().filter(|c| c.is_ascii_uppercase()).count();
                if caps as f64 / total as f64 > t.caps_ratio {
                    categories.push(Category::Aggressive);
                    confidence += t.caps_weight;
                }
            }
        }

        (confidence.min(1.0), categories)
    }
}

#[async_trait]
impl Analyzer for RuleAnalyzer {
    async fn analyze(
        &self,
        _ctx: &OpContext,
        text: &str,
        config: &ModerationConfig,
    ) -> Result<Analysis, AnalysisError> {
        let (confidence, categories) = self.score(text, config);

        let decision = Decision::from_confidence(confidence);
        let reason = match decision {
            Decision::Reject => "Content appears to be problematic",
            Decision::Flag => "Content may need review",
            Decision::Approve => "No issues detected",
        };

        Ok(Analysis {
            decision,
            confidence,
            reason: reason.to_string(),
            categories,
            analyzed_at: Utc::now(),
        })
    }
}
