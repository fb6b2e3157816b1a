use domain::{CommentStatus, ModerationConfig, OpContext};
use tracing::{info, warn};

use crate::analyzer::Analyzer;
use crate::policy::decide;

// 提交管线: 分析 -> 阈值判定. 审核未启用或分析失败一律落到 Pending,
// 失败关闭 — 不确定时绝不自动放行
pub async fn screen(
    analyzer: &dyn Analyzer,
    ctx: &OpContext,
    text: &str,
    config: Option<&ModerationConfig>,
) -> CommentStatus {
    let Some(config) = config else {
        return CommentStatus::Pending;
    };
    if !config.enabled {
        return CommentStatus::Pending;
    }

    match analyzer.analyze(ctx, text, config).await {
        Ok(analysis) => {
            let status = decide(analysis.confidence, config);
            info!(
                decision = ?analysis.decision,
                confidence = analysis.confidence,
                reason = %analysis.reason,
                status = %status,
                "moderation analysis complete"
            );
            status
        }
        Err(e) => {
            warn!(error = %e, "moderation analysis failed; leaving comment pending");
            CommentStatus::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{Analysis, AnalysisError};
    use crate::rules::RuleAnalyzer;
    use async_trait::async_trait;

    struct FailingAnalyzer;

    #[async_trait]
    impl Analyzer for FailingAnalyzer {
        async fn analyze(
            &self,
            _ctx: &OpContext,
            _text: &str,
            _config: &ModerationConfig,
        ) -> Result<Analysis, AnalysisError> {
            Err(AnalysisError::Unreachable("connection refused".into()))
        }
    }

    fn enabled_config() -> ModerationConfig {
        ModerationConfig {
            enabled: true,
            ..ModerationConfig::default()
        }
    }

    #[tokio::test]
    async fn missing_or_disabled_config_stays_pending() {
        let analyzer = RuleAnalyzer::default();
        let ctx = OpContext::new();

        let status = screen(&analyzer, &ctx, "anything", None).await;
        assert_eq!(status, CommentStatus::Pending);

        let disabled = ModerationConfig::default();
        let status = screen(&analyzer, &ctx, "anything", Some(&disabled)).await;
        assert_eq!(status, CommentStatus::Pending);
    }

    #[tokio::test]
    async fn analyzer_failure_is_fail_closed() {
        let status = screen(
            &FailingAnalyzer,
            &OpContext::new(),
            "a perfectly fine comment",
            Some(&enabled_config()),
        )
        .await;
        assert_eq!(status, CommentStatus::Pending);
    }

    #[tokio::test]
    async fn clean_text_is_auto_approved() {
        let status = screen(
            &RuleAnalyzer::default(),
            &OpContext::new(),
            "Thanks, this helped me a lot.",
            Some(&enabled_config()),
        )
        .await;
        assert_eq!(status, CommentStatus::Approved);
    }

    #[tokio::test]
    async fn hostile_spam_is_auto_rejected() {
        // 0.3 (关键词) + 0.4 (脏话) + 0.5 (敌意短语) 封顶 1.0 >= 0.85
        let status = screen(
            &RuleAnalyzer::default(),
            &OpContext::new(),
            "Buy now you idiot, this shit offer won't last",
            Some(&enabled_config()),
        )
        .await;
        assert_eq!(status, CommentStatus::Rejected);
    }

    #[tokio::test]
    async fn mid_confidence_lands_in_review_queue() {
        // 只有敌意短语 0.5, 介于 0.30 与 0.85 之间
        let status = screen(
            &RuleAnalyzer::default(),
            &OpContext::new(),
            "shut up please",
            Some(&enabled_config()),
        )
        .await;
        assert_eq!(status, CommentStatus::Pending);
    }
}
