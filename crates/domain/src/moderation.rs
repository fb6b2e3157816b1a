use serde::{Deserialize, Serialize};

use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationConfig {
    pub enabled: bool,
    pub auto_reject_threshold: f64,
    pub auto_approve_threshold: f64,
    pub check_spam: bool,
    pub check_offensive: bool,
    pub check_aggressive: bool,
    pub check_off_topic: bool,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            auto_reject_threshold: 0.85,
            auto_approve_threshold: 0.30,
            check_spam: true,
            check_offensive: true,
            check_aggressive: true,
            check_off_topic: false,
        }
    }
}

impl ModerationConfig {
    // 阈值关系在写入时校验, 否则三个判定区间会重叠或留缝
    pub fn validate(&self) -> Result<(), StoreError> {
        for (name, v) in [
            ("auto_reject_threshold", self.auto_reject_threshold),
            ("auto_approve_threshold", self.auto_approve_threshold),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(StoreError::Validation(format!(
                    "{} must be within [0, 1], got {}",
                    name, v
                )));
            }
        }
        if self.auto_approve_threshold > self.auto_reject_threshold {
            return Err(StoreError::Validation(format!(
                "auto_approve_threshold ({}) must not exceed auto_reject_threshold ({})",
                self.auto_approve_threshold, self.auto_reject_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_defaults() {
        let cfg = ModerationConfig::default();
        assert!(!cfg.enabled);
        assert_eq!(cfg.auto_reject_threshold, 0.85);
        assert_eq!(cfg.auto_approve_threshold, 0.30);
        assert!(cfg.check_spam);
        assert!(cfg.check_offensive);
        assert!(cfg.check_aggressive);
        assert!(!cfg.check_off_topic);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_inverted_thresholds() {
        let cfg = ModerationConfig {
            auto_reject_threshold: 0.2,
            auto_approve_threshold: 0.8,
            ..ModerationConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(StoreError::Validation(_))));
    }

    #[test]
    fn validate_rejects_out_of_range() {
        let cfg = ModerationConfig {
            auto_reject_threshold: 1.5,
            ..ModerationConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = ModerationConfig {
            auto_approve_threshold: -0.1,
            ..ModerationConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
