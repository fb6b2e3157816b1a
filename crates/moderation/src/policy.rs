use domain::{CommentStatus, ModerationConfig};

// 阈值到发布状态的三段映射, 边界含等号.
// 调用前置条件: config 已通过 validate(), approve <= reject
pub fn decide(confidence: f64, config: &ModerationConfig) -> CommentStatus {
    if confidence >= config.auto_reject_threshold {
        CommentStatus::Rejected
    } else if confidence <= config.auto_approve_threshold {
        CommentStatus::Approved
    } else {
        CommentStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(approve: f64, reject: f64) -> ModerationConfig {
        ModerationConfig {
            enabled: true,
            auto_approve_threshold: approve,
            auto_reject_threshold: reject,
            ..ModerationConfig::default()
        }
    }

    #[test]
    fn default_thresholds_three_regions() {
        let cfg = config(0.30, 0.85);
        assert_eq!(decide(0.9, &cfg), CommentStatus::Rejected);
        assert_eq!(decide(0.5, &cfg), CommentStatus::Pending);
        assert_eq!(decide(0.2, &cfg), CommentStatus::Approved);
    }

    #[test]
    fn boundaries_are_inclusive() {
        let cfg = config(0.30, 0.85);
        assert_eq!(decide(0.85, &cfg), CommentStatus::Rejected);
        assert_eq!(decide(0.30, &cfg), CommentStatus::Approved);
    }

    #[test]
    fn total_over_the_unit_interval() {
        let cfg = config(0.30, 0.85);
        let mut c = 0.0;
        while c <= 1.0 {
            // 任意置信度都必须落进三个区间之一, 不会 panic
            let _ = decide(c, &cfg);
            c += 0.01;
        }
    }

    #[test]
    fn equal_thresholds_leave_no_pending_region() {
        let cfg = config(0.5, 0.5);
        assert_eq!(decide(0.5, &cfg), CommentStatus::Rejected);
        assert_eq!(decide(0.49, &cfg), CommentStatus::Approved);
        assert_eq!(decide(0.51, &cfg), CommentStatus::Rejected);
    }
}
