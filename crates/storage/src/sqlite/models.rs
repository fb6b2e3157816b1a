use chrono::{DateTime, Utc};
use domain::{
    AllowedReaction, Applicability, Comment, ModerationConfig, Reaction, ReactionTarget, SiteId,
    StoreError,
};
use sqlx::FromRow;

#[derive(FromRow)]
pub struct SqlComment {
    pub id: String,
    pub site_id: String,
    pub page_id: String,
    pub author: String,
    pub author_id: String,
    pub author_email: Option<String>,
    pub text: String,
    pub parent_id: Option<String>,
    pub status: String,
    pub moderated_by: Option<String>,
    pub moderated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SqlComment> for Comment {
    type Error = StoreError;

    // 存量行里出现未知状态按 Validation 处理, 不允许 panic 或悄悄矫正
    fn try_from(row: SqlComment) -> Result<Self, Self::Error> {
        Ok(Comment {
            id: row.id,
            site_id: SiteId::new_unchecked(row.site_id),
            page_id: row.page_id,
            author: row.author,
            author_id: row.author_id,
            author_email: row.author_email,
            text: row.text,
            parent_id: row.parent_id,
            status: row.status.parse()?,
            moderated_by: row.moderated_by,
            moderated_at: row.moderated_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
pub struct SqlAllowedReaction {
    pub id: String,
    pub site_id: String,
    pub name: String,
    pub emoji: String,
    pub applies_to: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SqlAllowedReaction> for AllowedReaction {
    type Error = StoreError;

    fn try_from(row: SqlAllowedReaction) -> Result<Self, Self::Error> {
        Ok(AllowedReaction {
            id: row.id,
            site_id: SiteId::new_unchecked(row.site_id),
            name: row.name,
            emoji: row.emoji,
            applies_to: row.applies_to.parse::<Applicability>()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
pub struct SqlReaction {
    pub id: String,
    pub page_id: Option<String>,
    pub comment_id: Option<String>,
    pub allowed_reaction_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SqlReaction> for Reaction {
    type Error = StoreError;

    fn try_from(row: SqlReaction) -> Result<Self, Self::Error> {
        let target = match (row.comment_id, row.page_id) {
            (Some(id), None) => ReactionTarget::Comment(id),
            (None, Some(id)) => ReactionTarget::Page(id),
            _ => {
                return Err(StoreError::Validation(format!(
                    "reaction {} violates the comment/page XOR constraint",
                    row.id
                )))
            }
        };
        Ok(Reaction {
            id: row.id,
            target,
            allowed_reaction_id: row.allowed_reaction_id,
            user_id: row.user_id,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
pub struct SqlModerationConfig {
    pub enabled: bool,
    pub auto_reject_threshold: f64,
    pub auto_approve_threshold: f64,
    pub check_spam: bool,
    pub check_offensive: bool,
    pub check_aggressive: bool,
    pub check_off_topic: bool,
}

impl From<SqlModerationConfig> for ModerationConfig {
    fn from(row: SqlModerationConfig) -> Self {
        ModerationConfig {
            enabled: row.enabled,
            auto_reject_threshold: row.auto_reject_threshold,
            auto_approve_threshold: row.auto_approve_threshold,
            check_spam: row.check_spam,
            check_offensive: row.check_offensive,
            check_aggressive: row.check_aggressive,
            check_off_topic: row.check_off_topic,
        }
    }
}
