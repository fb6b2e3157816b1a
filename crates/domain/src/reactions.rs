use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;
use crate::models::SiteId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Applicability {
    Comment,
    Page,
    Both,
}

impl Applicability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Applicability::Comment => "comment",
            Applicability::Page => "page",
            Applicability::Both => "both",
        }
    }
}

impl fmt::Display for Applicability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Applicability {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comment" => Ok(Applicability::Comment),
            "page" => Ok(Applicability::Page),
            "both" => Ok(Applicability::Both),
            other => Err(StoreError::Validation(format!(
                "unknown reaction applicability: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowedReaction {
    pub id: String,
    pub site_id: SiteId,
    pub name: String,
    pub emoji: String,
    pub applies_to: Applicability,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AllowedReaction {
    pub fn new(
        site_id: SiteId,
        name: impl Into<String>,
        emoji: impl Into<String>,
        applies_to: Applicability,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            site_id,
            name: name.into(),
            emoji: emoji.into(),
            applies_to,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.name.is_empty() {
            return Err(StoreError::Validation("reaction name is required".into()));
        }
        if self.emoji.is_empty() {
            return Err(StoreError::Validation("reaction emoji is required".into()));
        }
        Ok(())
    }
}

// 反应目标要么是评论要么是页面, XOR 约束直接编码进类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "id")]
pub enum ReactionTarget {
    Comment(String),
    Page(String),
}

impl ReactionTarget {
    pub fn id(&self) -> &str {
        match self {
            ReactionTarget::Comment(id) | ReactionTarget::Page(id) => id,
        }
    }
}

impl fmt::Display for ReactionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReactionTarget::Comment(id) => write!(f, "comment:{}", id),
            ReactionTarget::Page(id) => write!(f, "page:{}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: String,
    #[serde(flatten)]
    pub target: ReactionTarget,
    pub allowed_reaction_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCount {
    pub name: String,
    pub emoji: String,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleOutcome {
    Added,
    Removed,
}
