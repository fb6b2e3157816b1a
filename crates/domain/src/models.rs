use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(String);

impl SiteId {
    pub fn new(s: impl Into<String>) -> Result<Self, StoreError> {
        let s = s.into();
        if s.is_empty() {
            return Err(StoreError::Validation("Site ID cannot be empty".into()));
        }
        if s.contains('_') {
            return Err(StoreError::Validation(
                "Site ID cannot contain underscores ('_'). Please use hyphens ('-') or dots ('.') instead.".into(),
            ));
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-')
        {
            return Err(StoreError::Validation(
                "Site ID contains invalid characters.".into(),
            ));
        }
        if s.len() > 64 {
            return Err(StoreError::Validation(
                "Site ID is too long (max 64 chars).".into(),
            ));
        }
        Ok(Self(s))
    }

    pub fn new_unchecked(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Pending,
    Approved,
    Rejected,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Pending => "pending",
            CommentStatus::Approved => "approved",
            CommentStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CommentStatus::Pending),
            "approved" => Ok(CommentStatus::Approved),
            "rejected" => Ok(CommentStatus::Rejected),
            other => Err(StoreError::Validation(format!(
                "unknown comment status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub site_id: SiteId,
    pub page_id: String,
    pub author: String,
    pub author_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub status: CommentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        site_id: SiteId,
        page_id: impl Into<String>,
        author: impl Into<String>,
        author_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            site_id,
            page_id: page_id.into(),
            author: author.into(),
            author_id: author_id.into(),
            author_email: None,
            text: text.into(),
            parent_id: None,
            status: CommentStatus::Pending,
            moderated_by: None,
            moderated_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    // 写入前的形状校验, 两个后端共用
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.id.is_empty() {
            return Err(StoreError::Validation("comment id is required".into()));
        }
        if self.page_id.is_empty() {
            return Err(StoreError::Validation("page id is required".into()));
        }
        if self.author_id.is_empty() {
            return Err(StoreError::Validation("author id is required".into()));
        }
        if self.text.is_empty() {
            return Err(StoreError::Validation("text is required".into()));
        }
        Ok(())
    }
}

pub fn top_level_only(comments: Vec<Comment>) -> Vec<Comment> {
    comments.into_iter().filter(Comment::is_top_level).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_id_rejects_underscore_and_uppercase() {
        assert!(SiteId::new("my_site").is_err());
        assert!(SiteId::new("MySite").is_err());
        assert!(SiteId::new("").is_err());
        assert!(SiteId::new("my-site.example").is_ok());
    }

    #[test]
    fn status_round_trips_through_str() {
        for s in ["pending", "approved", "rejected"] {
            assert_eq!(s.parse::<CommentStatus>().unwrap().as_str(), s);
        }
        assert!("flagged".parse::<CommentStatus>().is_err());
    }

    #[test]
    fn new_comment_defaults() {
        let c = Comment::new(
            SiteId::new_unchecked("blog"),
            "post-1",
            "Ada",
            "user-1",
            "hello",
        );
        assert_eq!(c.status, CommentStatus::Pending);
        assert!(c.parent_id.is_none());
        assert!(c.moderated_by.is_none());
        assert!(c.moderated_at.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn top_level_filter_drops_replies() {
        let site = SiteId::new_unchecked("blog");
        let a = Comment::new(site.clone(), "p", "Ada", "u1", "root");
        let mut b = Comment::new(site, "p", "Bob", "u2", "reply");
        b.parent_id = Some(a.id.clone());

        let kept = top_level_only(vec![a.clone(), b]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, a.id);
    }
}
