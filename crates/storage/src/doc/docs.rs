use chrono::{DateTime, Utc};
use domain::{SiteId, StoreError};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

// 首次写入时补建的占位父文档; 内容恒定, 重复 SET 幂等
#[derive(Debug, Serialize, Deserialize)]
pub struct SiteDoc {
    pub id: SiteId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SiteDoc {
    pub fn placeholder(site: &SiteId, at: DateTime<Utc>) -> Self {
        Self {
            id: site.clone(),
            name: site.to_string(),
            created_at: at,
            updated_at: at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PageDoc {
    pub id: String,
    pub site_id: SiteId,
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PageDoc {
    pub fn placeholder(site: &SiteId, page: &str, at: DateTime<Utc>) -> Self {
        Self {
            id: page.to_string(),
            site_id: site.clone(),
            path: page.to_string(),
            created_at: at,
            updated_at: at,
        }
    }
}

pub fn encode<T: Serialize>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value)
        .map_err(|e| StoreError::Validation(format!("failed to encode document: {}", e)))
}

pub fn decode<T: DeserializeOwned>(json: &str) -> Result<T, StoreError> {
    serde_json::from_str(json)
        .map_err(|e| StoreError::Validation(format!("malformed document: {}", e)))
}
