use std::sync::Arc;

use domain::StoreError;
use serde::Deserialize;

mod doc;
mod port;
mod sqlite;

pub use doc::DocStore;
pub use port::Store;
pub use sqlite::SqliteStore;

// 后端选择: 关系型 (SQLite) 或文档型 (Redis)
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum StorageSettings {
    Sqlite { url: String },
    Document { url: String },
}

pub async fn connect(settings: &StorageSettings) -> Result<Arc<dyn Store>, StoreError> {
    match settings {
        StorageSettings::Sqlite { url } => {
            if url.is_empty() {
                return Err(StoreError::Configuration("sqlite url is required".into()));
            }
            Ok(Arc::new(SqliteStore::new(url).await?))
        }
        StorageSettings::Document { url } => {
            if url.is_empty() {
                return Err(StoreError::Configuration("redis url is required".into()));
            }
            Ok(Arc::new(DocStore::new(url).await?))
        }
    }
}
