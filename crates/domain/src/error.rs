use thiserror::Error;

// 后端原生错误不许越过 Store 端口, 统一翻译成这套分类
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    // 瞬态的 I/O / 网络故障, 调用方可重试
    #[error("backend unavailable: {0}")]
    Transient(String),

    #[error("configuration: {0}")]
    Configuration(String),

    #[error("operation canceled")]
    Canceled,
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        StoreError::NotFound(what.into())
    }
}
