use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::StoreError;

// 每个端口操作都带一个 OpContext: 取消或超时后 I/O 立刻中止,
// 返回 Canceled 而不是半截数据
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl OpContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_canceled(&self) -> bool {
        self.cancel.is_cancelled()
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    // None 表示操作被取消/超时打断; 包裹的 future 被丢弃, 不返回半截数据
    pub async fn run<T, F>(&self, fut: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        if self.is_canceled() {
            return None;
        }
        let deadline = self.deadline;
        let expired = async move {
            match deadline {
                Some(d) => tokio::time::sleep_until(d).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            _ = self.cancel.cancelled() => None,
            _ = expired => None,
            r = fut => Some(r),
        }
    }

    pub async fn guard<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match self.run(fut).await {
            Some(result) => result,
            None => Err(StoreError::Canceled),
        }
    }
}
