use std::sync::Arc;
use std::time::Duration;

use domain::OpContext;
use moderation::Analyzer;
use storage::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub analyzer: Arc<dyn Analyzer>,
    pub request_timeout: Duration,
}

impl AppState {
    // 每个请求一个新的取消上下文, 超时即中止后端 I/O
    pub fn ctx(&self) -> OpContext {
        OpContext::with_timeout(self.request_timeout)
    }
}
