use domain::{CommentStatus, ReactionTarget, SiteId};

// 扁平键空间: 每个实体一份自包含 JSON 文档, 列表查询走应用维护的 zset 索引

pub fn comment(id: &str) -> String {
    format!("comment:{}", id)
}

pub fn site(site: &SiteId) -> String {
    format!("site:{}", site)
}

// 页面文档按页面 ID 单独成键, 反应目标只带页面 ID 也能做存在性检查
pub fn page(id: &str) -> String {
    format!("page:{}", id)
}

pub fn page_index(site: &SiteId, page: &str) -> String {
    format!("idx:page-comments:{}:{}", site, page)
}

pub fn site_index(site: &SiteId) -> String {
    format!("idx:site-comments:{}", site)
}

pub fn status_index(site: &SiteId, status: CommentStatus) -> String {
    format!("idx:site-status:{}:{}", site, status)
}

pub fn reactions(target: &ReactionTarget) -> String {
    format!("reactions:{}", target)
}

pub fn allowed_reaction(id: &str) -> String {
    format!("allowed-reaction:{}", id)
}

pub fn allowed_index(site: &SiteId) -> String {
    format!("idx:allowed-reactions:{}", site)
}

pub fn moderation_config(site: &SiteId) -> String {
    format!("moderation-config:{}", site)
}
