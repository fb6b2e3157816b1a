use async_trait::async_trait;
use domain::{
    AllowedReaction, Comment, CommentStatus, ModerationConfig, OpContext, Reaction, ReactionCount,
    ReactionTarget, SiteId, StoreError, ToggleOutcome,
};

// 后端无关的持久化契约. 两个适配器必须呈现一致的可观测语义:
// 按 ID 的点查是强一致的; 文档后端的过滤列表查询允许二级索引滞后.
#[async_trait]
pub trait Store: Send + Sync {
    async fn add_comment(&self, ctx: &OpContext, comment: &Comment) -> Result<(), StoreError>;

    // 升序 (旧的在前), 适合自顶向下渲染评论串
    async fn page_comments(
        &self,
        ctx: &OpContext,
        site: &SiteId,
        page: &str,
    ) -> Result<Vec<Comment>, StoreError>;

    // 降序 (新的在前), 适合审核队列
    async fn comments_by_site(
        &self,
        ctx: &OpContext,
        site: &SiteId,
        status: Option<CommentStatus>,
    ) -> Result<Vec<Comment>, StoreError>;

    async fn comment_by_id(&self, ctx: &OpContext, id: &str) -> Result<Comment, StoreError>;

    async fn update_comment_status(
        &self,
        ctx: &OpContext,
        id: &str,
        status: CommentStatus,
        moderator_id: &str,
    ) -> Result<(), StoreError>;

    async fn update_comment_text(
        &self,
        ctx: &OpContext,
        id: &str,
        text: &str,
    ) -> Result<(), StoreError>;

    async fn delete_comment(&self, ctx: &OpContext, id: &str) -> Result<(), StoreError>;

    async fn comment_site_id(&self, ctx: &OpContext, id: &str) -> Result<SiteId, StoreError>;

    async fn toggle_reaction(
        &self,
        ctx: &OpContext,
        target: &ReactionTarget,
        allowed_reaction_id: &str,
        user_id: &str,
    ) -> Result<ToggleOutcome, StoreError>;

    async fn reactions_for(
        &self,
        ctx: &OpContext,
        target: &ReactionTarget,
    ) -> Result<Vec<Reaction>, StoreError>;

    async fn reaction_counts(
        &self,
        ctx: &OpContext,
        target: &ReactionTarget,
    ) -> Result<Vec<ReactionCount>, StoreError>;

    async fn create_allowed_reaction(
        &self,
        ctx: &OpContext,
        reaction: &AllowedReaction,
    ) -> Result<(), StoreError>;

    async fn allowed_reactions(
        &self,
        ctx: &OpContext,
        site: &SiteId,
    ) -> Result<Vec<AllowedReaction>, StoreError>;

    async fn delete_allowed_reaction(&self, ctx: &OpContext, id: &str) -> Result<(), StoreError>;

    async fn put_moderation_config(
        &self,
        ctx: &OpContext,
        site: &SiteId,
        config: &ModerationConfig,
    ) -> Result<(), StoreError>;

    async fn moderation_config(
        &self,
        ctx: &OpContext,
        site: &SiteId,
    ) -> Result<Option<ModerationConfig>, StoreError>;

    async fn delete_moderation_config(
        &self,
        ctx: &OpContext,
        site: &SiteId,
    ) -> Result<(), StoreError>;

    // 站点级联删除: 关系型靠外键, 文档型靠应用层逐键清理
    async fn delete_site(&self, ctx: &OpContext, site: &SiteId) -> Result<(), StoreError>;
}
