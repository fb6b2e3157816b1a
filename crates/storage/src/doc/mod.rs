use async_trait::async_trait;
use domain::{
    AllowedReaction, Comment, CommentStatus, ModerationConfig, OpContext, Reaction, ReactionCount,
    ReactionTarget, SiteId, StoreError, ToggleOutcome,
};
use redis::aio::MultiplexedConnection;

use crate::port::Store;

mod comments;
mod docs;
mod keys;
mod moderation_cfg;
mod reactions;
mod sites;

// 文档后端: 按 ID 点查是强一致的 (单键读写); 过滤列表走应用维护的
// zset 索引, 允许短暂滞后
#[derive(Clone)]
pub struct DocStore {
    pub(crate) con: MultiplexedConnection,
}

impl DocStore {
    pub async fn new(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| StoreError::Configuration(format!("invalid redis url: {}", e)))?;
        let con = client
            .get_multiplexed_async_connection()
            .await
            .map_err(store_err)?;
        Ok(Self { con })
    }
}

pub(crate) fn store_err(e: redis::RedisError) -> StoreError {
    StoreError::Transient(e.to_string())
}

#[async_trait]
impl Store for DocStore {
    async fn add_comment(&self, ctx: &OpContext, comment: &Comment) -> Result<(), StoreError> {
        ctx.guard(self.insert_comment(comment)).await
    }

    async fn page_comments(
        &self,
        ctx: &OpContext,
        site: &SiteId,
        page: &str,
    ) -> Result<Vec<Comment>, StoreError> {
        ctx.guard(self.list_page_comments(site, page)).await
    }

    async fn comments_by_site(
        &self,
        ctx: &OpContext,
        site: &SiteId,
        status: Option<CommentStatus>,
    ) -> Result<Vec<Comment>, StoreError> {
        ctx.guard(self.list_site_comments(site, status)).await
    }

    async fn comment_by_id(&self, ctx: &OpContext, id: &str) -> Result<Comment, StoreError> {
        ctx.guard(self.get_comment(id)).await
    }

    async fn update_comment_status(
        &self,
        ctx: &OpContext,
        id: &str,
        status: CommentStatus,
        moderator_id: &str,
    ) -> Result<(), StoreError> {
        ctx.guard(self.set_comment_status(id, status, moderator_id))
            .await
    }

    async fn update_comment_text(
        &self,
        ctx: &OpContext,
        id: &str,
        text: &str,
    ) -> Result<(), StoreError> {
        ctx.guard(self.set_comment_text(id, text)).await
    }

    async fn delete_comment(&self, ctx: &OpContext, id: &str) -> Result<(), StoreError> {
        ctx.guard(self.remove_comment(id)).await
    }

    async fn comment_site_id(&self, ctx: &OpContext, id: &str) -> Result<SiteId, StoreError> {
        ctx.guard(self.site_id_of(id)).await
    }

    async fn toggle_reaction(
        &self,
        ctx: &OpContext,
        target: &ReactionTarget,
        allowed_reaction_id: &str,
        user_id: &str,
    ) -> Result<ToggleOutcome, StoreError> {
        ctx.guard(self.toggle(target, allowed_reaction_id, user_id))
            .await
    }

    async fn reactions_for(
        &self,
        ctx: &OpContext,
        target: &ReactionTarget,
    ) -> Result<Vec<Reaction>, StoreError> {
        ctx.guard(self.list_reactions(target)).await
    }

    async fn reaction_counts(
        &self,
        ctx: &OpContext,
        target: &ReactionTarget,
    ) -> Result<Vec<ReactionCount>, StoreError> {
        ctx.guard(self.count_reactions(target)).await
    }

    async fn create_allowed_reaction(
        &self,
        ctx: &OpContext,
        reaction: &AllowedReaction,
    ) -> Result<(), StoreError> {
        ctx.guard(self.insert_allowed_reaction(reaction)).await
    }

    async fn allowed_reactions(
        &self,
        ctx: &OpContext,
        site: &SiteId,
    ) -> Result<Vec<AllowedReaction>, StoreError> {
        ctx.guard(self.list_allowed_reactions(site)).await
    }

    async fn delete_allowed_reaction(&self, ctx: &OpContext, id: &str) -> Result<(), StoreError> {
        ctx.guard(self.remove_allowed_reaction(id)).await
    }

    async fn put_moderation_config(
        &self,
        ctx: &OpContext,
        site: &SiteId,
        config: &ModerationConfig,
    ) -> Result<(), StoreError> {
        ctx.guard(self.upsert_moderation_config(site, config)).await
    }

    async fn moderation_config(
        &self,
        ctx: &OpContext,
        site: &SiteId,
    ) -> Result<Option<ModerationConfig>, StoreError> {
        ctx.guard(self.get_moderation_config(site)).await
    }

    async fn delete_moderation_config(
        &self,
        ctx: &OpContext,
        site: &SiteId,
    ) -> Result<(), StoreError> {
        ctx.guard(self.remove_moderation_config(site)).await
    }

    async fn delete_site(&self, ctx: &OpContext, site: &SiteId) -> Result<(), StoreError> {
        ctx.guard(self.remove_site(site)).await
    }
}
