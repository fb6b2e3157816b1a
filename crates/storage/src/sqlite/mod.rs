use std::str::FromStr;
use std::time::Duration;
use std::{fs, path::Path};

use async_trait::async_trait;
use domain::{
    AllowedReaction, Comment, CommentStatus, ModerationConfig, OpContext, Reaction, ReactionCount,
    ReactionTarget, SiteId, StoreError, ToggleOutcome,
};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::{Pool, Sqlite};

use crate::port::Store;

mod comments;
mod models;
mod moderation_cfg;
mod reactions;
mod sites;

#[derive(Clone)]
pub struct SqliteStore {
    pub(crate) pool: Pool<Sqlite>,
}

impl SqliteStore {
    pub async fn new(db_url: &str) -> Result<Self, StoreError> {
        if db_url.starts_with("sqlite://") && !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite://");
            let path = Path::new(path_str);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent)
                        .map_err(|e| StoreError::Configuration(e.to_string()))?;
                }
            }
        }

        // WAL 允许单写多读; foreign_keys 是连接级 pragma, 必须挂在连接选项上
        let options = SqliteConnectOptions::from_str(db_url)
            .map_err(|e| StoreError::Configuration(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        // :memory: 数据库按连接隔离, 池子必须收敛到单连接
        let pool = if db_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
        } else {
            SqlitePoolOptions::new()
                .max_connections(25)
                .connect_with(options)
                .await
        }
        .map_err(store_err)?;

        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Configuration(format!("migration failed: {}", e)))?;

        Ok(Self { pool })
    }
}

pub(crate) fn store_err(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::RowNotFound => StoreError::NotFound("row not found".into()),
        sqlx::Error::Database(db) => match db.kind() {
            sqlx::error::ErrorKind::UniqueViolation => StoreError::Conflict(db.to_string()),
            sqlx::error::ErrorKind::ForeignKeyViolation => StoreError::Validation(db.to_string()),
            _ => StoreError::Transient(e.to_string()),
        },
        _ => StoreError::Transient(e.to_string()),
    }
}

#[async_trait]
impl Store for SqliteStore {
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
