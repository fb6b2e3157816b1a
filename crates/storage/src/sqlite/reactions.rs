use chrono::Utc;
use domain::{
    AllowedReaction, Reaction, ReactionCount, ReactionTarget, SiteId, StoreError, ToggleOutcome,
};

use super::models::{SqlAllowedReaction, SqlReaction};
use super::{store_err, SqliteStore};

const REACTION_COLS: &str = "id, page_id, comment_id, allowed_reaction_id, user_id, created_at";

fn target_columns(target: &ReactionTarget) -> (&'static str, &str) {
    match target {
        ReactionTarget::Comment(id) => ("comment_id", id.as_str()),
        ReactionTarget::Page(id) => ("page_id", id.as_str()),
    }
}

impl SqliteStore {
    // 先删后插: 两步都是单语句原子操作, 并发双击最多触发唯一索引冲突
    pub(crate) async fn toggle(
        &self,
        target: &ReactionTarget,
        allowed_reaction_id: &str,
        user_id: &str,
    ) -> Result<ToggleOutcome, StoreError> {
        let (column, target_id) = target_columns(target);

        let sql = format!(
            "DELETE FROM reactions WHERE {} = ? AND allowed_reaction_id = ? AND user_id = ?",
            column
        );
        let deleted = sqlx::query(&sql)
            .bind(target_id)
            .bind(allowed_reaction_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        if deleted.rows_affected() > 0 {
            return Ok(ToggleOutcome::Removed);
        }

        let (page_id, comment_id) = match target {
            ReactionTarget::Comment(id) => (None, Some(id.as_str())),
            ReactionTarget::Page(id) => (Some(id.as_str()), None),
        };

        sqlx::query(
            r#"
            INSERT INTO reactions (id, page_id, comment_id, allowed_reaction_id, user_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(page_id)
        .bind(comment_id)
        .bind(allowed_reaction_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(ToggleOutcome::Added)
    }

    pub(crate) async fn list_reactions(
        &self,
        target: &ReactionTarget,
    ) -> Result<Vec<Reaction>, StoreError> {
        let (column, target_id) = target_columns(target);
        let sql = format!(
            "SELECT {} FROM reactions WHERE {} = ? ORDER BY created_at ASC",
            REACTION_COLS, column
        );
        let rows = sqlx::query_as::<_, SqlReaction>(&sql)
            .bind(target_id)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    pub(crate) async fn count_reactions(
        &self,
        target: &ReactionTarget,
    ) -> Result<Vec<ReactionCount>, StoreError> {
        let (column, target_id) = target_columns(target);
        let sql = format!(
            r#"
            SELECT ar.name, ar.emoji, COUNT(*) as count
            FROM reactions r
            JOIN allowed_reactions ar ON r.allowed_reaction_id = ar.id
            WHERE r.{} = ?
            GROUP BY ar.name, ar.emoji
            ORDER BY count DESC, ar.name ASC
            "#,
            column
        );
        let rows: Vec<(String, String, i64)> = sqlx::query_as(&sql)
            .bind(target_id)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;

        Ok(rows
            .into_iter()
            .map(|(name, emoji, count)| ReactionCount {
                name,
                emoji,
                count: count.max(0) as u64,
            })
            .collect())
    }

    pub(crate) async fn insert_allowed_reaction(
        &self,
        reaction: &AllowedReaction,
    ) -> Result<(), StoreError> {
        reaction.validate()?;

        let mut tx = self.pool.begin().await.map_err(store_err)?;

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO sites (id, name, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(reaction.site_id.as_str())
        .bind(reaction.site_id.as_str())
        .bind(reaction.created_at)
        .bind(reaction.created_at)
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        sqlx::query(
            r#"
            INSERT INTO allowed_reactions (id, site_id, name, emoji, applies_to, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&reaction.id)
        .bind(reaction.site_id.as_str())
        .bind(&reaction.name)
        .bind(&reaction.emoji)
        .bind(reaction.applies_to.as_str())
        .bind(reaction.created_at)
        .bind(reaction.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;
        Ok(())
    }

    pub(crate) async fn list_allowed_reactions(
        &self,
        site: &SiteId,
    ) -> Result<Vec<AllowedReaction>, StoreError> {
        let rows = sqlx::query_as::<_, SqlAllowedReaction>(
            r#"
            SELECT id, site_id, name, emoji, applies_to, created_at, updated_at
            FROM allowed_reactions
            WHERE site_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(site.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    pub(crate) async fn remove_allowed_reaction(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM allowed_reactions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!("allowed reaction {}", id)));
        }
        Ok(())
    }
}
