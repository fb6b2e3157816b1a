use chrono::Utc;
use domain::{ModerationConfig, SiteId, StoreError};

use super::models::SqlModerationConfig;
use super::{store_err, SqliteStore};

impl SqliteStore {
    pub(crate) async fn upsert_moderation_config(
        &self,
        site: &SiteId,
        config: &ModerationConfig,
    ) -> Result<(), StoreError> {
        config.validate()?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO sites (id, name, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(site.as_str())
        .bind(site.as_str())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        sqlx::query(
            r#"
            INSERT INTO moderation_config (
                id, site_id, enabled, auto_reject_threshold, auto_approve_threshold,
                check_spam, check_offensive, check_aggressive, check_off_topic,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(site_id) DO UPDATE SET
                enabled = excluded.enabled,
                auto_reject_threshold = excluded.auto_reject_threshold,
                auto_approve_threshold = excluded.auto_approve_threshold,
                check_spam = excluded.check_spam,
                check_offensive = excluded.check_offensive,
                check_aggressive = excluded.check_aggressive,
                check_off_topic = excluded.check_off_topic,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(site.as_str())
        .bind(config.enabled)
        .bind(config.auto_reject_threshold)
        .bind(config.auto_approve_threshold)
        .bind(config.check_spam)
        .bind(config.check_offensive)
        .bind(config.check_aggressive)
        .bind(config.check_off_topic)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;
        Ok(())
    }

    pub(crate) async fn get_moderation_config(
        &self,
        site: &SiteId,
    ) -> Result<Option<ModerationConfig>, StoreError> {
        let row = sqlx::query_as::<_, SqlModerationConfig>(
            r#"
            SELECT enabled, auto_reject_threshold, auto_approve_threshold,
                   check_spam, check_offensive, check_aggressive, check_off_topic
            FROM moderation_config
            WHERE site_id = ?
            "#,
        )
        .bind(site.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(row.map(Into::into))
    }

    pub(crate) async fn remove_moderation_config(&self, site: &SiteId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM moderation_config WHERE site_id = ?")
            .bind(site.as_str())
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!(
                "moderation config for site {}",
                site
            )));
        }
        Ok(())
    }
}
