use domain::{ModerationConfig, SiteId, StoreError};
use redis::AsyncCommands;

use super::docs::{decode, encode};
use super::{keys, store_err, DocStore};

impl DocStore {
    pub(crate) async fn upsert_moderation_config(
        &self,
        site: &SiteId,
        config: &ModerationConfig,
    ) -> Result<(), StoreError> {
        config.validate()?;

        let json = encode(config)?;
        let mut con = self.con.clone();
        let _: () = con
            .set(keys::moderation_config(site), json)
            .await
            .map_err(store_err)?;

        // 与关系后端一致: 配置写入也会把站点占位补齐
        self.ensure_site(site).await;
        Ok(())
    }

    pub(crate) async fn get_moderation_config(
        &self,
        site: &SiteId,
    ) -> Result<Option<ModerationConfig>, StoreError> {
        let mut con = self.con.clone();
        let raw: Option<String> = con
            .get(keys::moderation_config(site))
            .await
            .map_err(store_err)?;
        raw.map(|json| decode(&json)).transpose()
    }

    pub(crate) async fn remove_moderation_config(&self, site: &SiteId) -> Result<(), StoreError> {
        let mut con = self.con.clone();
        let removed: i64 = con
            .del(keys::moderation_config(site))
            .await
            .map_err(store_err)?;
        if removed == 0 {
            return Err(StoreError::not_found(format!(
                "moderation config for site {}",
                site
            )));
        }
        Ok(())
    }
}
