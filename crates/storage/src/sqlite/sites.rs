use domain::{SiteId, StoreError};

use super::{store_err, SqliteStore};

impl SqliteStore {
    // 单条 DELETE, 其余全部由 ON DELETE CASCADE 外键带走
    pub(crate) async fn remove_site(&self, site: &SiteId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM sites WHERE id = ?")
            .bind(site.as_str())
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!("site {}", site)));
        }
        Ok(())
    }
}
