use chrono::Utc;
use domain::{Comment, CommentStatus, SiteId, StoreError};

use super::models::SqlComment;
use super::{store_err, SqliteStore};

const COMMENT_COLS: &str = "id, site_id, page_id, author, author_id, author_email, text, \
     parent_id, status, moderated_by, moderated_at, created_at, updated_at";

impl SqliteStore {
    pub(crate) async fn insert_comment(&self, c: &Comment) -> Result<(), StoreError> {
        c.validate()?;

        // 父评论必须已存在且挂在同一个 site/page 下
        if let Some(parent_id) = &c.parent_id {
            let sql = format!("SELECT {} FROM comments WHERE id = ?", COMMENT_COLS);
            let parent = sqlx::query_as::<_, SqlComment>(&sql)
                .bind(parent_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(store_err)?
                .ok_or_else(|| {
                    StoreError::Validation(format!("parent comment {} does not exist", parent_id))
                })?;
            if parent.site_id != c.site_id.as_str() || parent.page_id != c.page_id {
                return Err(StoreError::Validation(
                    "parent comment belongs to a different site or page".into(),
                ));
            }
        }

        let mut tx = self.pool.begin().await.map_err(store_err)?;

        // 首次写入时幂等补建占位 Site/Page, 让外键闭合
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO sites (id, name, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(c.site_id.as_str())
        .bind(c.site_id.as_str())
        .bind(c.created_at)
        .bind(c.created_at)
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO pages (id, site_id, path, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&c.page_id)
        .bind(c.site_id.as_str())
        .bind(&c.page_id)
        .bind(c.created_at)
        .bind(c.created_at)
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        sqlx::query(
            r#"
            INSERT INTO comments (
                id, site_id, page_id, author, author_id, author_email,
                text, parent_id, status, moderated_by, moderated_at,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&c.id)
        .bind(c.site_id.as_str())
        .bind(&c.page_id)
        .bind(&c.author)
        .bind(&c.author_id)
        .bind(&c.author_email)
        .bind(&c.text)
        .bind(&c.parent_id)
        .bind(c.status.as_str())
        .bind(&c.moderated_by)
        .bind(c.moderated_at)
        .bind(c.created_at)
        .bind(c.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;
        Ok(())
    }

    pub(crate) async fn list_page_comments(
        &self,
        site: &SiteId,
        page: &str,
    ) -> Result<Vec<Comment>, StoreError> {
        let sql = format!(
            "SELECT {} FROM comments WHERE site_id = ? AND page_id = ? ORDER BY created_at ASC",
            COMMENT_COLS
        );
        let rows = sqlx::query_as::<_, SqlComment>(&sql)
            .bind(site.as_str())
            .bind(page)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    pub(crate) async fn list_site_comments(
        &self,
        site: &SiteId,
        status: Option<CommentStatus>,
    ) -> Result<Vec<Comment>, StoreError> {
        let rows = match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {} FROM comments WHERE site_id = ? AND status = ? ORDER BY created_at DESC",
                    COMMENT_COLS
                );
                sqlx::query_as::<_, SqlComment>(&sql)
                    .bind(site.as_str())
                    .bind(status.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM comments WHERE site_id = ? ORDER BY created_at DESC",
                    COMMENT_COLS
                );
                sqlx::query_as::<_, SqlComment>(&sql)
                    .bind(site.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(store_err)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    pub(crate) async fn get_comment(&self, id: &str) -> Result<Comment, StoreError> {
        let sql = format!("SELECT {} FROM comments WHERE id = ?", COMMENT_COLS);
        let row = sqlx::query_as::<_, SqlComment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?
            .ok_or_else(|| StoreError::not_found(format!("comment {}", id)))?;

        row.try_into()
    }

    pub(crate) async fn set_comment_status(
        &self,
        id: &str,
        status: CommentStatus,
        moderator_id: &str,
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE comments
            SET status = ?, moderated_by = ?, moderated_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(moderator_id)
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!("comment {}", id)));
        }
        Ok(())
    }

    pub(crate) async fn set_comment_text(&self, id: &str, text: &str) -> Result<(), StoreError> {
        if text.is_empty() {
            return Err(StoreError::Validation("text is required".into()));
        }

        let result = sqlx::query("UPDATE comments SET text = ?, updated_at = ? WHERE id = ?")
            .bind(text)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!("comment {}", id)));
        }
        Ok(())
    }

    pub(crate) async fn remove_comment(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!("comment {}", id)));
        }
        Ok(())
    }

    pub(crate) async fn site_id_of(&self, id: &str) -> Result<SiteId, StoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT site_id FROM comments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;

        row.map(|(s,)| SiteId::new_unchecked(s))
            .ok_or_else(|| StoreError::not_found(format!("comment {}", id)))
    }
}
