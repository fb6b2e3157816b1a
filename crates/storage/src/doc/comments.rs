use chrono::Utc;
use domain::{Comment, CommentStatus, SiteId, StoreError};
use redis::AsyncCommands;
use tracing::warn;

use super::docs::{decode, encode, PageDoc, SiteDoc};
use super::{keys, store_err, DocStore};

fn score(c: &Comment) -> f64 {
    c.created_at.timestamp_millis() as f64
}

impl DocStore {
    pub(crate) async fn insert_comment(&self, c: &Comment) -> Result<(), StoreError> {
        c.validate()?;

        if let Some(parent_id) = &c.parent_id {
            let parent = self.get_comment(parent_id).await.map_err(|e| match e {
                StoreError::NotFound(_) => StoreError::Validation(format!(
                    "parent comment {} does not exist",
                    parent_id
                )),
                other => other,
            })?;
            if parent.site_id != c.site_id || parent.page_id != c.page_id {
                return Err(StoreError::Validation(
                    "parent comment belongs to a different site or page".into(),
                ));
            }
        }

        let json = encode(c)?;
        let mut con = self.con.clone();

        let created: bool = con
            .set_nx(keys::comment(&c.id), &json)
            .await
            .map_err(store_err)?;
        if !created {
            return Err(StoreError::Conflict(format!(
                "comment {} already exists",
                c.id
            )));
        }

        let _: () = con
            .zadd(keys::page_index(&c.site_id, &c.page_id), &c.id, score(c))
            .await
            .map_err(store_err)?;
        let _: () = con
            .zadd(keys::site_index(&c.site_id), &c.id, score(c))
            .await
            .map_err(store_err)?;
        let _: () = con
            .zadd(keys::status_index(&c.site_id, c.status), &c.id, score(c))
            .await
            .map_err(store_err)?;

        // 主写入成功后才补建父文档; 失败只记日志, 绝不回滚评论
        self.ensure_parents(&c.site_id, &c.page_id).await;

        Ok(())
    }

    // 幂等的"按 ID 覆盖写": 两个并发首写竞争时, 后写者只是覆盖相同内容
    pub(crate) async fn ensure_site(&self, site: &SiteId) {
        let mut con = self.con.clone();
        let site_doc = SiteDoc::placeholder(site, Utc::now());
        match encode(&site_doc) {
            Ok(json) => {
                let written: Result<(), _> = con.set(keys::site(site), json).await;
                if let Err(e) = written {
                    warn!(site = %site, error = %e, "failed to auto-create site document");
                }
            }
            Err(e) => warn!(site = %site, error = %e, "failed to encode site placeholder"),
        }
    }

    pub(crate) async fn ensure_parents(&self, site: &SiteId, page: &str) {
        self.ensure_site(site).await;

        let now = Utc::now();
        let mut con = self.con.clone();
        let page_doc = PageDoc::placeholder(site, page, now);
        match encode(&page_doc) {
            Ok(json) => {
                let written: Result<(), _> = con.set(keys::page(page), json).await;
                if let Err(e) = written {
                    warn!(site = %site, page = %page, error = %e, "failed to auto-create page document");
                }
            }
            Err(e) => warn!(site = %site, page = %page, error = %e, "failed to encode page placeholder"),
        }
    }

    async fn fetch_comments(&self, ids: Vec<String>) -> Result<Vec<Comment>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let comment_keys: Vec<String> = ids.iter().map(|id| keys::comment(id)).collect();
        let mut con = self.con.clone();
        let raw: Vec<Option<String>> = con.mget(&comment_keys).await.map_err(store_err)?;

        let mut out = Vec::with_capacity(raw.len());
        for (id, doc) in ids.iter().zip(raw) {
            match doc {
                Some(json) => out.push(decode::<Comment>(&json)?),
                // 索引条目可能先于文档删除被观察到, 跳过即可
                None => warn!(comment_id = %id, "index entry points at a missing comment document"),
            }
        }
        Ok(out)
    }

    pub(crate) async fn list_page_comments(
        &self,
        site: &SiteId,
        page: &str,
    ) -> Result<Vec<Comment>, StoreError> {
        let mut con = self.con.clone();
        let ids: Vec<String> = con
            .zrange(keys::page_index(site, page), 0, -1)
            .await
            .map_err(store_err)?;
        self.fetch_comments(ids).await
    }

    pub(crate) async fn list_site_comments(
        &self,
        site: &SiteId,
        status: Option<CommentStatus>,
    ) -> Result<Vec<Comment>, StoreError> {
        let index = match status {
            Some(status) => keys::status_index(site, status),
            None => keys::site_index(site),
        };
        let mut con = self.con.clone();
        let ids: Vec<String> = con.zrevrange(index, 0, -1).await.map_err(store_err)?;
        self.fetch_comments(ids).await
    }

    pub(crate) async fn get_comment(&self, id: &str) -> Result<Comment, StoreError> {
        let mut con = self.con.clone();
        let raw: Option<String> = con.get(keys::comment(id)).await.map_err(store_err)?;
        let json = raw.ok_or_else(|| StoreError::not_found(format!("comment {}", id)))?;
        decode(&json)
    }

    pub(crate) async fn set_comment_status(
        &self,
        id: &str,
        status: CommentStatus,
        moderator_id: &str,
    ) -> Result<(), StoreError> {
        let mut c = self.get_comment(id).await?;
        let old_status = c.status;

        let now = Utc::now();
        c.status = status;
        c.moderated_by = Some(moderator_id.to_string());
        c.moderated_at = Some(now);
        c.updated_at = now;

        let json = encode(&c)?;
        let mut con = self.con.clone();
        let _: () = con
            .set(keys::comment(id), json)
            .await
            .map_err(store_err)?;

        // 状态索引迁移是二级写入, 失败造成的滞后在契约允许范围内
        if old_status != status {
            let removed: Result<(), _> = con
                .zrem(keys::status_index(&c.site_id, old_status), id)
                .await;
            if let Err(e) = removed {
                warn!(comment_id = %id, error = %e, "failed to drop stale status index entry");
            }
            let added: Result<(), _> = con
                .zadd(keys::status_index(&c.site_id, status), id, score(&c))
                .await;
            if let Err(e) = added {
                warn!(comment_id = %id, error = %e, "failed to add status index entry");
            }
        }

        Ok(())
    }

    pub(crate) async fn set_comment_text(&self, id: &str, text: &str) -> Result<(), StoreError> {
        if text.is_empty() {
            return Err(StoreError::Validation("text is required".into()));
        }

        let mut c = self.get_comment(id).await?;
        c.text = text.to_string();
        c.updated_at = Utc::now();

        let json = encode(&c)?;
        let mut con = self.con.clone();
        let _: () = con
            .set(keys::comment(id), json)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    pub(crate) async fn remove_comment(&self, id: &str) -> Result<(), StoreError> {
        let c = self.get_comment(id).await?;

        let mut con = self.con.clone();
        let _: () = con.del(keys::comment(id)).await.map_err(store_err)?;

        // 索引与反应哈希清理是尽力而为; 残留条目在读取时被跳过
        for index in [
            keys::page_index(&c.site_id, &c.page_id),
            keys::site_index(&c.site_id),
            keys::status_index(&c.site_id, c.status),
        ] {
            let removed: Result<(), _> = con.zrem(&index, id).await;
            if let Err(e) = removed {
                warn!(comment_id = %id, index = %index, error = %e, "failed to drop index entry");
            }
        }
        let reactions_key = format!("reactions:comment:{}", id);
        let dropped: Result<(), _> = con.del(&reactions_key).await;
        if let Err(e) = dropped {
            warn!(comment_id = %id, error = %e, "failed to drop reactions of deleted comment");
        }

        Ok(())
    }

    pub(crate) async fn site_id_of(&self, id: &str) -> Result<SiteId, StoreError> {
        Ok(self.get_comment(id).await?.site_id)
    }
}
