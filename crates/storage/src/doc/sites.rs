use std::collections::HashSet;

use domain::{Comment, CommentStatus, SiteId, StoreError};
use redis::AsyncCommands;
use tracing::warn;

use super::docs::decode;
use super::{keys, store_err, DocStore};

impl DocStore {
    // 没有外键可依赖, 级联靠应用层逐键清理. 中途失败会留下孤儿键,
    // 读取路径对缺失文档已经免疫, 重新执行即可收敛
    pub(crate) async fn remove_site(&self, site: &SiteId) -> Result<(), StoreError> {
        let mut con = self.con.clone();

        let exists: bool = con.exists(keys::site(site)).await.map_err(store_err)?;
        if !exists {
            return Err(StoreError::not_found(format!("site {}", site)));
        }

        let comment_ids: Vec<String> = con
            .zrange(keys::site_index(site), 0, -1)
            .await
            .map_err(store_err)?;

        let mut pages: HashSet<String> = HashSet::new();
        for id in &comment_ids {
            let raw: Option<String> = con.get(keys::comment(id)).await.map_err(store_err)?;
            if let Some(json) = raw {
                match decode::<Comment>(&json) {
                    Ok(c) => {
                        pages.insert(c.page_id);
                    }
                    Err(e) => warn!(comment_id = %id, error = %e, "skipping malformed comment during cascade"),
                }
            }
            let _: () = con.del(keys::comment(id)).await.map_err(store_err)?;
            let _: () = con
                .del(format!("reactions:comment:{}", id))
                .await
                .map_err(store_err)?;
        }

        for page in &pages {
            let _: () = con
                .del(keys::page_index(site, page))
                .await
                .map_err(store_err)?;
            let _: () = con.del(keys::page(page)).await.map_err(store_err)?;
            let _: () = con
                .del(format!("reactions:page:{}", page))
                .await
                .map_err(store_err)?;
        }

        let _: () = con.del(keys::site_index(site)).await.map_err(store_err)?;
        for status in [
            CommentStatus::Pending,
            CommentStatus::Approved,
            CommentStatus::Rejected,
        ] {
            let _: () = con
                .del(keys::status_index(site, status))
                .await
                .map_err(store_err)?;
        }

        let allowed_ids: Vec<String> = con
            .zrange(keys::allowed_index(site), 0, -1)
            .await
            .map_err(store_err)?;
        for id in &allowed_ids {
            let _: () = con
                .del(keys::allowed_reaction(id))
                .await
                .map_err(store_err)?;
        }
        let _: () = con.del(keys::allowed_index(site)).await.map_err(store_err)?;

        let _: () = con
            .del(keys::moderation_config(site))
            .await
            .map_err(store_err)?;
        let _: () = con.del(keys::site(site)).await.map_err(store_err)?;

        Ok(())
    }
}
