use std::collections::HashMap;

use chrono::Utc;
use domain::{
    AllowedReaction, Reaction, ReactionCount, ReactionTarget, SiteId, StoreError, ToggleOutcome,
};
use redis::AsyncCommands;
use tracing::warn;

use super::docs::{decode, encode};
use super::{keys, store_err, DocStore};

fn tuple_field(allowed_reaction_id: &str, user_id: &str) -> String {
    format!("{}:{}", allowed_reaction_id, user_id)
}

impl DocStore {
    // HSETNX 按 (目标, 反应, 用户) 元组原子判定: 并发双击一个落子一个删除,
    // 元组最终回到不存在, 不会出现双行
    pub(crate) async fn toggle(
        &self,
        target: &ReactionTarget,
        allowed_reaction_id: &str,
        user_id: &str,
    ) -> Result<ToggleOutcome, StoreError> {
        let mut con = self.con.clone();

        // 与关系后端的外键看齐: 目标和反应种类必须已存在
        let target_key = match target {
            ReactionTarget::Comment(id) => keys::comment(id),
            ReactionTarget::Page(id) => keys::page(id),
        };
        let target_exists: bool = con.exists(&target_key).await.map_err(store_err)?;
        if !target_exists {
            return Err(StoreError::Validation(format!(
                "unknown reaction target {}",
                target
            )));
        }
        let allowed_exists: bool = con
            .exists(keys::allowed_reaction(allowed_reaction_id))
            .await
            .map_err(store_err)?;
        if !allowed_exists {
            return Err(StoreError::Validation(format!(
                "unknown allowed reaction {}",
                allowed_reaction_id
            )));
        }

        let reaction = Reaction {
            id: uuid::Uuid::new_v4().to_string(),
            target: target.clone(),
            allowed_reaction_id: allowed_reaction_id.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        };
        let json = encode(&reaction)?;
        let key = keys::reactions(target);
        let field = tuple_field(allowed_reaction_id, user_id);
        let added: bool = con
            .hset_nx(&key, &field, json)
            .await
            .map_err(store_err)?;

        if added {
            Ok(ToggleOutcome::Added)
        } else {
            let _: () = con.hdel(&key, &field).await.map_err(store_err)?;
            Ok(ToggleOutcome::Removed)
        }
    }

    pub(crate) async fn list_reactions(
        &self,
        target: &ReactionTarget,
    ) -> Result<Vec<Reaction>, StoreError> {
        let mut con = self.con.clone();
        let raw: Vec<String> = con
            .hvals(keys::reactions(target))
            .await
            .map_err(store_err)?;

        let mut reactions = raw
            .iter()
            .map(|json| decode::<Reaction>(json))
            .collect::<Result<Vec<_>, _>>()?;
        reactions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(reactions)
    }

    pub(crate) async fn count_reactions(
        &self,
        target: &ReactionTarget,
    ) -> Result<Vec<ReactionCount>, StoreError> {
        let reactions = self.list_reactions(target).await?;

        let mut by_allowed: HashMap<String, u64> = HashMap::new();
        for r in &reactions {
            *by_allowed.entry(r.allowed_reaction_id.clone()).or_insert(0) += 1;
        }
        if by_allowed.is_empty() {
            return Ok(Vec::new());
        }

        let allowed_ids: Vec<String> = by_allowed.keys().cloned().collect();
        let allowed_keys: Vec<String> = allowed_ids
            .iter()
            .map(|id| keys::allowed_reaction(id))
            .collect();
        let mut con = self.con.clone();
        let raw: Vec<Option<String>> = con.mget(&allowed_keys).await.map_err(store_err)?;

        let mut counts = Vec::new();
        for (id, doc) in allowed_ids.iter().zip(raw) {
            match doc {
                Some(json) => {
                    let allowed: AllowedReaction = decode(&json)?;
                    counts.push(ReactionCount {
                        name: allowed.name,
                        emoji: allowed.emoji,
                        count: by_allowed[id],
                    });
                }
                None => {
                    warn!(allowed_reaction_id = %id, "reaction references a missing allowed-reaction document")
                }
            }
        }

        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        Ok(counts)
    }

    pub(crate) async fn insert_allowed_reaction(
        &self,
        reaction: &AllowedReaction,
    ) -> Result<(), StoreError> {
        reaction.validate()?;

        // (site, name, applies_to) 的唯一性靠读-查-写保证, 与关系后端的
        // UNIQUE 约束呈现同样的 Conflict
        let existing = self.list_allowed_reactions(&reaction.site_id).await?;
        if existing
            .iter()
            .any(|r| r.name == reaction.name && r.applies_to == reaction.applies_to)
        {
            return Err(StoreError::Conflict(format!(
                "allowed reaction {} ({}) already exists for site {}",
                reaction.name, reaction.applies_to, reaction.site_id
            )));
        }

        let json = encode(reaction)?;
        let mut con = self.con.clone();
        let created: bool = con
            .set_nx(keys::allowed_reaction(&reaction.id), &json)
            .await
            .map_err(store_err)?;
        if !created {
            return Err(StoreError::Conflict(format!(
                "allowed reaction {} already exists",
                reaction.id
            )));
        }

        let _: () = con
            .zadd(
                keys::allowed_index(&reaction.site_id),
                &reaction.id,
                reaction.created_at.timestamp_millis() as f64,
            )
            .await
            .map_err(store_err)?;

        self.ensure_site(&reaction.site_id).await;
        Ok(())
    }

    pub(crate) async fn list_allowed_reactions(
        &self,
        site: &SiteId,
    ) -> Result<Vec<AllowedReaction>, StoreError> {
        let mut con = self.con.clone();
        let ids: Vec<String> = con
            .zrange(keys::allowed_index(site), 0, -1)
            .await
            .map_err(store_err)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let allowed_keys: Vec<String> = ids.iter().map(|id| keys::allowed_reaction(id)).collect();
        let raw: Vec<Option<String>> = con.mget(&allowed_keys).await.map_err(store_err)?;

        let mut out = Vec::with_capacity(raw.len());
        for (id, doc) in ids.iter().zip(raw) {
            match doc {
                Some(json) => out.push(decode::<AllowedReaction>(&json)?),
                None => warn!(allowed_reaction_id = %id, "index entry points at a missing allowed-reaction document"),
            }
        }
        Ok(out)
    }

    pub(crate) async fn remove_allowed_reaction(&self, id: &str) -> Result<(), StoreError> {
        let mut con = self.con.clone();
        let raw: Option<String> = con
            .get(keys::allowed_reaction(id))
            .await
            .map_err(store_err)?;
        let json =
            raw.ok_or_else(|| StoreError::not_found(format!("allowed reaction {}", id)))?;
        let allowed: AllowedReaction = decode(&json)?;

        let _: () = con
            .del(keys::allowed_reaction(id))
            .await
            .map_err(store_err)?;
        let removed: Result<(), _> = con.zrem(keys::allowed_index(&allowed.site_id), id).await;
        if let Err(e) = removed {
            warn!(allowed_reaction_id = %id, error = %e, "failed to drop allowed-reaction index entry");
        }
        Ok(())
    }
}
