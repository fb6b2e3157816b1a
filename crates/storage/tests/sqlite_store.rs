use chrono::{Duration, TimeZone, Utc};
use domain::{
    AllowedReaction, Applicability, Comment, CommentStatus, ModerationConfig, OpContext,
    ReactionTarget, SiteId, StoreError, ToggleOutcome,
};
use storage::{SqliteStore, Store};

async fn store() -> SqliteStore {
    SqliteStore::new("sqlite::memory:").await.unwrap()
}

fn site() -> SiteId {
    SiteId::new_unchecked("blog")
}

fn comment(page: &str, author_id: &str, text: &str) -> Comment {
    Comment::new(site(), page, "Ada", author_id, text)
}

#[tokio::test]
async fn add_then_get_round_trips_all_fields() {
    let store = store().await;
    let ctx = OpContext::new();

    let parent = comment("post-1", "u1", "root comment");
    store.add_comment(&ctx, &parent).await.unwrap();

    let mut reply = comment("post-1", "u2", "a reply");
    reply.author_email = Some("u2@example.com".to_string());
    reply.parent_id = Some(parent.id.clone());
    store.add_comment(&ctx, &reply).await.unwrap();

    let got = store.comment_by_id(&ctx, &reply.id).await.unwrap();
    assert_eq!(got, reply);
}

#[tokio::test]
async fn duplicate_id_is_a_conflict() {
    let store = store().await;
    let ctx = OpContext::new();

    let c = comment("post-1", "u1", "hello");
    store.add_comment(&ctx, &c).await.unwrap();
    let err = store.add_comment(&ctx, &c).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn empty_text_is_rejected() {
    let store = store().await;
    let c = comment("post-1", "u1", "");
    let err = store.add_comment(&OpContext::new(), &c).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn parent_must_exist_on_the_same_page() {
    let store = store().await;
    let ctx = OpContext::new();

    let mut orphan = comment("post-1", "u1", "reply to nothing");
    orphan.parent_id = Some("no-such-comment".to_string());
    let err = store.add_comment(&ctx, &orphan).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let parent = comment("post-1", "u1", "root");
    store.add_comment(&ctx, &parent).await.unwrap();

    let mut stray = comment("post-2", "u2", "reply from another page");
    stray.parent_id = Some(parent.id.clone());
    let err = store.add_comment(&ctx, &stray).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn threading_keeps_replies_in_page_listing() {
    let store = store().await;
    let ctx = OpContext::new();

    let a = comment("post-1", "u1", "top level");
    store.add_comment(&ctx, &a).await.unwrap();
    let mut b = comment("post-1", "u2", "reply");
    b.parent_id = Some(a.id.clone());
    store.add_comment(&ctx, &b).await.unwrap();

    let all = store.page_comments(&ctx, &site(), "post-1").await.unwrap();
    assert_eq!(all.len(), 2);

    let top = domain::top_level_only(all);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].id, a.id);
}

#[tokio::test]
async fn page_listing_is_oldest_first_site_listing_is_newest_first() {
    let store = store().await;
    let ctx = OpContext::new();
    let base = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();

    let mut ids = Vec::new();
    for i in 0..3 {
        let mut c = comment("post-1", "u1", &format!("comment {}", i));
        c.created_at = base + Duration::seconds(i);
        c.updated_at = c.created_at;
        ids.push(c.id.clone());
        store.add_comment(&ctx, &c).await.unwrap();
    }

    let page = store.page_comments(&ctx, &site(), "post-1").await.unwrap();
    let page_ids: Vec<_> = page.iter().map(|c| c.id.clone()).collect();
    assert_eq!(page_ids, ids);

    let by_site = store.comments_by_site(&ctx, &site(), None).await.unwrap();
    let site_ids: Vec<_> = by_site.iter().map(|c| c.id.clone()).collect();
    let reversed: Vec<_> = ids.iter().rev().cloned().collect();
    assert_eq!(site_ids, reversed);
}

#[tokio::test]
async fn site_listing_filters_by_status() {
    let store = store().await;
    let ctx = OpContext::new();

    let mut approved = comment("post-1", "u1", "fine");
    approved.status = CommentStatus::Approved;
    store.add_comment(&ctx, &approved).await.unwrap();

    let pending = comment("post-1", "u2", "awaiting review");
    store.add_comment(&ctx, &pending).await.unwrap();

    let got = store
        .comments_by_site(&ctx, &site(), Some(CommentStatus::Pending))
        .await
        .unwrap();
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].id, pending.id);
}

#[tokio::test]
async fn moderating_stamps_moderator_and_timestamp() {
    let store = store().await;
    let ctx = OpContext::new();

    let c = comment("post-1", "u1", "needs a look");
    store.add_comment(&ctx, &c).await.unwrap();

    store
        .update_comment_status(&ctx, &c.id, CommentStatus::Approved, "mod-1")
        .await
        .unwrap();

    let got = store.comment_by_id(&ctx, &c.id).await.unwrap();
    assert_eq!(got.status, CommentStatus::Approved);
    assert_eq!(got.moderated_by.as_deref(), Some("mod-1"));
    assert!(got.moderated_at.is_some());

    // 重复裁决覆盖 ModeratedBy/ModeratedAt
    store
        .update_comment_status(&ctx, &c.id, CommentStatus::Rejected, "mod-2")
        .await
        .unwrap();
    let got = store.comment_by_id(&ctx, &c.id).await.unwrap();
    assert_eq!(got.status, CommentStatus::Rejected);
    assert_eq!(got.moderated_by.as_deref(), Some("mod-2"));
}

#[tokio::test]
async fn unknown_ids_surface_not_found() {
    let store = store().await;
    let ctx = OpContext::new();

    assert!(matches!(
        store.comment_by_id(&ctx, "nope").await.unwrap_err(),
        StoreError::NotFound(_)
    ));
    assert!(matches!(
        store
            .update_comment_status(&ctx, "nope", CommentStatus::Approved, "mod")
            .await
            .unwrap_err(),
        StoreError::NotFound(_)
    ));
    assert!(matches!(
        store.update_comment_text(&ctx, "nope", "text").await.unwrap_err(),
        StoreError::NotFound(_)
    ));
    assert!(matches!(
        store.delete_comment(&ctx, "nope").await.unwrap_err(),
        StoreError::NotFound(_)
    ));
    assert!(matches!(
        store.comment_site_id(&ctx, "nope").await.unwrap_err(),
        StoreError::NotFound(_)
    ));
}

#[tokio::test]
async fn update_and_delete_round_trip() {
    let store = store().await;
    let ctx = OpContext::new();

    let c = comment("post-1", "u1", "first draft");
    store.add_comment(&ctx, &c).await.unwrap();

    store
        .update_comment_text(&ctx, &c.id, "second draft")
        .await
        .unwrap();
    let got = store.comment_by_id(&ctx, &c.id).await.unwrap();
    assert_eq!(got.text, "second draft");
    assert!(got.updated_at >= c.updated_at);

    assert_eq!(store.comment_site_id(&ctx, &c.id).await.unwrap(), site());

    store.delete_comment(&ctx, &c.id).await.unwrap();
    assert!(matches!(
        store.comment_by_id(&ctx, &c.id).await.unwrap_err(),
        StoreError::NotFound(_)
    ));
}

async fn seed_reaction_fixtures(store: &SqliteStore, ctx: &OpContext) -> (Comment, AllowedReaction) {
    let c = comment("post-1", "u1", "react to me");
    store.add_comment(ctx, &c).await.unwrap();

    let heart = AllowedReaction::new(site(), "heart", "❤️", Applicability::Both);
    store.create_allowed_reaction(ctx, &heart).await.unwrap();

    (c, heart)
}

#[tokio::test]
async fn toggling_twice_returns_to_the_original_state() {
    let store = store().await;
    let ctx = OpContext::new();
    let (c, heart) = seed_reaction_fixtures(&store, &ctx).await;
    let target = ReactionTarget::Comment(c.id.clone());

    let first = store
        .toggle_reaction(&ctx, &target, &heart.id, "u9")
        .await
        .unwrap();
    assert_eq!(first, ToggleOutcome::Added);
    assert_eq!(store.reactions_for(&ctx, &target).await.unwrap().len(), 1);

    let second = store
        .toggle_reaction(&ctx, &target, &heart.id, "u9")
        .await
        .unwrap();
    assert_eq!(second, ToggleOutcome::Removed);
    assert!(store.reactions_for(&ctx, &target).await.unwrap().is_empty());
}

#[tokio::test]
async fn reaction_counts_aggregate_per_reaction() {
    let store = store().await;
    let ctx = OpContext::new();
    let (c, heart) = seed_reaction_fixtures(&store, &ctx).await;

    let up = AllowedReaction::new(site(), "thumbs_up", "👍", Applicability::Comment);
    store.create_allowed_reaction(&ctx, &up).await.unwrap();

    let target = ReactionTarget::Comment(c.id.clone());
    for user in ["u1", "u2", "u3"] {
        store
            .toggle_reaction(&ctx, &target, &heart.id, user)
            .await
            .unwrap();
    }
    store
        .toggle_reaction(&ctx, &target, &up.id, "u1")
        .await
        .unwrap();

    let counts = store.reaction_counts(&ctx, &target).await.unwrap();
    assert_eq!(counts.len(), 2);
    assert_eq!(counts[0].name, "heart");
    assert_eq!(counts[0].count, 3);
    assert_eq!(counts[1].name, "thumbs_up");
    assert_eq!(counts[1].count, 1);
}

#[tokio::test]
async fn reacting_with_an_unknown_reaction_is_invalid() {
    let store = store().await;
    let ctx = OpContext::new();

    let c = comment("post-1", "u1", "hello");
    store.add_comment(&ctx, &c).await.unwrap();

    let err = store
        .toggle_reaction(
            &ctx,
            &ReactionTarget::Comment(c.id.clone()),
            "no-such-reaction",
            "u9",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn page_reactions_are_kept_apart_from_comment_reactions() {
    let store = store().await;
    let ctx = OpContext::new();
    let (c, heart) = seed_reaction_fixtures(&store, &ctx).await;

    let page_target = ReactionTarget::Page(c.page_id.clone());
    let comment_target = ReactionTarget::Comment(c.id.clone());

    store
        .toggle_reaction(&ctx, &page_target, &heart.id, "u9")
        .await
        .unwrap();
    store
        .toggle_reaction(&ctx, &comment_target, &heart.id, "u9")
        .await
        .unwrap();

    assert_eq!(store.reactions_for(&ctx, &page_target).await.unwrap().len(), 1);
    assert_eq!(
        store.reactions_for(&ctx, &comment_target).await.unwrap().len(),
        1
    );

    // 同一用户同一反应, 页面目标与评论目标是两个独立元组
    store
        .toggle_reaction(&ctx, &page_target, &heart.id, "u9")
        .await
        .unwrap();
    assert!(store.reactions_for(&ctx, &page_target).await.unwrap().is_empty());
    assert_eq!(
        store.reactions_for(&ctx, &comment_target).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn duplicate_allowed_reaction_name_is_a_conflict() {
    let store = store().await;
    let ctx = OpContext::new();

    let first = AllowedReaction::new(site(), "heart", "❤️", Applicability::Comment);
    store.create_allowed_reaction(&ctx, &first).await.unwrap();

    let again = AllowedReaction::new(site(), "heart", "💜", Applicability::Comment);
    let err = store.create_allowed_reaction(&ctx, &again).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn moderation_config_lifecycle() {
    let store = store().await;
    let ctx = OpContext::new();
    let site = site();

    assert!(store.moderation_config(&ctx, &site).await.unwrap().is_none());

    let config = ModerationConfig {
        enabled: true,
        ..ModerationConfig::default()
    };
    store.put_moderation_config(&ctx, &site, &config).await.unwrap();
    assert_eq!(
        store.moderation_config(&ctx, &site).await.unwrap(),
        Some(config.clone())
    );

    let updated = ModerationConfig {
        auto_reject_threshold: 0.9,
        check_off_topic: true,
        ..config
    };
    store.put_moderation_config(&ctx, &site, &updated).await.unwrap();
    assert_eq!(
        store.moderation_config(&ctx, &site).await.unwrap(),
        Some(updated)
    );

    store.delete_moderation_config(&ctx, &site).await.unwrap();
    assert!(store.moderation_config(&ctx, &site).await.unwrap().is_none());
}

#[tokio::test]
async fn inverted_thresholds_are_rejected_at_write_time() {
    let store = store().await;
    let config = ModerationConfig {
        auto_reject_threshold: 0.2,
        auto_approve_threshold: 0.8,
        ..ModerationConfig::default()
    };
    let err = store
        .put_moderation_config(&OpContext::new(), &site(), &config)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn deleting_a_site_cascades_to_everything_it_owns() {
    let store = store().await;
    let ctx = OpContext::new();
    let site = site();
    let (c, heart) = seed_reaction_fixtures(&store, &ctx).await;

    store
        .toggle_reaction(&ctx, &ReactionTarget::Comment(c.id.clone()), &heart.id, "u9")
        .await
        .unwrap();
    store
        .put_moderation_config(&ctx, &site, &ModerationConfig::default())
        .await
        .unwrap();

    store.delete_site(&ctx, &site).await.unwrap();

    assert!(matches!(
        store.comment_by_id(&ctx, &c.id).await.unwrap_err(),
        StoreError::NotFound(_)
    ));
    assert!(store
        .reactions_for(&ctx, &ReactionTarget::Comment(c.id.clone()))
        .await
        .unwrap()
        .is_empty());
    assert!(store.allowed_reactions(&ctx, &site).await.unwrap().is_empty());
    assert!(store.moderation_config(&ctx, &site).await.unwrap().is_none());

    assert!(matches!(
        store.delete_site(&ctx, &site).await.unwrap_err(),
        StoreError::NotFound(_)
    ));
}

#[tokio::test]
async fn canceled_context_aborts_before_io() {
    let store = store().await;
    let ctx = OpContext::new();
    ctx.cancel();

    let err = store.page_comments(&ctx, &site(), "post-1").await.unwrap_err();
    assert!(matches!(err, StoreError::Canceled));

    let c = comment("post-1", "u1", "never stored");
    let err = store.add_comment(&ctx, &c).await.unwrap_err();
    assert!(matches!(err, StoreError::Canceled));

    // 取消的写入不能留下任何痕迹
    let fresh = OpContext::new();
    assert!(store.page_comments(&fresh, &site(), "post-1").await.unwrap().is_empty());
}
