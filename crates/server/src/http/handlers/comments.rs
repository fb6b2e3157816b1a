use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use domain::{top_level_only, Comment, CommentStatus, SiteId, StoreError};
use moderation::screen;

use crate::http::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    pub author: String,
    pub author_id: String,
    pub author_email: Option<String>,
    pub text: String,
    pub parent_id: Option<String>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub top_level: bool,
}

#[derive(Deserialize)]
pub struct SiteListQuery {
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub moderator_id: String,
}

#[derive(Deserialize)]
pub struct UpdateTextRequest {
    pub text: String,
}

pub async fn list_page_comments(
    State(state): State<AppState>,
    Path((site, page)): Path<(String, String)>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let site = SiteId::new(site)?;
    let comments = state.store.page_comments(&state.ctx(), &site, &page).await?;
    if query.top_level {
        return Ok(Json(top_level_only(comments)));
    }
    Ok(Json(comments))
}

pub async fn post_comment(
    State(state): State<AppState>,
    Path((site, page)): Path<(String, String)>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<Json<Comment>, ApiError> {
    let site = SiteId::new(site)?;
    let ctx = state.ctx();

    let mut comment = Comment::new(site.clone(), page, payload.author, payload.author_id, payload.text);
    comment.author_email = payload.author_email;
    comment.parent_id = payload.parent_id;

    // 先过审核管线拿到发布状态, 再落库
    let config = state.store.moderation_config(&ctx, &site).await?;
    comment.status = screen(
        state.analyzer.as_ref(),
        &ctx,
        &comment.text,
        config.as_ref(),
    )
    .await;

    state.store.add_comment(&ctx, &comment).await?;
    Ok(Json(comment))
}

pub async fn list_site_comments(
    State(state): State<AppState>,
    Path(site): Path<String>,
    Query(query): Query<SiteListQuery>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let site = SiteId::new(site)?;
    let status = query
        .status
        .map(|s| s.parse::<CommentStatus>())
        .transpose()?;
    let comments = state
        .store
        .comments_by_site(&state.ctx(), &site, status)
        .await?;
    Ok(Json(comments))
}

pub async fn get_comment(
    State(state): State<AppState>,
    Path((site, id)): Path<(String, String)>,
) -> Result<Json<Comment>, ApiError> {
    let site = SiteId::new(site)?;
    let comment = state.store.comment_by_id(&state.ctx(), &id).await?;
    if comment.site_id != site {
        return Err(StoreError::not_found(format!("comment {}", id)).into());
    }
    Ok(Json(comment))
}

pub async fn update_comment_status(
    State(state): State<AppState>,
    Path((site, id)): Path<(String, String)>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Comment>, ApiError> {
    let site = SiteId::new(site)?;
    let status = payload.status.parse::<CommentStatus>()?;
    let ctx = state.ctx();

    check_site_scope(&state, &ctx, &site, &id).await?;
    state
        .store
        .update_comment_status(&ctx, &id, status, &payload.moderator_id)
        .await?;

    let updated = state.store.comment_by_id(&ctx, &id).await?;
    Ok(Json(updated))
}

pub async fn update_comment_text(
    State(state): State<AppState>,
    Path((site, id)): Path<(String, String)>,
    Json(payload): Json<UpdateTextRequest>,
) -> Result<Json<Comment>, ApiError> {
    let site = SiteId::new(site)?;
    let ctx = state.ctx();

    check_site_scope(&state, &ctx, &site, &id).await?;
    state
        .store
        .update_comment_text(&ctx, &id, &payload.text)
        .await?;

    let updated = state.store.comment_by_id(&ctx, &id).await?;
    Ok(Json(updated))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path((site, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let site = SiteId::new(site)?;
    let ctx = state.ctx();

    check_site_scope(&state, &ctx, &site, &id).await?;
    state.store.delete_comment(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// 跨站点访问一律按 NotFound 处理, 不泄露评论存在性
async fn check_site_scope(
    state: &AppState,
    ctx: &domain::OpContext,
    site: &SiteId,
    comment_id: &str,
) -> Result<(), ApiError> {
    let owner = state.store.comment_site_id(ctx, comment_id).await?;
    if owner != *site {
        return Err(StoreError::not_found(format!("comment {}", comment_id)).into());
    }
    Ok(())
}
