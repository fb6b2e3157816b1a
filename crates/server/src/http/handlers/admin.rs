use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use domain::{AllowedReaction, Applicability, ModerationConfig, SiteId};

use crate::http::error::ApiError;
use crate::state::AppState;

pub async fn get_moderation_config(
    State(state): State<AppState>,
    Path(site): Path<String>,
) -> Result<Json<ModerationConfig>, ApiError> {
    let site = SiteId::new(site)?;
    let config = state
        .store
        .moderation_config(&state.ctx(), &site)
        .await?
        // 没有配置过的站点返回默认配置 (审核关闭)
        .unwrap_or_default();
    Ok(Json(config))
}

pub async fn put_moderation_config(
    State(state): State<AppState>,
    Path(site): Path<String>,
    Json(config): Json<ModerationConfig>,
) -> Result<Json<ModerationConfig>, ApiError> {
    let site = SiteId::new(site)?;
    state
        .store
        .put_moderation_config(&state.ctx(), &site, &config)
        .await?;
    Ok(Json(config))
}

pub async fn delete_moderation_config(
    State(state): State<AppState>,
    Path(site): Path<String>,
) -> Result<StatusCode, ApiError> {
    let site = SiteId::new(site)?;
    state
        .store
        .delete_moderation_config(&state.ctx(), &site)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct CreateAllowedReactionRequest {
    pub name: String,
    pub emoji: String,
    pub applies_to: Option<String>,
}

pub async fn list_allowed_reactions(
    State(state): State<AppState>,
    Path(site): Path<String>,
) -> Result<Json<Vec<AllowedReaction>>, ApiError> {
    let site = SiteId::new(site)?;
    let reactions = state.store.allowed_reactions(&state.ctx(), &site).await?;
    Ok(Json(reactions))
}

pub async fn create_allowed_reaction(
    State(state): State<AppState>,
    Path(site): Path<String>,
    Json(payload): Json<CreateAllowedReactionRequest>,
) -> Result<Json<AllowedReaction>, ApiError> {
    let site = SiteId::new(site)?;
    let applies_to = match payload.applies_to.as_deref() {
        Some(s) => s.parse::<Applicability>()?,
        None => Applicability::Comment,
    };
    let reaction = AllowedReaction::new(site, payload.name, payload.emoji, applies_to);
    state
        .store
        .create_allowed_reaction(&state.ctx(), &reaction)
        .await?;
    Ok(Json(reaction))
}

pub async fn delete_allowed_reaction(
    State(state): State<AppState>,
    Path((_site, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete_allowed_reaction(&state.ctx(), &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_site(
    State(state): State<AppState>,
    Path(site): Path<String>,
) -> Result<StatusCode, ApiError> {
    let site = SiteId::new(site)?;
    state.store.delete_site(&state.ctx(), &site).await?;
    Ok(StatusCode::NO_CONTENT)
}
