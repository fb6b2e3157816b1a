use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use domain::{Reaction, ReactionCount, ReactionTarget, StoreError, ToggleOutcome};

use crate::http::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ToggleRequest {
    #[serde(flatten)]
    pub target: TargetParams,
    pub allowed_reaction_id: String,
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct TargetParams {
    pub kind: String,
    pub id: String,
}

#[derive(Serialize)]
pub struct ToggleResponse {
    pub outcome: ToggleOutcome,
}

impl TargetParams {
    fn into_target(self) -> Result<ReactionTarget, StoreError> {
        match self.kind.as_str() {
            "comment" => Ok(ReactionTarget::Comment(self.id)),
            "page" => Ok(ReactionTarget::Page(self.id)),
            other => Err(StoreError::Validation(format!(
                "reaction target kind must be 'comment' or 'page', got '{}'",
                other
            ))),
        }
    }
}

pub async fn toggle_reaction(
    State(state): State<AppState>,
    Path(_site): Path<String>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let target = payload.target.into_target()?;
    let outcome = state
        .store
        .toggle_reaction(
            &state.ctx(),
            &target,
            &payload.allowed_reaction_id,
            &payload.user_id,
        )
        .await?;
    Ok(Json(ToggleResponse { outcome }))
}

pub async fn list_reactions(
    State(state): State<AppState>,
    Path(_site): Path<String>,
    Query(query): Query<TargetParams>,
) -> Result<Json<Vec<Reaction>>, ApiError> {
    let target = query.into_target()?;
    let reactions = state.store.reactions_for(&state.ctx(), &target).await?;
    Ok(Json(reactions))
}

pub async fn reaction_counts(
    State(state): State<AppState>,
    Path(_site): Path<String>,
    Query(query): Query<TargetParams>,
) -> Result<Json<Vec<ReactionCount>>, ApiError> {
    let target = query.into_target()?;
    let counts = state.store.reaction_counts(&state.ctx(), &target).await?;
    Ok(Json(counts))
}
