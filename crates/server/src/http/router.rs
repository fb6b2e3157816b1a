use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{admin, comments, reactions};
use crate::state::AppState;

pub fn build_router(state: AppState, allowed_origins: &str) -> Router {
    let cors = if allowed_origins == "*" {
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_origin(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse::<HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!("CORS config is invalid or empty, falling back to allow ANY.");
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_origin(Any)
                .allow_headers(Any)
        } else {
            tracing::info!("CORS enabled for origins: {:?}", origins);
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_origin(origins)
                .allow_headers(Any)
        }
    };

    Router::new()
        .route(
            "/api/site/:site/page/:page/comments",
            get(comments::list_page_comments).post(comments::post_comment),
        )
        .route("/api/site/:site/comments", get(comments::list_site_comments))
        .route(
            "/api/site/:site/comments/:id",
            get(comments::get_comment)
                .put(comments::update_comment_text)
                .delete(comments::delete_comment),
        )
        .route(
            "/api/site/:site/comments/:id/status",
            put(comments::update_comment_status),
        )
        .route(
            "/api/site/:site/reactions/toggle",
            post(reactions::toggle_reaction),
        )
        .route("/api/site/:site/reactions", get(reactions::list_reactions))
        .route(
            "/api/site/:site/reactions/counts",
            get(reactions::reaction_counts),
        )
        .route(
            "/api/site/:site/moderation-config",
            get(admin::get_moderation_config)
                .put(admin::put_moderation_config)
                .delete(admin::delete_moderation_config),
        )
        .route(
            "/api/site/:site/allowed-reactions",
            get(admin::list_allowed_reactions).post(admin::create_allowed_reaction),
        )
        .route(
            "/api/site/:site/allowed-reactions/:id",
            delete(admin::delete_allowed_reaction),
        )
        .route("/api/site/:site", delete(admin::delete_site))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
