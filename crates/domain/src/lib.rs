mod ctx;
mod error;
mod models;
mod moderation;
mod reactions;

pub use ctx::OpContext;
pub use error::StoreError;
pub use models::{top_level_only, Comment, CommentStatus, SiteId};
pub use moderation::ModerationConfig;
pub use reactions::{
    AllowedReaction, Applicability, Reaction, ReactionCount, ReactionTarget, ToggleOutcome,
};
