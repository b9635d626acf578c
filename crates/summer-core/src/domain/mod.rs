//! Domain entities - the core business objects.

mod post;
mod user;

pub use post::{LikeAction, LikeToggle, Post, PostAuthor, PostSort, PostWithAuthor, sort_posts};
pub use user::{User, UserChanges};
