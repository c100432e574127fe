//! Domain entities - the core business objects.

mod comment;
mod like;
mod permission;
mod post;
mod tag;
mod user;

pub use comment::Comment;
pub use like::LikeToggle;
pub use permission::{Actor, Owned};
pub use post::Post;
pub use tag::{TAG_NAME_MAX_LEN, Tag, extract_hashtags};
pub use user::{SUPERUSER_ROLE, USER_ROLE, User};
