use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::permission::Owned;
use super::tag::extract_hashtags;
use crate::error::DomainError;

/// Post entity - a short blog entry whose body may carry `#hashtags`.
///
/// `like_count` is a denormalized copy of the like relation's size. It is
/// only written by the repositories' toggle operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub content: String,
    pub image: Option<String>,
    pub like_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post.
    pub fn new(user_id: Uuid, name: String, content: String, image: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            content,
            image,
            like_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an edit. Fields left as `None` keep their current value.
    pub fn revise(&mut self, name: Option<String>, content: Option<String>, image: Option<String>) {
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(content) = content {
            self.content = content;
        }
        if image.is_some() {
            self.image = image;
        }
        self.updated_at = Utc::now();
    }

    /// Tag names carried by the current body.
    pub fn hashtags(&self) -> Result<Vec<String>, DomainError> {
        extract_hashtags(&self.content)
    }
}

impl Owned for Post {
    const KIND: &'static str = "post";

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}
