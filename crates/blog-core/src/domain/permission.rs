//! Object-level write permissions.

use uuid::Uuid;

use crate::error::DomainError;

/// A resource with a single owning user.
pub trait Owned {
    /// Resource name used in error messages.
    const KIND: &'static str;

    fn owner_id(&self) -> Uuid;
}

/// The authenticated user performing a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub is_superuser: bool,
}

impl Actor {
    pub fn new(user_id: Uuid, is_superuser: bool) -> Self {
        Self {
            user_id,
            is_superuser,
        }
    }

    /// Owners and superusers may modify a resource.
    pub fn can_modify<T: Owned>(&self, resource: &T) -> bool {
        self.is_superuser || resource.owner_id() == self.user_id
    }

    pub fn authorize<T: Owned>(&self, resource: &T) -> Result<(), DomainError> {
        if self.can_modify(resource) {
            Ok(())
        } else {
            Err(DomainError::Forbidden(T::KIND))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Comment, Post};

    #[test]
    fn test_owner_may_modify_post() {
        let owner = Uuid::new_v4();
        let post = Post::new(owner, "t".into(), "c".into(), None);

        assert!(Actor::new(owner, false).authorize(&post).is_ok());
    }

    #[test]
    fn test_stranger_is_forbidden() {
        let post = Post::new(Uuid::new_v4(), "t".into(), "c".into(), None);
        let comment = Comment::new(post.id, Uuid::new_v4(), "hi".into());
        let stranger = Actor::new(Uuid::new_v4(), false);

        assert!(matches!(
            stranger.authorize(&post),
            Err(DomainError::Forbidden("post"))
        ));
        assert!(matches!(
            stranger.authorize(&comment),
            Err(DomainError::Forbidden("comment"))
        ));
    }

    #[test]
    fn test_superuser_may_modify_anything() {
        let post = Post::new(Uuid::new_v4(), "t".into(), "c".into(), None);
        let comment = Comment::new(post.id, Uuid::new_v4(), "hi".into());
        let admin = Actor::new(Uuid::new_v4(), true);

        assert!(admin.can_modify(&post));
        assert!(admin.can_modify(&comment));
    }
}
