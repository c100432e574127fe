/// Outcome of toggling a user's like on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeToggle {
    /// The user was added to the like set.
    Liked,
    /// The user was removed from the like set.
    Unliked,
}

impl LikeToggle {
    /// Decide the toggle from the user's current membership in the like set.
    pub fn from_membership(already_liked: bool) -> Self {
        if already_liked {
            Self::Unliked
        } else {
            Self::Liked
        }
    }

    pub fn is_liked(self) -> bool {
        matches!(self, Self::Liked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_flips() {
        assert_eq!(LikeToggle::from_membership(false), LikeToggle::Liked);
        assert_eq!(LikeToggle::from_membership(true), LikeToggle::Unliked);
        assert!(LikeToggle::Liked.is_liked());
        assert!(!LikeToggle::Unliked.is_liked());
    }
}
