use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

pub const TAG_NAME_MAX_LEN: usize = 50;

/// Tag entity - a label created on demand from a `#word` token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Extract tag names from a post body.
///
/// The body is split on whitespace; every token starting with `#` names a
/// tag, marker stripped. Duplicates collapse to their first occurrence and a
/// bare `#` is ignored.
pub fn extract_hashtags(text: &str) -> Result<Vec<String>, DomainError> {
    let mut names: Vec<String> = Vec::new();

    for name in text
        .split_whitespace()
        .filter_map(|token| token.strip_prefix('#'))
        .filter(|name| !name.is_empty())
    {
        if name.chars().count() > TAG_NAME_MAX_LEN {
            return Err(DomainError::Validation(format!(
                "content: hashtag '#{}' is longer than {} characters",
                name, TAG_NAME_MAX_LEN
            )));
        }
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_collapse() {
        let tags = extract_hashtags("#a #b #a").unwrap();
        assert_eq!(tags, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_only_leading_marker_counts() {
        let tags = extract_hashtags("see a#b and #rust\tnews\n#daily").unwrap();
        assert_eq!(tags, vec!["rust".to_string(), "daily".to_string()]);
    }

    #[test]
    fn test_bare_marker_is_ignored() {
        assert!(extract_hashtags("just # a hash").unwrap().is_empty());
        assert!(extract_hashtags("").unwrap().is_empty());
    }

    #[test]
    fn test_inner_marker_is_kept() {
        let tags = extract_hashtags("##double #c#d").unwrap();
        assert_eq!(tags, vec!["#double".to_string(), "c#d".to_string()]);
    }

    #[test]
    fn test_overlong_tag_is_rejected() {
        let body = format!("#{}", "x".repeat(TAG_NAME_MAX_LEN + 1));
        let err = extract_hashtags(&body).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.starts_with("content:")));

        let body = format!("#{}", "x".repeat(TAG_NAME_MAX_LEN));
        assert_eq!(extract_hashtags(&body).unwrap().len(), 1);
    }
}
