use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Author, not_blank};

/// Comment entity - owned by its author and by the post it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub author_id: Uuid,
    pub post_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(author_id: Uuid, post_id: Uuid, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            post_id,
            text,
            created_at: Utc::now(),
        }
    }
}

/// Comment form body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentDraft {
    #[validate(
        length(min = 1, max = 256, message = "must be 1 to 256 characters"),
        custom = "not_blank"
    )]
    pub text: String,
}

/// A comment joined with its author, as listed under a post.
#[derive(Debug, Clone, Serialize)]
pub struct CommentEntry {
    pub comment: Comment,
    pub author: Author,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(text: &str) -> CommentDraft {
        CommentDraft {
            text: text.to_string(),
        }
    }

    #[test]
    fn test_draft_rejects_whitespace_only_text() {
        let errors = draft("  \n\t ").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("text"));
        assert!(draft(" fine ").validate().is_ok());
    }
}
