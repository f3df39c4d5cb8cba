use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Author, Category, Location, not_blank};

/// Post entity - a blog entry, possibly scheduled for a future `pub_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub image: Option<String>,
    pub is_published: bool,
    pub location_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post owned by `author_id`.
    pub fn new(author_id: Uuid, draft: PostDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            title: draft.title,
            text: draft.text,
            pub_date: draft.pub_date,
            image: draft.image,
            is_published: draft.is_published,
            location_id: draft.location_id,
            category_id: draft.category_id,
            created_at: Utc::now(),
        }
    }

    /// Overwrite the author-editable fields. Ownership and creation time are kept.
    pub fn apply(&mut self, draft: PostDraft) {
        self.title = draft.title;
        self.text = draft.text;
        self.pub_date = draft.pub_date;
        self.image = draft.image;
        self.is_published = draft.is_published;
        self.location_id = draft.location_id;
        self.category_id = draft.category_id;
    }
}

/// Author-submitted post fields.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PostDraft {
    #[validate(
        length(min = 1, max = 256, message = "must be 1 to 256 characters"),
        custom = "not_blank"
    )]
    pub title: String,
    #[validate(length(min = 1, message = "must not be empty"), custom = "not_blank")]
    pub text: String,
    pub pub_date: DateTime<Utc>,
    #[validate(length(max = 100, message = "at most 100 characters"))]
    pub image: Option<String>,
    pub is_published: bool,
    pub location_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
}

/// A post joined with the records it references.
#[derive(Debug, Clone)]
pub struct PostEntry {
    pub post: Post,
    pub author: Author,
    pub category: Option<Category>,
    pub location: Option<Location>,
}

/// A post as handed to rendering: its references plus a live comment count.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub post: Post,
    pub author: Author,
    pub category: Option<Category>,
    pub location: Option<Location>,
    pub comment_count: u64,
}

impl PostView {
    pub fn new(entry: PostEntry, comment_count: u64) -> Self {
        Self {
            post: entry.post,
            author: entry.author,
            category: entry.category,
            location: entry.location,
            comment_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> PostDraft {
        PostDraft {
            title: title.to_string(),
            text: "body".to_string(),
            pub_date: Utc::now(),
            image: None,
            is_published: true,
            location_id: None,
            category_id: None,
        }
    }

    #[test]
    fn test_draft_rejects_empty_and_oversized_titles() {
        assert!(draft("").validate().is_err());
        assert!(draft(&"x".repeat(257)).validate().is_err());
        assert!(draft(&"x".repeat(256)).validate().is_ok());
        assert!(draft("   ").validate().is_err());
    }

    #[test]
    fn test_apply_keeps_owner_and_id() {
        let author = Uuid::new_v4();
        let mut post = Post::new(author, draft("first"));
        let id = post.id;
        let mut edit = draft("second");
        edit.is_published = false;
        post.apply(edit);

        assert_eq!(post.id, id);
        assert_eq!(post.author_id, author);
        assert_eq!(post.title, "second");
        assert!(!post.is_published);
    }
}
