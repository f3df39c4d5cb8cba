//! The publication gate.
//!
//! A post is public when it is published, its `pub_date` has passed and its
//! category (if any) is published. The location flag is never consulted.

use chrono::{DateTime, Utc};

use crate::domain::{Category, Post, PostEntry};

/// Which posts a viewer may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Gate suppressed: the viewer is the author of everything in the collection.
    Unrestricted,
    /// Only posts passing the gate at the given instant.
    PublishedAsOf(DateTime<Utc>),
}

impl Visibility {
    pub fn for_viewer(bypass: bool, now: DateTime<Utc>) -> Self {
        if bypass {
            Visibility::Unrestricted
        } else {
            Visibility::PublishedAsOf(now)
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Visibility::Unrestricted)
    }

    pub fn admits(&self, post: &Post, category: Option<&Category>) -> bool {
        match self {
            Visibility::Unrestricted => true,
            Visibility::PublishedAsOf(now) => {
                post.is_published
                    && post.pub_date <= *now
                    && category.is_none_or(|c| c.is_published)
            }
        }
    }

    pub fn admits_entry(&self, entry: &PostEntry) -> bool {
        self.admits(&entry.post, entry.category.as_ref())
    }

    /// Keep the admitted entries. Order is not significant.
    pub fn filter<I>(&self, entries: I) -> Vec<PostEntry>
    where
        I: IntoIterator<Item = PostEntry>,
    {
        entries
            .into_iter()
            .filter(|entry| self.admits_entry(entry))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use uuid::Uuid;

    use super::*;
    use crate::domain::{Author, Location, PostDraft};

    fn post(is_published: bool, pub_date: DateTime<Utc>, category_id: Option<Uuid>) -> Post {
        Post::new(
            Uuid::new_v4(),
            PostDraft {
                title: "title".into(),
                text: "text".into(),
                pub_date,
                image: None,
                is_published,
                location_id: None,
                category_id,
            },
        )
    }

    fn entry(post: Post, category: Option<Category>, location: Option<Location>) -> PostEntry {
        PostEntry {
            author: Author {
                id: post.author_id,
                username: "author".into(),
            },
            post,
            category,
            location,
        }
    }

    #[test]
    fn test_gate_requires_all_three_clauses() {
        let now = Utc::now();
        let gate = Visibility::PublishedAsOf(now);
        let past = now - Duration::days(1);
        let future = now + Duration::days(1);
        let open = Category::new("c".into(), "d".into(), "c".into());
        let closed = Category::new("h".into(), "d".into(), "h".into()).hidden();

        assert!(gate.admits(&post(true, past, Some(open.id)), Some(&open)));
        assert!(!gate.admits(&post(false, past, Some(open.id)), Some(&open)));
        assert!(!gate.admits(&post(true, future, Some(open.id)), Some(&open)));
        assert!(!gate.admits(&post(true, past, Some(closed.id)), Some(&closed)));
    }

    #[test]
    fn test_pub_date_equal_to_now_is_visible() {
        let now = Utc::now();
        assert!(Visibility::PublishedAsOf(now).admits(&post(true, now, None), None));
    }

    #[test]
    fn test_uncategorized_post_passes_gate() {
        let now = Utc::now();
        let p = post(true, now - Duration::hours(1), None);
        assert!(Visibility::PublishedAsOf(now).admits(&p, None));
    }

    #[test]
    fn test_unpublished_location_does_not_hide_post() {
        let now = Utc::now();
        let mut location = Location::new("Nowhere".into());
        location.is_published = false;
        let e = entry(post(true, now - Duration::hours(1), None), None, Some(location));
        assert!(Visibility::PublishedAsOf(now).admits_entry(&e));
    }

    #[test]
    fn test_bypass_returns_collection_unmodified() {
        let now = Utc::now();
        let hidden = vec![
            entry(post(false, now, None), None, None),
            entry(post(true, now + Duration::days(3), None), None, None),
        ];
        assert_eq!(Visibility::for_viewer(true, now).filter(hidden.clone()).len(), 2);
        assert!(Visibility::for_viewer(false, now).filter(hidden).is_empty());
    }
}
