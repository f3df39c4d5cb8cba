//! Ownership rules for edit and delete.
//!
//! A denied actor is never shown an error. The caller gets a [`Redirect`] to
//! a view that is always valid for them instead.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Comment, Post, User};

/// A view the client is sent to after a mutation or a denied attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Redirect {
    PostDetail { post_id: Uuid },
    Profile { username: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Edit,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    Allowed,
    Denied(Redirect),
}

/// Something with a single owning author.
pub trait Authored {
    fn author_id(&self) -> Uuid;

    /// Where a non-owner lands.
    fn fallback(&self) -> Redirect;
}

impl Authored for Post {
    fn author_id(&self) -> Uuid {
        self.author_id
    }

    fn fallback(&self) -> Redirect {
        Redirect::PostDetail { post_id: self.id }
    }
}

impl Authored for Comment {
    fn author_id(&self) -> Uuid {
        self.author_id
    }

    fn fallback(&self) -> Redirect {
        Redirect::PostDetail {
            post_id: self.post_id,
        }
    }
}

pub fn authorize<T: Authored>(actor_id: Uuid, action: Action, target: &T) -> Authorization {
    if actor_id == target.author_id() {
        Authorization::Allowed
    } else {
        tracing::warn!(
            actor = %actor_id,
            owner = %target.author_id(),
            ?action,
            "Mutation denied, redirecting"
        );
        Authorization::Denied(target.fallback())
    }
}

/// Users may edit only their own profile; others are sent to its read view.
pub fn authorize_profile(actor: &User, username: &str) -> Authorization {
    if actor.username == username {
        Authorization::Allowed
    } else {
        tracing::warn!(actor = %actor.id, profile = username, "Profile edit denied, redirecting");
        Authorization::Denied(Redirect::Profile {
            username: username.to_string(),
        })
    }
}

/// A completed mutation and the view to continue to.
#[derive(Debug, Clone)]
pub struct Mutation<T> {
    pub value: T,
    pub next: Redirect,
}

/// Result of an owner-only operation.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Done(T),
    Denied(Redirect),
}

impl<T> Outcome<T> {
    pub fn is_denied(&self) -> bool {
        matches!(self, Outcome::Denied(_))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::PostDraft;

    fn post_by(author: Uuid) -> Post {
        Post::new(
            author,
            PostDraft {
                title: "t".into(),
                text: "x".into(),
                pub_date: Utc::now(),
                image: None,
                is_published: true,
                location_id: None,
                category_id: None,
            },
        )
    }

    #[test]
    fn test_author_is_allowed() {
        let author = Uuid::new_v4();
        assert_eq!(
            authorize(author, Action::Edit, &post_by(author)),
            Authorization::Allowed
        );
    }

    #[test]
    fn test_stranger_is_sent_to_post_detail() {
        let post = post_by(Uuid::new_v4());
        assert_eq!(
            authorize(Uuid::new_v4(), Action::Delete, &post),
            Authorization::Denied(Redirect::PostDetail { post_id: post.id })
        );
    }

    #[test]
    fn test_comment_denial_targets_its_post() {
        let comment = Comment::new(Uuid::new_v4(), Uuid::new_v4(), "hi".into());
        assert_eq!(
            authorize(Uuid::new_v4(), Action::Edit, &comment),
            Authorization::Denied(Redirect::PostDetail {
                post_id: comment.post_id
            })
        );
    }

    #[test]
    fn test_profile_edit_of_someone_else() {
        let actor = User::new("alice".into(), "a@example.com".into(), "h".into());
        assert_eq!(authorize_profile(&actor, "alice"), Authorization::Allowed);
        assert_eq!(
            authorize_profile(&actor, "bob"),
            Authorization::Denied(Redirect::Profile {
                username: "bob".into()
            })
        );
    }
}
