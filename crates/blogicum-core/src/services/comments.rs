use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::domain::{Comment, CommentDraft};
use crate::error::DomainError;
use crate::ports::{CommentRepository, PostRepository, Repositories, UserRepository};

use super::gatekeeper::{Action, Authorization, Mutation, Outcome, Redirect, authorize};

/// Commenting on posts. Anyone signed in may comment; only the comment's
/// author may change or remove it.
///
/// Counts are aggregated on read, so no bookkeeping follows a write here.
#[derive(Clone)]
pub struct CommentService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            users: repos.users.clone(),
            posts: repos.posts.clone(),
            comments: repos.comments.clone(),
        }
    }

    pub async fn create(
        &self,
        actor_id: Uuid,
        post_id: Uuid,
        draft: CommentDraft,
    ) -> Result<Mutation<Comment>, DomainError> {
        if self.users.find_by_id(actor_id).await?.is_none() {
            return Err(DomainError::Unauthorized);
        }
        draft.validate()?;
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;

        let comment = self
            .comments
            .save(Comment::new(actor_id, post.id, draft.text))
            .await?;
        tracing::info!(comment = %comment.id, post = %post.id, "Comment added");

        Ok(Mutation {
            value: comment,
            next: Redirect::PostDetail { post_id },
        })
    }

    pub async fn edit_form(
        &self,
        actor_id: Uuid,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Outcome<Comment>, DomainError> {
        let comment = self.locate(post_id, comment_id).await?;
        Ok(match authorize(actor_id, Action::Edit, &comment) {
            Authorization::Allowed => Outcome::Done(comment),
            Authorization::Denied(redirect) => Outcome::Denied(redirect),
        })
    }

    pub async fn update(
        &self,
        actor_id: Uuid,
        post_id: Uuid,
        comment_id: Uuid,
        draft: CommentDraft,
    ) -> Result<Outcome<Mutation<Comment>>, DomainError> {
        let mut comment = self.locate(post_id, comment_id).await?;
        if let Authorization::Denied(redirect) = authorize(actor_id, Action::Edit, &comment) {
            return Ok(Outcome::Denied(redirect));
        }
        draft.validate()?;

        comment.text = draft.text;
        let comment = self.comments.save(comment).await?;
        tracing::info!(comment = %comment.id, "Comment updated");

        Ok(Outcome::Done(Mutation {
            value: comment,
            next: Redirect::PostDetail { post_id },
        }))
    }

    pub async fn delete(
        &self,
        actor_id: Uuid,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Outcome<Redirect>, DomainError> {
        let comment = self.locate(post_id, comment_id).await?;
        if let Authorization::Denied(redirect) = authorize(actor_id, Action::Delete, &comment) {
            return Ok(Outcome::Denied(redirect));
        }

        self.comments.delete(comment.id).await?;
        tracing::info!(comment = %comment.id, post = %post_id, "Comment deleted");

        Ok(Outcome::Done(Redirect::PostDetail { post_id }))
    }

    /// A comment addressed through the wrong post is treated as missing.
    async fn locate(&self, post_id: Uuid, comment_id: Uuid) -> Result<Comment, DomainError> {
        self.comments
            .find_by_id(comment_id)
            .await?
            .filter(|c| c.post_id == post_id)
            .ok_or_else(|| DomainError::not_found("comment", comment_id))
    }
}
