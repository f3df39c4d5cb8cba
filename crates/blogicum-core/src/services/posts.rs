use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::domain::{Post, PostDraft, User};
use crate::error::{DomainError, FieldError};
use crate::ports::{
    CategoryRepository, LocationRepository, PostRepository, Repositories, UserRepository,
};

use super::gatekeeper::{Action, Authorization, Mutation, Outcome, Redirect, authorize};

/// Post creation and the author-only edit/delete flows.
#[derive(Clone)]
pub struct PostService {
    users: Arc<dyn UserRepository>,
    categories: Arc<dyn CategoryRepository>,
    locations: Arc<dyn LocationRepository>,
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            users: repos.users.clone(),
            categories: repos.categories.clone(),
            locations: repos.locations.clone(),
            posts: repos.posts.clone(),
        }
    }

    /// Publish a new post. The actor becomes its author.
    pub async fn create(
        &self,
        actor_id: Uuid,
        draft: PostDraft,
    ) -> Result<Mutation<Post>, DomainError> {
        let actor = self.actor(actor_id).await?;
        self.check(&draft).await?;

        let post = self.posts.save(Post::new(actor.id, draft)).await?;
        tracing::info!(post = %post.id, author = %actor.id, "Post created");

        Ok(Mutation {
            value: post,
            next: Redirect::Profile {
                username: actor.username,
            },
        })
    }

    /// The current post, for pre-filling the edit form.
    pub async fn edit_form(&self, actor_id: Uuid, post_id: Uuid) -> Result<Outcome<Post>, DomainError> {
        let post = self.load(post_id).await?;
        Ok(match authorize(actor_id, Action::Edit, &post) {
            Authorization::Allowed => Outcome::Done(post),
            Authorization::Denied(redirect) => Outcome::Denied(redirect),
        })
    }

    pub async fn update(
        &self,
        actor_id: Uuid,
        post_id: Uuid,
        draft: PostDraft,
    ) -> Result<Outcome<Mutation<Post>>, DomainError> {
        let mut post = self.load(post_id).await?;
        if let Authorization::Denied(redirect) = authorize(actor_id, Action::Edit, &post) {
            return Ok(Outcome::Denied(redirect));
        }
        self.check(&draft).await?;

        post.apply(draft);
        let post = self.posts.save(post).await?;
        tracing::info!(post = %post.id, "Post updated");

        let next = Redirect::PostDetail { post_id: post.id };
        Ok(Outcome::Done(Mutation { value: post, next }))
    }

    /// Delete a post together with its comments.
    pub async fn delete(
        &self,
        actor_id: Uuid,
        post_id: Uuid,
    ) -> Result<Outcome<Redirect>, DomainError> {
        let post = self.load(post_id).await?;
        if let Authorization::Denied(redirect) = authorize(actor_id, Action::Delete, &post) {
            return Ok(Outcome::Denied(redirect));
        }
        let actor = self.actor(actor_id).await?;

        self.posts.delete(post.id).await?;
        tracing::info!(post = %post.id, "Post deleted");

        Ok(Outcome::Done(Redirect::Profile {
            username: actor.username,
        }))
    }

    async fn load(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    async fn actor(&self, actor_id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(actor_id)
            .await?
            .ok_or(DomainError::Unauthorized)
    }

    /// Field rules plus the references the draft points at.
    async fn check(&self, draft: &PostDraft) -> Result<(), DomainError> {
        let mut errors = match draft.validate() {
            Ok(()) => Vec::new(),
            Err(e) => match DomainError::from(e) {
                DomainError::Validation(fields) => fields,
                other => return Err(other),
            },
        };

        if let Some(id) = draft.category_id {
            if self.categories.find_by_id(id).await?.is_none() {
                errors.push(FieldError::new("category_id", "unknown category"));
            }
        }
        if let Some(id) = draft.location_id {
            if self.locations.find_by_id(id).await?.is_none() {
                errors.push(FieldError::new("location_id", "unknown location"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(errors))
        }
    }
}
