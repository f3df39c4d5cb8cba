use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::domain::{ProfileDraft, User};
use crate::error::{DomainError, FieldError};
use crate::ports::{Repositories, UserRepository};

use super::gatekeeper::{Authorization, Mutation, Outcome, Redirect, authorize_profile};

/// Editing one's own profile.
#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserRepository>,
}

impl ProfileService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            users: repos.users.clone(),
        }
    }

    pub async fn edit_form(
        &self,
        actor_id: Uuid,
        username: &str,
    ) -> Result<Outcome<User>, DomainError> {
        let actor = self.actor(actor_id).await?;
        Ok(match authorize_profile(&actor, username) {
            Authorization::Allowed => Outcome::Done(actor),
            Authorization::Denied(redirect) => Outcome::Denied(redirect),
        })
    }

    pub async fn update(
        &self,
        actor_id: Uuid,
        username: &str,
        draft: ProfileDraft,
    ) -> Result<Outcome<Mutation<User>>, DomainError> {
        let mut actor = self.actor(actor_id).await?;
        if let Authorization::Denied(redirect) = authorize_profile(&actor, username) {
            return Ok(Outcome::Denied(redirect));
        }
        draft.validate()?;

        let mut taken = Vec::new();
        if let Some(other) = self.users.find_by_username(&draft.username).await? {
            if other.id != actor.id {
                taken.push(FieldError::new("username", "already taken"));
            }
        }
        if let Some(other) = self.users.find_by_email(&draft.email).await? {
            if other.id != actor.id {
                taken.push(FieldError::new("email", "already registered"));
            }
        }
        if !taken.is_empty() {
            return Err(DomainError::Validation(taken));
        }

        actor.apply(draft);
        let user = self.users.save(actor).await?;
        tracing::info!(user = %user.id, "Profile updated");

        let next = Redirect::Profile {
            username: user.username.clone(),
        };
        Ok(Outcome::Done(Mutation { value: user, next }))
    }

    async fn actor(&self, actor_id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(actor_id)
            .await?
            .ok_or(DomainError::Unauthorized)
    }
}
