use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// User entity - represents a registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamps.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            first_name: String::new(),
            last_name: String::new(),
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn author(&self) -> Author {
        Author {
            id: self.id,
            username: self.username.clone(),
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            joined_at: self.created_at,
        }
    }

    /// Overwrite the editable profile fields.
    pub fn apply(&mut self, draft: ProfileDraft) {
        self.username = draft.username;
        self.first_name = draft.first_name;
        self.last_name = draft.last_name;
        self.email = draft.email;
        self.updated_at = Utc::now();
    }
}

/// The public identity shown next to posts and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub username: String,
}

/// Public fields of a profile page heading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub joined_at: DateTime<Utc>,
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if username.chars().all(allowed) {
        Ok(())
    } else {
        let mut err = ValidationError::new("username_chars");
        err.message = Some("letters, digits and @/./+/-/_ only".into());
        Err(err)
    }
}

/// Editable profile fields.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProfileDraft {
    #[validate(
        length(min = 1, max = 150, message = "must be 1 to 150 characters"),
        custom = "validate_username"
    )]
    pub username: String,
    #[validate(length(max = 150, message = "at most 150 characters"))]
    pub first_name: String,
    #[validate(length(max = 150, message = "at most 150 characters"))]
    pub last_name: String,
    #[validate(email(message = "enter a valid email address"))]
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(username: &str, email: &str) -> ProfileDraft {
        ProfileDraft {
            username: username.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn test_profile_draft_accepts_plain_username() {
        assert!(draft("ada_l", "ada@example.com").validate().is_ok());
    }

    #[test]
    fn test_profile_draft_rejects_spaces_and_bad_email() {
        let errors = draft("ada l", "not-an-email").validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_apply_replaces_editable_fields() {
        let mut user = User::new("old".into(), "old@example.com".into(), "hash".into());
        user.apply(draft("new", "new@example.com"));
        assert_eq!(user.username, "new");
        assert_eq!(user.email, "new@example.com");
        assert_eq!(user.first_name, "Ada");
        assert_eq!(user.password_hash, "hash");
    }
}
