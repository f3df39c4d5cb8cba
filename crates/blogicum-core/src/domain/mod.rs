//! Domain entities - the core business objects.

mod category;
mod comment;
mod location;
mod post;
mod user;

pub use category::Category;
pub use comment::{Comment, CommentDraft, CommentEntry};
pub use location::Location;
pub use post::{Post, PostDraft, PostEntry, PostView};
pub use user::{Author, ProfileDraft, User, UserProfile};

use validator::ValidationError;

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}
