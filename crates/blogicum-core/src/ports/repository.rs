use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Comment, CommentEntry, Location, Post, PostEntry, User};
use crate::error::RepoError;
use crate::pagination::PageWindow;
use crate::visibility::Visibility;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;
}

/// Location repository.
pub trait LocationRepository: BaseRepository<Location, Uuid> {}

/// The base collection a feed is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    All,
    Category(Uuid),
    Author(Uuid),
}

impl PostScope {
    pub fn contains(&self, post: &Post) -> bool {
        match self {
            PostScope::All => true,
            PostScope::Category(id) => post.category_id == Some(*id),
            PostScope::Author(id) => post.author_id == *id,
        }
    }
}

/// Post repository.
///
/// Feed queries apply the visibility gate in the store and return entries
/// ordered by `pub_date` descending.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// The post with its references, regardless of visibility.
    async fn find_entry(&self, id: Uuid) -> Result<Option<PostEntry>, RepoError>;

    async fn count_entries(
        &self,
        scope: PostScope,
        visibility: Visibility,
    ) -> Result<u64, RepoError>;

    async fn list_entries(
        &self,
        scope: PostScope,
        visibility: Visibility,
        window: PageWindow,
    ) -> Result<Vec<PostEntry>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments under a post, oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError>;

    /// Live comment counts grouped by post. Posts without comments are absent.
    async fn count_by_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError>;
}
