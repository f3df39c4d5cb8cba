//! In-memory store - used when no database is configured, and in tests.
//!
//! One set of tables behind an async `RwLock`, implementing every repository
//! port with the same referential rules the SQL schema declares.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blogicum_core::domain::{
    Author, Category, Comment, CommentEntry, Location, Post, PostEntry, User,
};
use blogicum_core::error::RepoError;
use blogicum_core::pagination::PageWindow;
use blogicum_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostRepository,
    PostScope, Repositories, UserRepository,
};
use blogicum_core::visibility::Visibility;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    categories: HashMap<Uuid, Category>,
    locations: HashMap<Uuid, Location>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
}

impl Tables {
    fn entry(&self, post: &Post) -> Option<PostEntry> {
        let author = self.users.get(&post.author_id).map(User::author)?;
        Some(PostEntry {
            post: post.clone(),
            author,
            category: post
                .category_id
                .and_then(|id| self.categories.get(&id).cloned()),
            location: post
                .location_id
                .and_then(|id| self.locations.get(&id).cloned()),
        })
    }

    /// Scoped, gated entries ordered by `pub_date` descending.
    fn feed(&self, scope: PostScope, visibility: Visibility) -> Vec<PostEntry> {
        let candidates = self
            .posts
            .values()
            .filter(|post| scope.contains(post))
            .filter_map(|post| self.entry(post));
        let mut entries = visibility.filter(candidates);
        entries.sort_by(|a, b| {
            b.post
                .pub_date
                .cmp(&a.post.pub_date)
                .then_with(|| b.post.created_at.cmp(&a.post.created_at))
        });
        entries
    }

    fn remove_post(&mut self, id: Uuid) -> Option<Post> {
        let post = self.posts.remove(&id)?;
        self.comments.retain(|_, c| c.post_id != id);
        Some(post)
    }
}

/// In-memory implementation of all repositories.
///
/// Note: Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out one store behind every repository port.
    pub fn repositories(self: Arc<Self>) -> Repositories {
        Repositories {
            users: self.clone(),
            categories: self.clone(),
            locations: self.clone(),
            posts: self.clone(),
            comments: self,
        }
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        let clash = tables.users.values().any(|u| {
            u.id != user.id && (u.username == user.username || u.email == user.email)
        });
        if clash {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.users.remove(&id).ok_or(RepoError::NotFound)?;

        let owned: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            tables.remove_post(post_id);
        }
        tables.comments.retain(|_, c| c.author_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn save(&self, category: Category) -> Result<Category, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .categories
            .values()
            .any(|c| c.id != category.id && c.slug == category.slug)
        {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.categories.remove(&id).ok_or(RepoError::NotFound)?;
        for post in tables.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.categories.values().find(|c| c.slug == slug).cloned())
    }
}

#[async_trait]
impl BaseRepository<Location, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>, RepoError> {
        Ok(self.tables.read().await.locations.get(&id).cloned())
    }

    async fn save(&self, location: Location) -> Result<Location, RepoError> {
        let mut tables = self.tables.write().await;
        tables.locations.insert(location.id, location.clone());
        Ok(location)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.locations.remove(&id).ok_or(RepoError::NotFound)?;
        for post in tables.posts.values_mut() {
            if post.location_id == Some(id) {
                post.location_id = None;
            }
        }
        Ok(())
    }
}

impl LocationRepository for InMemoryStore {}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        let dangling = !tables.users.contains_key(&post.author_id)
            || post
                .category_id
                .is_some_and(|id| !tables.categories.contains_key(&id))
            || post
                .location_id
                .is_some_and(|id| !tables.locations.contains_key(&id));
        if dangling {
            return Err(RepoError::Constraint(
                "Referenced entity does not exist".to_string(),
            ));
        }
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.remove_post(id).ok_or(RepoError::NotFound)?;
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_entry(&self, id: Uuid) -> Result<Option<PostEntry>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&id).and_then(|post| tables.entry(post)))
    }

    async fn count_entries(
        &self,
        scope: PostScope,
        visibility: Visibility,
    ) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.feed(scope, visibility).len() as u64)
    }

    async fn list_entries(
        &self,
        scope: PostScope,
        visibility: Visibility,
        window: PageWindow,
    ) -> Result<Vec<PostEntry>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .feed(scope, visibility)
            .into_iter()
            .skip(window.offset() as usize)
            .take(window.limit() as usize)
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn save(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&comment.post_id)
            || !tables.users.contains_key(&comment.author_id)
        {
            return Err(RepoError::Constraint(
                "Referenced entity does not exist".to_string(),
            ));
        }
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.comments.remove(&id).ok_or(RepoError::NotFound)?;
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError> {
        let tables = self.tables.read().await;
        let mut entries: Vec<CommentEntry> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .filter_map(|c| {
                let author: Author = tables.users.get(&c.author_id).map(User::author)?;
                Some(CommentEntry {
                    comment: c.clone(),
                    author,
                })
            })
            .collect();
        entries.sort_by_key(|e| (e.comment.created_at, e.comment.id));
        Ok(entries)
    }

    async fn count_by_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError> {
        let tables = self.tables.read().await;
        let mut counts = HashMap::new();
        for comment in tables.comments.values() {
            if post_ids.contains(&comment.post_id) {
                *counts.entry(comment.post_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use blogicum_core::domain::PostDraft;

    use super::*;

    async fn seed(store: &InMemoryStore) -> (User, Post) {
        let author = BaseRepository::<User, Uuid>::save(
            store,
            User::new("author".into(), "author@example.com".into(), "hash".into()),
        )
        .await
        .unwrap();
        let post = Post::new(
            author.id,
            PostDraft {
                title: "Hello".into(),
                text: "World".into(),
                pub_date: Utc::now(),
                image: None,
                is_published: true,
                location_id: None,
                category_id: None,
            },
        );
        let post = BaseRepository::<Post, Uuid>::save(store, post).await.unwrap();
        (author, post)
    }

    #[tokio::test]
    async fn test_deleting_post_cascades_to_comments() {
        let store = InMemoryStore::new();
        let (author, post) = seed(&store).await;
        let comment = Comment::new(author.id, post.id, "first".into());
        BaseRepository::<Comment, Uuid>::save(&store, comment.clone())
            .await
            .unwrap();

        BaseRepository::<Post, Uuid>::delete(&store, post.id)
            .await
            .unwrap();

        let found = BaseRepository::<Comment, Uuid>::find_by_id(&store, comment.id)
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_deleting_category_nulls_post_reference() {
        let store = InMemoryStore::new();
        let (_, post) = seed(&store).await;
        let category = BaseRepository::<Category, Uuid>::save(
            &store,
            Category::new("Travel".into(), "Trips".into(), "travel".into()),
        )
        .await
        .unwrap();
        let mut categorized = post.clone();
        categorized.category_id = Some(category.id);
        BaseRepository::<Post, Uuid>::save(&store, categorized)
            .await
            .unwrap();

        BaseRepository::<Category, Uuid>::delete(&store, category.id)
            .await
            .unwrap();

        let reloaded = BaseRepository::<Post, Uuid>::find_by_id(&store, post.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.category_id, None);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_a_constraint_violation() {
        let store = InMemoryStore::new();
        seed(&store).await;
        let result = BaseRepository::<User, Uuid>::save(
            &store,
            User::new("author".into(), "other@example.com".into(), "hash".into()),
        )
        .await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_comments_with_equal_timestamps_list_in_stable_order() {
        let store = InMemoryStore::new();
        let (author, post) = seed(&store).await;
        let at = Utc::now();
        let mut ids = Vec::new();
        for text in ["a", "b", "c", "d", "e"] {
            let mut comment = Comment::new(author.id, post.id, text.into());
            comment.created_at = at;
            ids.push(comment.id);
            BaseRepository::<Comment, Uuid>::save(&store, comment)
                .await
                .unwrap();
        }
        ids.sort();

        let listed: Vec<Uuid> = store
            .list_for_post(post.id)
            .await
            .unwrap()
            .iter()
            .map(|e| e.comment.id)
            .collect();
        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn test_comment_on_missing_post_is_rejected() {
        let store = InMemoryStore::new();
        let (author, _) = seed(&store).await;
        let orphan = Comment::new(author.id, Uuid::new_v4(), "lost".into());
        let result = BaseRepository::<Comment, Uuid>::save(&store, orphan).await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }
}
