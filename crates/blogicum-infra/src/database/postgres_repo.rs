//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Select, SelectTwo,
};
use uuid::Uuid;

use blogicum_core::domain::{Author, Category, CommentEntry, PostEntry, User};
use blogicum_core::error::RepoError;
use blogicum_core::pagination::PageWindow;
use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, PostScope,
    UserRepository,
};
use blogicum_core::visibility::Visibility;

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::location::{self, Entity as LocationEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, repo_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL location repository.
pub type PostgresLocationRepository = PostgresBaseRepository<LocationEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = match email.split_once('@') {
            Some((local, domain)) if local.len() > 1 => format!("{}***@{}", &local[..1], domain),
            Some((_, domain)) => format!("***@{}", domain),
            None => "***".to_string(),
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.map(Into::into))
    }
}

impl LocationRepository for PostgresLocationRepository {}

/// The publication gate as a SQL condition over `posts` left-joined with `categories`.
fn gate(visibility: Visibility) -> Condition {
    match visibility {
        Visibility::Unrestricted => Condition::all(),
        Visibility::PublishedAsOf(now) => Condition::all()
            .add(post::Column::IsPublished.eq(true))
            .add(post::Column::PubDate.lte(now))
            .add(
                Condition::any()
                    .add(post::Column::CategoryId.is_null())
                    .add(category::Column::IsPublished.eq(true)),
            ),
    }
}

fn in_scope(scope: PostScope) -> Condition {
    match scope {
        PostScope::All => Condition::all(),
        PostScope::Category(id) => Condition::all().add(post::Column::CategoryId.eq(id)),
        PostScope::Author(id) => Condition::all().add(post::Column::AuthorId.eq(id)),
    }
}

/// Posts in `scope` passing `visibility`, for counting.
pub(crate) fn feed_query(scope: PostScope, visibility: Visibility) -> Select<PostEntity> {
    PostEntity::find()
        .left_join(CategoryEntity)
        .filter(in_scope(scope))
        .filter(gate(visibility))
}

/// One feed page, newest first, with each post's category.
pub(crate) fn page_query(
    scope: PostScope,
    visibility: Visibility,
    window: PageWindow,
) -> SelectTwo<PostEntity, CategoryEntity> {
    PostEntity::find()
        .find_also_related(CategoryEntity)
        .filter(in_scope(scope))
        .filter(gate(visibility))
        .order_by_desc(post::Column::PubDate)
        .order_by_desc(post::Column::CreatedAt)
        .offset(window.offset())
        .limit(window.limit())
}

/// Comments under a post, oldest first; `id` keeps equal timestamps stable.
pub(crate) fn thread_query(post_id: Uuid) -> SelectTwo<CommentEntity, UserEntity> {
    CommentEntity::find()
        .filter(comment::Column::PostId.eq(post_id))
        .find_also_related(UserEntity)
        .order_by_asc(comment::Column::CreatedAt)
        .order_by_asc(comment::Column::Id)
}

/// `post_id, COUNT(id)` grouped per post.
pub(crate) fn comment_counts_query(post_ids: &[Uuid]) -> Select<CommentEntity> {
    CommentEntity::find()
        .select_only()
        .column(comment::Column::PostId)
        .column_as(
            Expr::col((CommentEntity, comment::Column::Id)).count(),
            "comment_count",
        )
        .filter(comment::Column::PostId.is_in(post_ids.iter().copied()))
        .group_by(comment::Column::PostId)
}

impl PostgresPostRepository {
    /// Resolve authors and locations for a batch of posts in two queries.
    async fn hydrate(
        &self,
        rows: Vec<(post::Model, Option<category::Model>)>,
    ) -> Result<Vec<PostEntry>, RepoError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let author_ids: Vec<Uuid> = rows.iter().map(|(p, _)| p.author_id).collect();
        let location_ids: Vec<Uuid> = rows.iter().filter_map(|(p, _)| p.location_id).collect();

        let authors: HashMap<Uuid, Author> = UserEntity::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(&self.db)
            .await
            .map_err(repo_error)?
            .into_iter()
            .map(|u| (u.id, Author { id: u.id, username: u.username }))
            .collect();

        let mut locations: HashMap<Uuid, location::Model> = HashMap::new();
        if !location_ids.is_empty() {
            locations = LocationEntity::find()
                .filter(location::Column::Id.is_in(location_ids))
                .all(&self.db)
                .await
                .map_err(repo_error)?
                .into_iter()
                .map(|l| (l.id, l))
                .collect();
        }

        rows.into_iter()
            .map(|(post, category)| {
                let author = authors
                    .get(&post.author_id)
                    .cloned()
                    .ok_or_else(|| RepoError::Query(format!("post {} has no author", post.id)))?;
                let location = post
                    .location_id
                    .and_then(|id| locations.get(&id).cloned())
                    .map(Into::into);
                Ok(PostEntry {
                    post: post.into(),
                    author,
                    category: category.map(Into::into),
                    location,
                })
            })
            .collect()
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_entry(&self, id: Uuid) -> Result<Option<PostEntry>, RepoError> {
        let row = PostEntity::find_by_id(id)
            .find_also_related(CategoryEntity)
            .one(&self.db)
            .await
            .map_err(repo_error)?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn count_entries(
        &self,
        scope: PostScope,
        visibility: Visibility,
    ) -> Result<u64, RepoError> {
        feed_query(scope, visibility)
            .count(&self.db)
            .await
            .map_err(repo_error)
    }

    async fn list_entries(
        &self,
        scope: PostScope,
        visibility: Visibility,
        window: PageWindow,
    ) -> Result<Vec<PostEntry>, RepoError> {
        tracing::debug!(?scope, offset = window.offset(), limit = window.limit(), "Listing posts");

        let rows = page_query(scope, visibility, window)
            .all(&self.db)
            .await
            .map_err(repo_error)?;

        self.hydrate(rows).await
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError> {
        let rows = thread_query(post_id)
            .all(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(rows
            .into_iter()
            .filter_map(|(comment, author)| match author {
                Some(author) => Some(CommentEntry {
                    author: Author {
                        id: author.id,
                        username: author.username,
                    },
                    comment: comment.into(),
                }),
                None => {
                    tracing::warn!(comment = %comment.id, "Comment without author skipped");
                    None
                }
            })
            .collect())
    }

    async fn count_by_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(Uuid, i64)> = comment_counts_query(post_ids)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(rows
            .into_iter()
            .map(|(post_id, count)| (post_id, count.max(0) as u64))
            .collect())
    }
}
