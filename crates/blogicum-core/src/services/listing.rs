//! Feed and detail assembly.
//!
//! Every read goes base collection -> publication gate -> `pub_date` order ->
//! page slice -> comment counts. The gate, ordering and slicing run in the
//! store; counts are attached to the page afterwards.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Category, CommentEntry, PostView, UserProfile};
use crate::error::DomainError;
use crate::pagination::{DEFAULT_PAGE_SIZE, Page, PageRequest, PageWindow};
use crate::ports::{
    CategoryRepository, CommentRepository, PostRepository, PostScope, Repositories,
    UserRepository,
};
use crate::visibility::Visibility;

use super::CommentAggregator;

/// Which feed is being read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedContext {
    Home,
    Category { slug: String },
    Profile { username: String },
}

/// What the feed page is about.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "subject", rename_all = "snake_case")]
pub enum FeedHeading {
    Home,
    Category(Category),
    Profile(UserProfile),
}

#[derive(Debug, Clone, Serialize)]
pub struct Feed {
    pub heading: FeedHeading,
    pub page: Page<PostView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: PostView,
    pub comments: Vec<CommentEntry>,
}

#[derive(Clone)]
pub struct ListingService {
    users: Arc<dyn UserRepository>,
    categories: Arc<dyn CategoryRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    aggregator: CommentAggregator,
    page_size: u64,
}

impl ListingService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            users: repos.users.clone(),
            categories: repos.categories.clone(),
            posts: repos.posts.clone(),
            comments: repos.comments.clone(),
            aggregator: CommentAggregator::new(repos.comments.clone()),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub async fn assemble(
        &self,
        context: FeedContext,
        viewer: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Feed, DomainError> {
        let now = Utc::now();
        let (heading, scope, visibility) = match context {
            FeedContext::Home => (
                FeedHeading::Home,
                PostScope::All,
                Visibility::PublishedAsOf(now),
            ),
            FeedContext::Category { slug } => {
                let category = self
                    .categories
                    .find_by_slug(&slug)
                    .await?
                    .filter(|c| c.is_published)
                    .ok_or_else(|| DomainError::not_found("category", &slug))?;
                let scope = PostScope::Category(category.id);
                (
                    FeedHeading::Category(category),
                    scope,
                    Visibility::PublishedAsOf(now),
                )
            }
            FeedContext::Profile { username } => {
                let owner = self
                    .users
                    .find_by_username(&username)
                    .await?
                    .ok_or_else(|| DomainError::not_found("user", &username))?;
                // Author self-view: the owner sees drafts and scheduled posts too.
                let bypass = viewer == Some(owner.id);
                (
                    FeedHeading::Profile(owner.profile()),
                    PostScope::Author(owner.id),
                    Visibility::for_viewer(bypass, now),
                )
            }
        };

        let page = self.paginate(scope, visibility, page).await?;
        Ok(Feed { heading, page })
    }

    /// A single post with its comments. Hidden posts are reported as missing
    /// to everyone but their author.
    pub async fn detail(
        &self,
        post_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<PostDetail, DomainError> {
        let entry = self
            .posts
            .find_entry(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;

        let bypass = viewer == Some(entry.post.author_id);
        if !Visibility::for_viewer(bypass, Utc::now()).admits_entry(&entry) {
            tracing::debug!(post = %post_id, "Post hidden from viewer");
            return Err(DomainError::not_found("post", post_id));
        }

        let comments = self.comments.list_for_post(post_id).await?;
        let count = comments.len() as u64;
        Ok(PostDetail {
            post: PostView::new(entry, count),
            comments,
        })
    }

    async fn paginate(
        &self,
        scope: PostScope,
        visibility: Visibility,
        request: PageRequest,
    ) -> Result<Page<PostView>, DomainError> {
        let total = self.posts.count_entries(scope, visibility).await?;
        let window = PageWindow::resolve(request, self.page_size, total);
        tracing::debug!(
            ?scope,
            unrestricted = visibility.is_unrestricted(),
            total,
            page = window.number,
            "Assembling feed page"
        );

        let entries = self.posts.list_entries(scope, visibility, window).await?;
        let views = self.aggregator.annotate(entries).await?;
        Ok(Page::new(views, window))
    }
}
