use std::sync::Arc;

use crate::domain::{PostEntry, PostView};
use crate::error::DomainError;
use crate::ports::CommentRepository;

/// Attaches comment counts computed from the comment table at read time.
///
/// Nothing is persisted, so a count can never lag behind committed comments.
#[derive(Clone)]
pub struct CommentAggregator {
    comments: Arc<dyn CommentRepository>,
}

impl CommentAggregator {
    pub fn new(comments: Arc<dyn CommentRepository>) -> Self {
        Self { comments }
    }

    /// Annotate entries with their counts, keeping the input order.
    pub async fn annotate(&self, entries: Vec<PostEntry>) -> Result<Vec<PostView>, DomainError> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<_> = entries.iter().map(|e| e.post.id).collect();
        let counts = self.comments.count_by_posts(&ids).await?;

        Ok(entries
            .into_iter()
            .map(|entry| {
                let count = counts.get(&entry.post.id).copied().unwrap_or(0);
                PostView::new(entry, count)
            })
            .collect())
    }
}
