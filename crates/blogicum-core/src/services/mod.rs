//! Use cases: feed assembly and the author-only mutations.

mod aggregation;
mod comments;
mod gatekeeper;
mod listing;
mod posts;
mod profile;

pub use aggregation::CommentAggregator;
pub use comments::CommentService;
pub use gatekeeper::{
    Action, Authored, Authorization, Mutation, Outcome, Redirect, authorize, authorize_profile,
};
pub use listing::{Feed, FeedContext, FeedHeading, ListingService, PostDetail};
pub use posts::PostService;
pub use profile::ProfileService;
