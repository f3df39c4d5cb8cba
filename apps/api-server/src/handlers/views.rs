//! Mapping between core types and wire DTOs, plus the redirect responses
//! every mutation ends with.

use actix_web::{HttpResponse, http::header};

use blogicum_core::Page;
use blogicum_core::domain::{
    Author, Category, Comment, CommentDraft, CommentEntry, Location, Post, PostDraft, PostView,
    ProfileDraft, User, UserProfile,
};
use blogicum_core::services::{Feed, FeedHeading, Outcome, PostDetail, Redirect};
use blogicum_shared::dto::{
    AuthorResponse, CategoryResponse, CommentRequest, CommentResponse, FeedHeadingResponse,
    FeedResponse, LocationResponse, PageResponse, PostDetailResponse, PostRequest, PostResponse,
    ProfileRequest, ProfileResponse, RedirectResponse, UserResponse,
};

/// Where a redirect sends the client.
pub fn redirect_path(redirect: &Redirect) -> String {
    match redirect {
        Redirect::PostDetail { post_id } => format!("/api/posts/{post_id}"),
        Redirect::Profile { username } => format!("/api/profile/{username}"),
    }
}

/// `303 See Other` pointing at `redirect`.
pub fn see_other(redirect: &Redirect) -> HttpResponse {
    let location = redirect_path(redirect);
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.clone()))
        .json(RedirectResponse { location })
}

/// Render a finished use case, or send a denied actor to the fallback view.
pub fn settle<T>(outcome: Outcome<T>, done: impl FnOnce(T) -> HttpResponse) -> HttpResponse {
    match outcome {
        Outcome::Done(value) => done(value),
        Outcome::Denied(redirect) => see_other(&redirect),
    }
}

// Requests

pub fn post_draft(req: PostRequest) -> PostDraft {
    PostDraft {
        title: req.title,
        text: req.text,
        pub_date: req.pub_date,
        image: req.image,
        is_published: req.is_published,
        location_id: req.location_id,
        category_id: req.category_id,
    }
}

pub fn comment_draft(req: CommentRequest) -> CommentDraft {
    CommentDraft { text: req.text }
}

pub fn profile_draft(req: ProfileRequest) -> ProfileDraft {
    ProfileDraft {
        username: req.username,
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
    }
}

// Edit forms, pre-filled with current values

pub fn post_form(post: Post) -> PostRequest {
    PostRequest {
        title: post.title,
        text: post.text,
        pub_date: post.pub_date,
        image: post.image,
        is_published: post.is_published,
        location_id: post.location_id,
        category_id: post.category_id,
    }
}

pub fn comment_form(comment: Comment) -> CommentRequest {
    CommentRequest { text: comment.text }
}

pub fn profile_form(user: User) -> ProfileRequest {
    ProfileRequest {
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
    }
}

// Views

pub fn user_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        created_at: user.created_at,
    }
}

fn author_response(author: Author) -> AuthorResponse {
    AuthorResponse {
        id: author.id,
        username: author.username,
    }
}

fn category_response(category: Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        title: category.title,
        description: category.description,
        slug: category.slug,
    }
}

fn location_response(location: Location) -> LocationResponse {
    LocationResponse {
        id: location.id,
        name: location.name,
    }
}

fn profile_response(profile: UserProfile) -> ProfileResponse {
    ProfileResponse {
        id: profile.id,
        username: profile.username,
        first_name: profile.first_name,
        last_name: profile.last_name,
        joined_at: profile.joined_at,
    }
}

fn post_response(view: PostView) -> PostResponse {
    let PostView {
        post,
        author,
        category,
        location,
        comment_count,
    } = view;
    PostResponse {
        id: post.id,
        title: post.title,
        text: post.text,
        pub_date: post.pub_date,
        image: post.image,
        is_published: post.is_published,
        created_at: post.created_at,
        author: author_response(author),
        category: category.map(category_response),
        location: location.map(location_response),
        comment_count,
    }
}

fn comment_response(entry: CommentEntry) -> CommentResponse {
    CommentResponse {
        id: entry.comment.id,
        post_id: entry.comment.post_id,
        text: entry.comment.text,
        created_at: entry.comment.created_at,
        author: author_response(entry.author),
    }
}

fn page_response(page: Page<PostView>) -> PageResponse<PostResponse> {
    let (has_next, has_previous) = (page.has_next(), page.has_previous());
    let page = page.map(post_response);
    PageResponse {
        items: page.items,
        number: page.number,
        page_size: page.page_size,
        total_items: page.total_items,
        total_pages: page.total_pages,
        has_next,
        has_previous,
    }
}

pub fn feed_response(feed: Feed) -> FeedResponse {
    let heading = match feed.heading {
        FeedHeading::Home => FeedHeadingResponse::Home,
        FeedHeading::Category(category) => FeedHeadingResponse::Category {
            category: category_response(category),
        },
        FeedHeading::Profile(profile) => FeedHeadingResponse::Profile {
            profile: profile_response(profile),
        },
    };
    FeedResponse {
        heading,
        page: page_response(feed.page),
    }
}

pub fn detail_response(detail: PostDetail) -> PostDetailResponse {
    PostDetailResponse {
        post: post_response(detail.post),
        comments: detail.comments.into_iter().map(comment_response).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_redirect_paths() {
        let id = Uuid::new_v4();
        assert_eq!(
            redirect_path(&Redirect::PostDetail { post_id: id }),
            format!("/api/posts/{id}")
        );
        assert_eq!(
            redirect_path(&Redirect::Profile {
                username: "alice".into()
            }),
            "/api/profile/alice"
        );
    }

    #[test]
    fn test_denied_outcome_is_see_other() {
        let outcome: Outcome<()> = Outcome::Denied(Redirect::Profile {
            username: "bob".into(),
        });
        let response = settle(outcome, |_| HttpResponse::Ok().finish());

        assert_eq!(response.status(), actix_web::http::StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/api/profile/bob"
        );
    }
}
