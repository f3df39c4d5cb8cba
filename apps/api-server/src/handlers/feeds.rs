//! Read side: the three feeds and the post detail page.

use actix_web::{HttpRequest, HttpResponse, web};
use uuid::Uuid;

use blogicum_core::PageRequest;
use blogicum_core::services::FeedContext;
use blogicum_shared::dto::PageQuery;

use super::views::{detail_response, feed_response};
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

async fn feed(
    state: &AppState,
    context: FeedContext,
    viewer: OptionalIdentity,
    req: &HttpRequest,
) -> AppResult<HttpResponse> {
    let feed = state
        .listing
        .assemble(context, viewer.user_id(), requested_page(req))
        .await?;
    Ok(HttpResponse::Ok().json(feed_response(feed)))
}

/// A query string that does not parse reads as no page at all.
fn requested_page(req: &HttpRequest) -> PageRequest {
    let query = web::Query::<PageQuery>::from_query(req.query_string())
        .map(web::Query::into_inner)
        .unwrap_or_default();
    PageRequest::parse(query.page.as_deref())
}

/// GET /api/posts?page=
pub async fn home(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    req: HttpRequest,
) -> AppResult<HttpResponse> {
    feed(&state, FeedContext::Home, viewer, &req).await
}

/// GET /api/category/{slug}?page=
pub async fn category(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    slug: web::Path<String>,
    req: HttpRequest,
) -> AppResult<HttpResponse> {
    let context = FeedContext::Category {
        slug: slug.into_inner(),
    };
    feed(&state, context, viewer, &req).await
}

/// GET /api/profile/{username}?page=
pub async fn profile(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    username: web::Path<String>,
    req: HttpRequest,
) -> AppResult<HttpResponse> {
    let context = FeedContext::Profile {
        username: username.into_inner(),
    };
    feed(&state, context, viewer, &req).await
}

/// GET /api/posts/{id}
pub async fn detail(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    post_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let detail = state
        .listing
        .detail(post_id.into_inner(), viewer.user_id())
        .await?;
    Ok(HttpResponse::Ok().json(detail_response(detail)))
}
