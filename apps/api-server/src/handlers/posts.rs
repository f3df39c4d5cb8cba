//! Post mutations. Every branch ends in a redirect, including denials.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blogicum_shared::dto::PostRequest;

use super::views::{post_draft, post_form, see_other, settle};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    tracing::debug!(author = %identity.username, "Creating post");
    let created = state
        .posts
        .create(identity.user_id, post_draft(body.into_inner()))
        .await?;
    Ok(see_other(&created.next))
}

/// GET /api/posts/{id}/edit
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    post_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .posts
        .edit_form(identity.user_id, post_id.into_inner())
        .await?;
    Ok(settle(outcome, |post| {
        HttpResponse::Ok().json(post_form(post))
    }))
}

/// PUT /api/posts/{id}/edit
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    post_id: web::Path<Uuid>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .posts
        .update(
            identity.user_id,
            post_id.into_inner(),
            post_draft(body.into_inner()),
        )
        .await?;
    Ok(settle(outcome, |updated| see_other(&updated.next)))
}

/// DELETE /api/posts/{id}/edit
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    post_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .posts
        .delete(identity.user_id, post_id.into_inner())
        .await?;
    Ok(settle(outcome, |next| see_other(&next)))
}
