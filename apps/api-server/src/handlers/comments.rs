//! Comment mutations, addressed as `/posts/{post_id}/comments/{comment_id}`.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blogicum_shared::dto::CommentRequest;

use super::views::{comment_draft, comment_form, see_other, settle};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts/{id}/comments
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    post_id: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let created = state
        .comments
        .create(
            identity.user_id,
            post_id.into_inner(),
            comment_draft(body.into_inner()),
        )
        .await?;
    Ok(see_other(&created.next))
}

/// GET /api/posts/{id}/comments/{comment_id}
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let outcome = state
        .comments
        .edit_form(identity.user_id, post_id, comment_id)
        .await?;
    Ok(settle(outcome, |comment| {
        HttpResponse::Ok().json(comment_form(comment))
    }))
}

/// PUT /api/posts/{id}/comments/{comment_id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let outcome = state
        .comments
        .update(
            identity.user_id,
            post_id,
            comment_id,
            comment_draft(body.into_inner()),
        )
        .await?;
    Ok(settle(outcome, |updated| see_other(&updated.next)))
}

/// DELETE /api/posts/{id}/comments/{comment_id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let outcome = state
        .comments
        .delete(identity.user_id, post_id, comment_id)
        .await?;
    Ok(settle(outcome, |next| see_other(&next)))
}
