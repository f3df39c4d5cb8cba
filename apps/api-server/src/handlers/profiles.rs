use actix_web::{HttpResponse, web};

use blogicum_shared::dto::ProfileRequest;

use super::views::{profile_draft, profile_form, see_other, settle};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/profile/{username}/edit
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    username: web::Path<String>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .profiles
        .edit_form(identity.user_id, &username)
        .await?;
    Ok(settle(outcome, |user| {
        HttpResponse::Ok().json(profile_form(user))
    }))
}

/// PUT /api/profile/{username}/edit
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    username: web::Path<String>,
    body: web::Json<ProfileRequest>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .profiles
        .update(identity.user_id, &username, profile_draft(body.into_inner()))
        .await?;
    Ok(settle(outcome, |updated| see_other(&updated.next)))
}
