//! Registration and login. The bearer token they hand out is what
//! `Identity` later reads as the current user.

use actix_web::{HttpResponse, web};
use validator::Validate;

use blogicum_core::domain::{ProfileDraft, User};
use blogicum_core::{DomainError, FieldError};
use blogicum_shared::dto::{AuthResponse, LoginRequest, RegisterUserRequest};

use super::views::user_response;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;

fn issue_token(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let token = state.tokens.generate_token(user.id, &user.username)?;

    Ok(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
        user: user_response(user),
    })
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let account = ProfileDraft {
        username: req.username,
        first_name: String::new(),
        last_name: String::new(),
        email: req.email,
    };
    let mut errors = match account.validate() {
        Ok(()) => Vec::new(),
        Err(e) => match DomainError::from(e) {
            DomainError::Validation(fields) => fields,
            other => return Err(other.into()),
        },
    };
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    let users = &state.repos.users;
    if users.find_by_username(&account.username).await?.is_some() {
        errors.push(FieldError::new("username", "already taken"));
    }
    if users.find_by_email(&account.email).await?.is_some() {
        errors.push(FieldError::new("email", "already registered"));
    }
    if !errors.is_empty() {
        return Err(DomainError::Validation(errors).into());
    }

    let password_hash = state.passwords.hash(&req.password)?;
    let user = users
        .save(User::new(account.username, account.email, password_hash))
        .await?;
    tracing::info!(user = %user.id, "User registered");

    Ok(HttpResponse::Created().json(issue_token(&state, user)?))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .repos
        .users
        .find_by_username(&req.username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        tracing::warn!(username = %req.username, "Failed login");
        return Err(AppError::Unauthorized);
    }

    Ok(HttpResponse::Ok().json(issue_token(&state, user)?))
}

/// GET /api/auth/me
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .repos
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(HttpResponse::Ok().json(user_response(user)))
}
