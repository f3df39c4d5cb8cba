//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod feeds;
mod health;
mod posts;
mod profiles;
mod views;

use actix_web::web;

use crate::middleware::error::json_error;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error));
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            .service(
                web::scope("/posts")
                    .service(
                        web::resource("")
                            .route(web::get().to(feeds::home))
                            .route(web::post().to(posts::create)),
                    )
                    .route("/{id}", web::get().to(feeds::detail))
                    .service(
                        web::resource("/{id}/edit")
                            .route(web::get().to(posts::edit_form))
                            .route(web::put().to(posts::update))
                            .route(web::delete().to(posts::delete)),
                    )
                    .route("/{id}/comments", web::post().to(comments::create))
                    .service(
                        web::resource("/{id}/comments/{comment_id}")
                            .route(web::get().to(comments::edit_form))
                            .route(web::put().to(comments::update))
                            .route(web::delete().to(comments::delete)),
                    ),
            )
            .route("/category/{slug}", web::get().to(feeds::category))
            .route("/profile/{username}", web::get().to(feeds::profile))
            .service(
                web::resource("/profile/{username}/edit")
                    .route(web::get().to(profiles::edit_form))
                    .route(web::put().to(profiles::update)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test, web};
    use serde_json::{Value, json};

    use blogicum_infra::{InMemoryStore, JwtConfig};
    use blogicum_shared::dto::{AuthResponse, FeedResponse, PostDetailResponse};

    use super::configure_routes;
    use crate::state::AppState;

    fn state() -> AppState {
        let repos = Arc::new(InMemoryStore::new()).repositories();
        let jwt = JwtConfig {
            secret: "handler-test-secret".to_string(),
            ..JwtConfig::default()
        };
        AppState::with_repositories(repos, 10, jwt)
    }

    macro_rules! register {
        ($app:expr, $name:expr) => {{
            let req = test::TestRequest::post()
                .uri("/api/auth/register")
                .set_json(json!({
                    "username": $name,
                    "email": format!("{}@example.com", $name),
                    "password": "correct horse battery",
                }))
                .to_request();
            let auth: AuthResponse = test::call_and_read_body_json(&$app, req).await;
            format!("Bearer {}", auth.access_token)
        }};
    }

    fn new_post(title: &str) -> Value {
        json!({
            "title": title,
            "text": "body",
            "pub_date": "2020-01-01T00:00:00Z",
        })
    }

    #[actix_web::test]
    async fn test_health() {
        let app = test::init_service(App::new().configure(configure_routes)).await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_post_lifecycle_redirects() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(configure_routes),
        )
        .await;
        let alice = register!(app, "alice");
        let bob = register!(app, "bob");

        // Anonymous writes never reach the use case.
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(new_post("anonymous"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, alice.clone()))
            .set_json(new_post("hello"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers().get(header::LOCATION).unwrap(),
            "/api/profile/alice"
        );

        let req = test::TestRequest::get().uri("/api/posts?page=abc").to_request();
        let feed: FeedResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(feed.page.items.len(), 1);
        assert_eq!(feed.page.number, 1);
        let post_id = feed.page.items[0].id;

        // Bob is bounced back to the post he tried to delete.
        let req = test::TestRequest::delete()
            .uri(&format!("/api/posts/{post_id}/edit"))
            .insert_header((header::AUTHORIZATION, bob.clone()))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers().get(header::LOCATION).unwrap().to_str().unwrap(),
            format!("/api/posts/{post_id}")
        );

        let req = test::TestRequest::post()
            .uri(&format!("/api/posts/{post_id}/comments"))
            .insert_header((header::AUTHORIZATION, bob))
            .set_json(json!({ "text": "nice" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{post_id}"))
            .to_request();
        let detail: PostDetailResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(detail.post.comment_count, 1);
        assert_eq!(detail.comments[0].author.username, "bob");

        let req = test::TestRequest::delete()
            .uri(&format!("/api/posts/{post_id}/edit"))
            .insert_header((header::AUTHORIZATION, alice))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{post_id}"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_invalid_form_is_unprocessable() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(configure_routes),
        )
        .await;
        let alice = register!(app, "alice");

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, alice))
            .set_json(new_post(""))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["invalid_fields"][0]["field"], "title");
    }

    #[actix_web::test]
    async fn test_undecodable_form_is_unprocessable() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(configure_routes),
        )
        .await;
        let alice = register!(app, "alice");

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, alice))
            .set_json(json!({ "text": "body", "pub_date": "2020-01-01T00:00:00Z" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["invalid_fields"][0]["field"], "title");
    }

    #[actix_web::test]
    async fn test_repeated_page_parameter_falls_back_to_first_page() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/posts?page=1&page=2")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let feed: FeedResponse = test::read_body_json(res).await;
        assert_eq!(feed.page.number, 1);
    }

    #[actix_web::test]
    async fn test_unknown_category_is_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/category/missing")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
