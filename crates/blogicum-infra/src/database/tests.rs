use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, QueryTrait, Value};
use uuid::Uuid;

use blogicum_core::domain::{Category, Post};
use blogicum_core::pagination::{PageRequest, PageWindow};
use blogicum_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, PostRepository, PostScope,
};
use blogicum_core::visibility::Visibility;

use crate::database::entity::{category, post, user};
use crate::database::postgres_repo::{
    PostgresCategoryRepository, PostgresCommentRepository, PostgresPostRepository,
    comment_counts_query, feed_query, page_query, thread_query,
};

fn post_model(author_id: Uuid, category_id: Option<Uuid>) -> post::Model {
    let now = Utc::now();
    post::Model {
        id: Uuid::new_v4(),
        author_id,
        title: "Test Post".to_owned(),
        text: "Content".to_owned(),
        pub_date: now.into(),
        image: None,
        is_published: true,
        location_id: None,
        category_id,
        created_at: now.into(),
    }
}

fn category_model() -> category::Model {
    category::Model {
        id: Uuid::new_v4(),
        title: "Travel".to_owned(),
        description: "Trips".to_owned(),
        slug: "travel".to_owned(),
        is_published: true,
        created_at: Utc::now().into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let model = post_model(Uuid::new_v4(), None);
    let post_id = model.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.expect("post should be found");
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, post_id);
}

#[tokio::test]
async fn test_find_category_by_slug() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![category_model()]])
        .into_connection();

    let repo = PostgresCategoryRepository::new(db);

    let result: Option<Category> = repo.find_by_slug("travel").await.unwrap();

    assert_eq!(result.map(|c| c.slug), Some("travel".to_string()));
}

#[tokio::test]
async fn test_find_entry_joins_author_and_category() {
    let category = category_model();
    let author = user::Model {
        id: Uuid::new_v4(),
        username: "writer".to_owned(),
        email: "writer@example.com".to_owned(),
        first_name: String::new(),
        last_name: String::new(),
        password_hash: "hash".to_owned(),
        created_at: Utc::now().into(),
        updated_at: Utc::now().into(),
    };
    let model = post_model(author.id, Some(category.id));
    let post_id = model.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![(model, Some(category))]])
        .append_query_results(vec![vec![author]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let entry = repo.find_entry(post_id).await.unwrap().unwrap();

    assert_eq!(entry.post.id, post_id);
    assert_eq!(entry.author.username, "writer");
    assert_eq!(entry.category.map(|c| c.slug), Some("travel".to_string()));
    assert!(entry.location.is_none());
}

fn sql(query: impl QueryTrait) -> String {
    query.build(DatabaseBackend::Postgres).to_string()
}

const GATE_CLAUSES: [&str; 3] = [
    r#""posts"."is_published" = TRUE"#,
    r#""posts"."pub_date" <="#,
    r#""posts"."category_id" IS NULL OR "categories"."is_published" = TRUE"#,
];

#[test]
fn test_public_feed_applies_publication_gate() {
    let query = sql(feed_query(PostScope::All, Visibility::PublishedAsOf(Utc::now())));

    assert!(query.contains(r#"LEFT JOIN "categories""#), "{query}");
    for clause in GATE_CLAUSES {
        assert!(query.contains(clause), "missing {clause} in {query}");
    }
}

#[test]
fn test_unrestricted_feed_skips_publication_gate() {
    let author_id = Uuid::new_v4();
    let query = sql(feed_query(PostScope::Author(author_id), Visibility::Unrestricted));

    assert!(query.contains(&format!(r#""posts"."author_id" = '{author_id}'"#)), "{query}");
    for clause in GATE_CLAUSES {
        assert!(!query.contains(clause), "unexpected {clause} in {query}");
    }
}

#[test]
fn test_page_query_orders_newest_first_within_window() {
    let category_id = Uuid::new_v4();
    let window = PageWindow::resolve(PageRequest::Number(3), 10, 25);
    let query = sql(page_query(
        PostScope::Category(category_id),
        Visibility::PublishedAsOf(Utc::now()),
        window,
    ));

    assert!(query.contains(&format!(r#""posts"."category_id" = '{category_id}'"#)), "{query}");
    assert!(query.contains(GATE_CLAUSES[2]), "{query}");
    assert!(
        query.contains(r#"ORDER BY "posts"."pub_date" DESC, "posts"."created_at" DESC"#),
        "{query}"
    );
    assert!(query.ends_with("LIMIT 10 OFFSET 20"), "{query}");
}

#[test]
fn test_thread_query_breaks_timestamp_ties_by_id() {
    let query = sql(thread_query(Uuid::new_v4()));

    assert!(
        query.contains(r#"ORDER BY "comments"."created_at" ASC, "comments"."id" ASC"#),
        "{query}"
    );
}

#[test]
fn test_comment_counts_group_by_post() {
    let query = sql(comment_counts_query(&[Uuid::new_v4(), Uuid::new_v4()]));

    assert!(query.contains(r#"COUNT("comments"."id") AS "comment_count""#), "{query}");
    assert!(query.contains(r#""comments"."post_id" IN ("#), "{query}");
    assert!(query.ends_with(r#"GROUP BY "comments"."post_id""#), "{query}");
}

#[tokio::test]
async fn test_count_by_posts_maps_grouped_rows() {
    let busy = Uuid::new_v4();
    let quiet = Uuid::new_v4();
    let row = |post_id: Uuid, total: i64| {
        BTreeMap::from([("post_id", Value::from(post_id)), ("total", Value::from(total))])
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![row(busy, 3)]])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);

    let counts = repo.count_by_posts(&[busy, quiet]).await.unwrap();

    assert_eq!(counts.get(&busy), Some(&3));
    assert_eq!(counts.get(&quiet), None);
}

#[tokio::test]
async fn test_count_by_posts_without_ids_skips_query() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let repo = PostgresCommentRepository::new(db);

    assert!(repo.count_by_posts(&[]).await.unwrap().is_empty());
}
