//! Service-layer integration tests against an in-memory SQLite database.

use biblio_server::{
    error::AppError,
    models::{CreateAuthor, CreateBook, CreateLibrary},
    repository::{AUTHOR_BOOKS, BOOK_AUTHORS},
    services::Services,
    MIGRATOR,
};
use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;

async fn setup() -> Services {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    MIGRATOR.run(&pool).await.expect("Failed to run migrations");
    Services::new(pool)
}

fn book(title: &str, authors: Vec<i64>, library: Vec<i64>) -> CreateBook {
    CreateBook {
        title: title.to_string(),
        pages: 320,
        stock: 5,
        price: 19.99,
        release: NaiveDate::from_ymd_opt(2020, 1, 15).unwrap(),
        time: NaiveTime::from_hms_opt(12, 30, 0).unwrap(),
        authors,
        library,
    }
}

fn author(name: &str, books: Vec<i64>) -> CreateAuthor {
    CreateAuthor {
        name: name.to_string(),
        books,
    }
}

fn entity_id(envelope: &Value, key: &str) -> i64 {
    envelope[key]["id"].as_i64().expect("entity id")
}

fn id_list(envelope: &Value, key: &str) -> Vec<i64> {
    let mut ids: Vec<i64> = envelope[key]
        .as_array()
        .expect("id list")
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect();
    ids.sort_unstable();
    ids
}

#[tokio::test]
async fn create_book_returns_submitted_relation_ids() {
    let services = setup().await;

    let base = services.books.create(book("Base", vec![], vec![])).await.unwrap();
    let base_id = entity_id(&base, "book");

    let a1 = entity_id(
        &services.authors.create(author("Ann", vec![base_id])).await.unwrap(),
        "author",
    );
    let a2 = entity_id(
        &services.authors.create(author("Bob", vec![base_id])).await.unwrap(),
        "author",
    );
    let l1 = entity_id(
        &services
            .libraries
            .create(CreateLibrary {
                name: "Central".to_string(),
                books: vec![],
            })
            .await
            .unwrap(),
        "library",
    );

    let created = services
        .books
        .create(book("Linked", vec![a2, a1], vec![l1]))
        .await
        .unwrap();

    assert_eq!(id_list(&created, "author_ids"), {
        let mut expected = vec![a1, a2];
        expected.sort_unstable();
        expected
    });
    assert_eq!(id_list(&created, "library_ids"), vec![l1]);
}

#[tokio::test]
async fn create_with_missing_relation_id_persists_nothing() {
    let services = setup().await;

    let err = services
        .books
        .create(book("Ghost", vec![404], vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(err.to_string().contains("404"));

    assert_eq!(services.books.count().await.unwrap(), 0);
}

#[tokio::test]
async fn reconcile_is_idempotent() {
    let services = setup().await;

    let b = entity_id(
        &services.books.create(book("B", vec![], vec![])).await.unwrap(),
        "book",
    );
    let a1 = entity_id(
        &services.authors.create(author("Ann", vec![b])).await.unwrap(),
        "author",
    );
    let a2 = entity_id(
        &services.authors.create(author("Bob", vec![b])).await.unwrap(),
        "author",
    );

    let mut conn = services.pool.acquire().await.unwrap();
    BOOK_AUTHORS.reconcile(&mut conn, b, &[a1, a2]).await.unwrap();
    let after_first = BOOK_AUTHORS.linked_ids(&mut conn, b).await.unwrap();

    // Second call with the same target set is a no-op.
    BOOK_AUTHORS.reconcile(&mut conn, b, &[a1, a2]).await.unwrap();
    let after_second = BOOK_AUTHORS.linked_ids(&mut conn, b).await.unwrap();

    assert_eq!(after_first, after_second);
    assert_eq!(after_second.len(), 2);
}

#[tokio::test]
async fn update_applies_exact_relation_delta() {
    let services = setup().await;

    let base = entity_id(
        &services.books.create(book("Base", vec![], vec![])).await.unwrap(),
        "book",
    );
    let a = entity_id(
        &services.authors.create(author("A", vec![base])).await.unwrap(),
        "author",
    );
    let b = entity_id(
        &services.authors.create(author("B", vec![base])).await.unwrap(),
        "author",
    );
    let c = entity_id(
        &services.authors.create(author("C", vec![base])).await.unwrap(),
        "author",
    );

    let target = entity_id(
        &services.books.create(book("Target", vec![a, b], vec![])).await.unwrap(),
        "book",
    );

    // Replacing {A, B} with {B, C}: A removed, C added, B untouched.
    let updated = services
        .books
        .update(target, book("Target", vec![b, c], vec![]))
        .await
        .unwrap();

    let mut expected = vec![b, c];
    expected.sort_unstable();
    assert_eq!(id_list(&updated, "author_ids"), expected);
}

#[tokio::test]
async fn add_link_rejects_duplicate_pair() {
    let services = setup().await;

    let b = entity_id(
        &services.books.create(book("B", vec![], vec![])).await.unwrap(),
        "book",
    );
    let a = entity_id(
        &services.authors.create(author("Ann", vec![b])).await.unwrap(),
        "author",
    );

    // The create above already linked (b, a).
    let err = services.books.add_link(&BOOK_AUTHORS, b, a).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn remove_link_rejects_missing_pair() {
    let services = setup().await;

    let b = entity_id(
        &services.books.create(book("B", vec![], vec![])).await.unwrap(),
        "book",
    );
    let a = entity_id(
        &services.authors.create(author("Ann", vec![b])).await.unwrap(),
        "author",
    );

    services.books.remove_link(&BOOK_AUTHORS, b, a).await.unwrap();

    let err = services.books.remove_link(&BOOK_AUTHORS, b, a).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn bulk_create_is_all_or_nothing() {
    let services = setup().await;

    let mut invalid = book("Thin", vec![], vec![]);
    invalid.pages = 5;

    let err = services
        .books
        .bulk_create(vec![book("Valid", vec![], vec![]), invalid])
        .await
        .unwrap_err();

    match err {
        AppError::BulkCreate(errors) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].index, 1);
            assert!(errors[0].error.contains("pages must be > 10"));
        }
        other => panic!("expected BulkCreate error, got {:?}", other),
    }

    assert_eq!(services.books.count().await.unwrap(), 0);
}

#[tokio::test]
async fn bulk_delete_reports_missing_ids() {
    let services = setup().await;

    let b = entity_id(
        &services.books.create(book("B", vec![], vec![])).await.unwrap(),
        "book",
    );

    let result = services.books.bulk_delete(vec![b, 9999]).await.unwrap();
    assert_eq!(result["deleted_count"], 1);
    assert_eq!(result["not_found"], serde_json::json!([9999]));
}

#[tokio::test]
async fn pages_boundary_is_exclusive() {
    let services = setup().await;

    let mut boundary = book("Boundary", vec![], vec![]);
    boundary.pages = 10;
    let err = services.books.create(boundary).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(err.to_string().contains("pages must be > 10"));

    let mut just_over = book("Just over", vec![], vec![]);
    just_over.pages = 11;
    services.books.create(just_over).await.unwrap();
}

#[tokio::test]
async fn author_requires_at_least_one_existing_book() {
    let services = setup().await;

    let err = services.authors.create(author("Loner", vec![])).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(err.to_string().contains("At least 1 Book required"));

    let err = services.authors.create(author("Ghost", vec![777])).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(err.to_string().contains("777"));
    assert_eq!(services.authors.count().await.unwrap(), 0);
}

#[tokio::test]
async fn update_can_unlink_every_book_from_author() {
    let services = setup().await;

    let b = entity_id(
        &services.books.create(book("B", vec![], vec![])).await.unwrap(),
        "book",
    );
    let a = entity_id(
        &services.authors.create(author("Ann", vec![b])).await.unwrap(),
        "author",
    );

    // The at-least-one-book rule binds at creation only; a replace may
    // reconcile the set down to empty.
    let updated = services.authors.update(a, author("Ann", vec![])).await.unwrap();
    assert_eq!(id_list(&updated, "book_ids"), Vec::<i64>::new());

    let mut conn = services.pool.acquire().await.unwrap();
    assert!(AUTHOR_BOOKS.linked_ids(&mut conn, a).await.unwrap().is_empty());
}

#[test]
fn payload_relation_fields_are_required() {
    let missing_relations = serde_json::json!({
        "title": "No lists",
        "pages": 120,
        "stock": 1,
        "price": 9.99,
        "release": "2020-01-15",
        "time": "12:30:00",
    });
    assert!(serde_json::from_value::<CreateBook>(missing_relations).is_err());

    assert!(serde_json::from_value::<CreateLibrary>(serde_json::json!({"name": "Central"})).is_err());
    assert!(serde_json::from_value::<CreateAuthor>(serde_json::json!({"name": "Ann"})).is_err());
}

#[tokio::test]
async fn decrease_stock_validates_quantity() {
    let services = setup().await;

    let b = entity_id(
        &services.books.create(book("Stocked", vec![], vec![])).await.unwrap(),
        "book",
    );

    // Stock starts at 5; over-draining fails without mutating it.
    let err = services.books.decrease_stock(b, 6).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    let current = services.books.get(b).await.unwrap();
    assert_eq!(current["book"]["stock"], 5);

    let err = services.books.decrease_stock(b, 0).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Draining exactly the stock leaves zero.
    let updated = services.books.decrease_stock(b, 5).await.unwrap();
    assert_eq!(updated.stock, 0);
}

#[tokio::test]
async fn entity_delete_cascades_join_rows() {
    let services = setup().await;

    let b = entity_id(
        &services.books.create(book("Doomed", vec![], vec![])).await.unwrap(),
        "book",
    );
    let a = entity_id(
        &services.authors.create(author("Ann", vec![b])).await.unwrap(),
        "author",
    );

    services.books.delete(b).await.unwrap();

    let mut conn = services.pool.acquire().await.unwrap();
    let remaining = AUTHOR_BOOKS.linked_ids(&mut conn, a).await.unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn paginate_handles_out_of_range_skip() {
    let services = setup().await;

    for i in 0..3 {
        services
            .books
            .create(book(&format!("Book {}", i), vec![], vec![]))
            .await
            .unwrap();
    }

    let page = services.books.paginate(10, 5, false).await.unwrap();
    assert_eq!(page["total"], 3);
    assert_eq!(page["skip"], 10);
    assert_eq!(page["limit"], 5);
    assert_eq!(page["data"], serde_json::json!([]));

    let err = services.books.paginate(-1, 5, false).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn detailed_listing_inlines_related_entities() {
    let services = setup().await;

    let b = entity_id(
        &services.books.create(book("B", vec![], vec![])).await.unwrap(),
        "book",
    );
    services.authors.create(author("Ann", vec![b])).await.unwrap();

    let listing = services.books.list(true).await.unwrap();
    let rows = listing.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["authors"][0]["name"], "Ann");
    assert_eq!(rows[0]["library"], serde_json::json!([]));
}
