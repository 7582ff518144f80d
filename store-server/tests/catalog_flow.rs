//! Catalog listing, admin gating and persistence smoke test

mod common;

use common::*;
use store_server::catalog::ReviewInput;
use store_server::core::{Config, StoreState};
use store_server::db::models::{ListQuery, ProductCreate, ProductUpdate};
use store_server::utils::AppError;

#[tokio::test]
async fn keyword_listing_is_case_insensitive_substring() {
    let state = test_state().await;
    seed_product(&state, "Airpods Wireless Earbuds", 89.99, 5).await;
    seed_product(&state, "Sony Headphones", 120.0, 5).await;
    seed_product(&state, "iPhone 13 Pro", 999.0, 5).await;
    seed_product(&state, "Canon DSLR Camera", 650.0, 5).await;

    let page = state
        .catalog
        .list_products(ListQuery {
            keyword: Some("PHONE".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 2); // "Headphones" and "iPhone"

    let page = state
        .catalog
        .list_products(ListQuery {
            keyword: Some("zzz".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 0);
    assert!(page.products.is_empty());
}

#[tokio::test]
async fn listing_paginates_with_stable_newest_first_order() {
    let state = test_state().await;
    for i in 1..=5 {
        seed_product(&state, &format!("Gadget {i}"), 10.0 * i as f64, 5).await;
    }

    let first = state
        .catalog
        .list_products(ListQuery {
            page: 1,
            page_size: 2,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(first.total, 5);
    assert_eq!(first.pages, 3);
    assert_eq!(first.products.len(), 2);
    // Newest first
    assert_eq!(first.products[0].name, "Gadget 5");
    assert_eq!(first.products[1].name, "Gadget 4");

    let last = state
        .catalog
        .list_products(ListQuery {
            page: 3,
            page_size: 2,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(last.products.len(), 1);
    assert_eq!(last.products[0].name, "Gadget 1");

    // Same query, same order
    let again = state
        .catalog
        .list_products(ListQuery {
            page: 1,
            page_size: 2,
            ..Default::default()
        })
        .await
        .unwrap();
    let names: Vec<_> = again.products.iter().map(|p| p.name.clone()).collect();
    assert_eq!(names, vec!["Gadget 5", "Gadget 4"]);
}

#[tokio::test]
async fn category_filter_narrows_listing() {
    let state = test_state().await;
    // seed_product uses category "gear"
    seed_product(&state, "Gadget", 10.0, 5).await;

    let hit = state
        .catalog
        .list_products(ListQuery {
            category: Some("gear".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(hit.total, 1);

    let miss = state
        .catalog
        .list_products(ListQuery {
            category: Some("books".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(miss.total, 0);
}

#[tokio::test]
async fn catalog_mutations_are_admin_only() {
    let state = test_state().await;
    let u1 = customer("u1", "Jane");
    let product = seed_product(&state, "Keyboard", 59.0, 5).await;

    let err = state
        .catalog
        .create_product(
            &u1,
            ProductCreate {
                name: "Forbidden".to_string(),
                brand: String::new(),
                category: String::new(),
                description: String::new(),
                image: None,
                price: 1.0,
                count_in_stock: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = state
        .catalog
        .update_product(
            &u1,
            &pid(&product),
            ProductUpdate {
                price: Some(1.0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = state
        .catalog
        .delete_product(&u1, &pid(&product))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // Unauthorized attempts changed nothing
    let unchanged = state.catalog.get_product(&pid(&product)).await.unwrap();
    assert_eq!(unchanged.price, 59.0);
}

#[tokio::test]
async fn missing_products_are_not_found() {
    let state = test_state().await;
    let admin = admin_identity();

    assert!(matches!(
        state.catalog.get_product("product:missing").await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        state
            .catalog
            .update_product(
                &admin,
                "product:missing",
                ProductUpdate {
                    price: Some(1.0),
                    ..Default::default()
                }
            )
            .await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        state.catalog.delete_product(&admin, "product:missing").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn create_rejects_bad_price_and_stock() {
    let state = test_state().await;
    let admin = admin_identity();

    for (price, stock) in [(-1.0, Some(1)), (f64::NAN, Some(1)), (1.0, Some(-5))] {
        let err = state
            .catalog
            .create_product(
                &admin,
                ProductCreate {
                    name: "Bad product".to_string(),
                    brand: String::new(),
                    category: String::new(),
                    description: String::new(),
                    image: None,
                    price,
                    count_in_stock: stock,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}

#[tokio::test]
async fn update_changes_catalog_fields_only() {
    let state = test_state().await;
    let admin = admin_identity();
    let product = seed_product(&state, "Lamp", 25.0, 5).await;

    state
        .reviews
        .add_review(
            &customer("u1", "Jane"),
            &pid(&product),
            ReviewInput {
                rating: 5,
                comment: "Lovely warm light".to_string(),
            },
        )
        .await
        .unwrap();

    let updated = state
        .catalog
        .update_product(
            &admin,
            &pid(&product),
            ProductUpdate {
                name: Some("Desk Lamp v2".to_string()),
                price: Some(29.0),
                count_in_stock: Some(8),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Desk Lamp v2");
    assert_eq!(updated.price, 29.0);
    assert_eq!(updated.count_in_stock, 8);
    // Reviews and their aggregate survive catalog edits
    assert_eq!(updated.num_reviews, 1);
    assert_eq!(updated.rating, 5.0);
    assert_eq!(updated.reviews.len(), 1);
}

#[tokio::test]
async fn top_products_orders_by_rating() {
    let state = test_state().await;
    let low = seed_product(&state, "Low rated", 10.0, 5).await;
    let high = seed_product(&state, "High rated", 10.0, 5).await;
    let mid = seed_product(&state, "Mid rated", 10.0, 5).await;

    for (product, rating) in [(&low, 2), (&high, 5), (&mid, 3)] {
        state
            .reviews
            .add_review(
                &customer("u1", "Jane"),
                &pid(product),
                ReviewInput {
                    rating,
                    comment: "Consistent star rating".to_string(),
                },
            )
            .await
            .unwrap();
    }

    let top = state.catalog.top_products(Some(2)).await.unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].name, "High rated");
    assert_eq!(top[1].name, "Mid rated");
}

#[tokio::test]
async fn on_disk_store_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = Config::with_work_dir(dir.path().to_string_lossy().to_string());
    config.jwt.secret = TEST_JWT_SECRET.to_string();

    let state = StoreState::initialize(&config)
        .await
        .expect("on-disk state should initialize");
    let product = seed_product(&state, "Persistent gadget", 42.0, 3).await;

    let read_back = state.catalog.get_product(&pid(&product)).await.unwrap();
    assert_eq!(read_back.name, "Persistent gadget");
    assert_eq!(read_back.count_in_stock, 3);
}
