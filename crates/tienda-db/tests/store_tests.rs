// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use tienda_app::{ProductId, ProductUpdate};
use tienda_db::{NewProduct, Store, validate_db_path};
use tienda_testkit::ShopFaker;

fn new_product_from(faker: &mut ShopFaker) -> NewProduct {
    let fake = faker.product();
    NewProduct {
        name: fake.name,
        sku: fake.sku,
        price: fake.price,
        stock: fake.stock,
        attribute_set: fake.attribute_set,
        product_status: "Enabled".to_owned(),
        approval_status: "Approved".to_owned(),
        type_name: fake.type_name,
        design_number: fake.design_number,
        status: fake.status,
        thumbnail: None,
    }
}

fn sample_update(name: &str) -> ProductUpdate {
    ProductUpdate {
        name: name.to_owned(),
        sku: "RG-TEST-0001".to_owned(),
        attribute_set: "Ring".to_owned(),
        product_status: "Enabled".to_owned(),
        type_name: "Simple".to_owned(),
        design_number: "DR-9000".to_owned(),
        stock: 3,
        price: 125_000.0,
        status: "active".to_owned(),
    }
}

#[test]
fn validate_db_path_rejects_uri_forms() {
    assert!(validate_db_path("file:test.db").is_err());
    assert!(validate_db_path("https://example.com/db.sqlite").is_err());
    assert!(validate_db_path("db.sqlite?mode=ro").is_err());
    assert!(validate_db_path("/tmp/tienda.db").is_ok());
}

#[test]
fn bootstrap_creates_schema_with_empty_catalog() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;

    assert_eq!(store.count_products()?, 0);

    let summary = store.dashboard_summary()?;
    assert!(summary.recent_orders.is_empty());
    assert_eq!(summary.review_count, 0);
    assert_eq!(summary.average_rating, 0.0);
    Ok(())
}

#[test]
fn bootstrap_rejects_schema_missing_required_column() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;

    store.raw_connection().execute_batch(
        "
            ALTER TABLE products RENAME TO products_old;
            CREATE TABLE products (
              id INTEGER PRIMARY KEY,
              name TEXT NOT NULL,
              price REAL NOT NULL DEFAULT 0,
              stock INTEGER NOT NULL DEFAULT 0,
              attribute_set TEXT NOT NULL DEFAULT '',
              product_status TEXT NOT NULL DEFAULT '',
              approval_status TEXT NOT NULL DEFAULT '',
              type_name TEXT NOT NULL DEFAULT '',
              design_number TEXT NOT NULL DEFAULT '',
              status TEXT NOT NULL DEFAULT '',
              thumbnail TEXT,
              created_at TEXT NOT NULL,
              updated_at TEXT NOT NULL
            );
            DROP TABLE products_old;
            ",
    )?;

    let err = store
        .bootstrap()
        .expect_err("schema validation should fail");
    let message = err.to_string();
    assert!(message.contains("table `products` is missing required columns"));
    assert!(message.contains("sku"));
    Ok(())
}

#[test]
fn paging_windows_partition_the_catalog() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;

    let mut faker = ShopFaker::new(11);
    let mut inserted = Vec::new();
    for _ in 0..25 {
        inserted.push(store.create_product(&new_product_from(&mut faker))?);
    }

    let first = store.list_products_page(0, 10)?;
    assert_eq!(first.total_count, 25);
    assert_eq!(first.rows.len(), 10);

    let second = store.list_products_page(10, 10)?;
    assert_eq!(second.rows.len(), 10);

    let third = store.list_products_page(20, 10)?;
    assert_eq!(third.rows.len(), 5);

    let mut seen: Vec<ProductId> = Vec::new();
    for page in [&first, &second, &third] {
        seen.extend(page.rows.iter().map(|product| product.id));
    }
    assert_eq!(seen.len(), 25);

    // Identical created_at timestamps fall back to id descending, so the
    // pages walk the catalog from newest insert to oldest.
    let mut expected: Vec<ProductId> = inserted.clone();
    expected.reverse();
    assert_eq!(seen, expected);

    let past_the_end = store.list_products_page(30, 10)?;
    assert!(past_the_end.rows.is_empty());
    assert_eq!(past_the_end.total_count, 25);
    Ok(())
}

#[test]
fn get_product_returns_none_for_absent_id() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;

    assert!(store.get_product(ProductId::new(404))?.is_none());
    Ok(())
}

#[test]
fn update_product_writes_all_fields_and_fresh_timestamp() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;

    let mut faker = ShopFaker::new(5);
    let id = store.create_product(&new_product_from(&mut faker))?;
    store
        .raw_connection()
        .execute(
            "UPDATE products SET created_at = ?1, updated_at = ?1 WHERE id = ?2",
            rusqlite::params!["2026-01-01T00:00:00Z", id.get()],
        )?;

    store.update_product(id, &sample_update("Signet Ring"))?;

    let product = store.get_product(id)?.expect("product exists");
    assert_eq!(product.name, "Signet Ring");
    assert_eq!(product.sku, "RG-TEST-0001");
    assert_eq!(product.design_number, "DR-9000");
    assert_eq!(product.stock, 3);
    assert_eq!(product.price, 125_000.0);
    assert_eq!(product.status, "active");
    assert!(product.updated_at > product.created_at);
    Ok(())
}

#[test]
fn update_of_missing_product_errors() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;

    let err = store
        .update_product(ProductId::new(9999), &sample_update("Ghost"))
        .expect_err("update should fail");
    assert!(err.to_string().contains("not found"));
    Ok(())
}

#[test]
fn seed_demo_data_populates_dashboard_aggregates() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    store.seed_demo_data()?;

    let summary = store.dashboard_summary()?;
    assert_eq!(summary.product_count, 25);
    assert_eq!(summary.recent_orders.len(), 10);
    assert_eq!(summary.activities.len(), 5);
    assert_eq!(summary.returns_count, 2);
    assert_eq!(summary.shipments_in_transit, 3);
    assert_eq!(summary.review_count, 5);
    assert!((summary.average_rating - 4.4).abs() < 1e-9);
    assert!(summary.lifetime_sales > 0.0);
    // Nine delivered/shipped orders plus one completed refund.
    assert_eq!(summary.completed_transactions, 10);

    let page = store.list_products_page(0, 10)?;
    assert_eq!(page.total_count, 25);
    assert_eq!(page.rows[0].name, "Coral Platinum Ring");
    assert_eq!(page.rows[0].sku, "FA-TF7N-PW5X");
    Ok(())
}

#[test]
fn activities_mark_read_round_trip() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    store.seed_demo_data()?;

    let activities = store.list_recent_activities(5)?;
    let first = &activities[0];
    assert!(!first.is_read);

    store.mark_activity_read(first.id)?;
    let reloaded = store.list_recent_activities(5)?;
    let updated = reloaded
        .iter()
        .find(|activity| activity.id == first.id)
        .expect("activity still listed");
    assert!(updated.is_read);
    Ok(())
}

#[test]
fn open_persists_catalog_across_reopen() -> Result<()> {
    let (_dir, db_path) = tienda_testkit::temp_db_path()?;

    {
        let store = Store::open(&db_path)?;
        store.bootstrap()?;
        let mut faker = ShopFaker::new(1);
        store.create_product(&new_product_from(&mut faker))?;
    }

    let store = Store::open(&db_path)?;
    store.bootstrap()?;
    assert_eq!(store.count_products()?, 1);
    Ok(())
}
