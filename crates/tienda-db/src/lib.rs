// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tienda_app::{
    Activity, ActivityId, ActivityKind, DashboardSummary, Order, OrderId, Product, ProductId,
    ProductPage, ProductUpdate, TransactionId, TransactionKind,
};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

pub const APP_NAME: &str = "tienda";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    (
        "products",
        &[
            "id",
            "name",
            "sku",
            "price",
            "stock",
            "attribute_set",
            "product_status",
            "approval_status",
            "type_name",
            "design_number",
            "status",
            "thumbnail",
            "created_at",
            "updated_at",
        ],
    ),
    (
        "orders",
        &[
            "id",
            "order_number",
            "customer_name",
            "total_amount",
            "status",
            "order_date",
            "created_at",
        ],
    ),
    (
        "transactions",
        &["id", "kind", "amount", "status", "created_at"],
    ),
    (
        "activities",
        &["id", "title", "description", "kind", "is_read", "created_at"],
    ),
    (
        "returns",
        &["id", "order_number", "reason", "status", "created_at"],
    ),
    (
        "shipments",
        &["id", "order_number", "carrier", "status", "created_at"],
    ),
    (
        "reviews",
        &["id", "product_id", "rating", "title", "created_at"],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequiredIndex {
    name: &'static str,
    create_sql: &'static str,
}

const REQUIRED_INDEXES: &[RequiredIndex] = &[
    RequiredIndex {
        name: "idx_products_created_at",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_products_created_at ON products (created_at);",
    },
    RequiredIndex {
        name: "idx_products_sku",
        create_sql: "CREATE UNIQUE INDEX IF NOT EXISTS idx_products_sku ON products (sku);",
    },
    RequiredIndex {
        name: "idx_orders_order_date",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_orders_order_date ON orders (order_date);",
    },
    RequiredIndex {
        name: "idx_activities_created_at",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_activities_created_at ON activities (created_at);",
    },
    RequiredIndex {
        name: "idx_transactions_kind_status",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_transactions_kind_status ON transactions (kind, status);",
    },
    RequiredIndex {
        name: "idx_shipments_status",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_shipments_status ON shipments (status);",
    },
    RequiredIndex {
        name: "idx_reviews_product_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_reviews_product_id ON reviews (product_id);",
    },
];

const PRODUCT_COLUMNS: &str = "
  id, name, sku, price, stock,
  attribute_set, product_status, approval_status,
  type_name, design_number, status, thumbnail,
  created_at, updated_at
";

#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    pub price: f64,
    pub stock: i64,
    pub attribute_set: String,
    pub product_status: String,
    pub approval_status: String,
    pub type_name: String,
    pub design_number: String,
    pub status: String,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub order_number: String,
    pub customer_name: String,
    pub total_amount: f64,
    pub status: String,
    pub order_date: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: f64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub title: String,
    pub description: String,
    pub kind: ActivityKind,
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if has_user_tables(&self.conn)? {
            validate_schema(&self.conn)?;
        } else {
            self.conn
                .execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
        }

        ensure_required_indexes(&self.conn)?;
        Ok(())
    }

    pub fn create_product(&self, new_product: &NewProduct) -> Result<ProductId> {
        let now = now_rfc3339()?;
        self.insert_product(new_product, &now)
    }

    fn insert_product(&self, new_product: &NewProduct, created_at: &str) -> Result<ProductId> {
        self.conn
            .execute(
                "
                INSERT INTO products (
                  name, sku, price, stock,
                  attribute_set, product_status, approval_status,
                  type_name, design_number, status, thumbnail,
                  created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
                params![
                    new_product.name,
                    new_product.sku,
                    new_product.price,
                    new_product.stock,
                    new_product.attribute_set,
                    new_product.product_status,
                    new_product.approval_status,
                    new_product.type_name,
                    new_product.design_number,
                    new_product.status,
                    new_product.thumbnail,
                    created_at,
                    created_at,
                ],
            )
            .context("insert product")?;

        Ok(ProductId::new(self.conn.last_insert_rowid()))
    }

    /// One page of the catalog plus the exact total row count, newest rows
    /// first. The count is taken in the same call so the pager can replace
    /// both atomically.
    pub fn list_products_page(&self, offset: u64, limit: u64) -> Result<ProductPage> {
        let total_count = self.count_products()?;

        let mut stmt = self
            .conn
            .prepare(&format!(
                "
                SELECT {PRODUCT_COLUMNS}
                FROM products
                ORDER BY created_at DESC, id DESC
                LIMIT ? OFFSET ?
                "
            ))
            .context("prepare products page query")?;
        let rows = stmt
            .query_map(params![limit, offset], read_product_row)
            .context("query products page")?;

        let rows = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("collect products page")?;

        Ok(ProductPage { rows, total_count })
    }

    pub fn count_products(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))
            .context("count products")?;
        Ok(count.max(0) as u64)
    }

    /// Zero-or-one read; an absent id is `Ok(None)`, not an error.
    pub fn get_product(&self, product_id: ProductId) -> Result<Option<Product>> {
        self.conn
            .query_row(
                &format!(
                    "
                    SELECT {PRODUCT_COLUMNS}
                    FROM products
                    WHERE id = ?
                    "
                ),
                params![product_id.get()],
                read_product_row,
            )
            .optional()
            .with_context(|| format!("load product {}", product_id.get()))
    }

    /// Writes every editable field plus a fresh updated_at in one statement.
    pub fn update_product(&self, product_id: ProductId, update: &ProductUpdate) -> Result<()> {
        let now = now_rfc3339()?;
        let rows_affected = self
            .conn
            .execute(
                "
                UPDATE products
                SET
                  name = ?,
                  sku = ?,
                  attribute_set = ?,
                  product_status = ?,
                  type_name = ?,
                  design_number = ?,
                  stock = ?,
                  price = ?,
                  status = ?,
                  updated_at = ?
                WHERE id = ?
                ",
                params![
                    update.name,
                    update.sku,
                    update.attribute_set,
                    update.product_status,
                    update.type_name,
                    update.design_number,
                    update.stock,
                    update.price,
                    update.status,
                    now,
                    product_id.get(),
                ],
            )
            .context("update product")?;
        if rows_affected == 0 {
            bail!(
                "product {} not found -- refresh the listing and retry",
                product_id.get()
            );
        }
        Ok(())
    }

    pub fn create_order(&self, new_order: &NewOrder) -> Result<OrderId> {
        let now = now_rfc3339()?;
        let order_date = new_order
            .order_date
            .format(&Rfc3339)
            .context("format order date")?;
        self.conn
            .execute(
                "
                INSERT INTO orders (
                  order_number, customer_name, total_amount, status,
                  order_date, created_at
                ) VALUES (?, ?, ?, ?, ?, ?)
                ",
                params![
                    new_order.order_number,
                    new_order.customer_name,
                    new_order.total_amount,
                    new_order.status,
                    order_date,
                    now,
                ],
            )
            .context("insert order")?;
        Ok(OrderId::new(self.conn.last_insert_rowid()))
    }

    pub fn list_recent_orders(&self, limit: u64) -> Result<Vec<Order>> {
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT
                  id, order_number, customer_name, total_amount, status,
                  order_date, created_at
                FROM orders
                ORDER BY order_date DESC, id DESC
                LIMIT ?
                ",
            )
            .context("prepare recent orders query")?;
        let rows = stmt
            .query_map(params![limit], |row| {
                let order_date_raw: String = row.get(5)?;
                let created_at_raw: String = row.get(6)?;
                Ok(Order {
                    id: OrderId::new(row.get(0)?),
                    order_number: row.get(1)?,
                    customer_name: row.get(2)?,
                    total_amount: row.get(3)?,
                    status: row.get(4)?,
                    order_date: parse_datetime(&order_date_raw).map_err(to_sql_error)?,
                    created_at: parse_datetime(&created_at_raw).map_err(to_sql_error)?,
                })
            })
            .context("query recent orders")?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect recent orders")
    }

    pub fn create_transaction(&self, new_transaction: &NewTransaction) -> Result<TransactionId> {
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO transactions (kind, amount, status, created_at)
                VALUES (?, ?, ?, ?)
                ",
                params![
                    new_transaction.kind.as_str(),
                    new_transaction.amount,
                    new_transaction.status,
                    now,
                ],
            )
            .context("insert transaction")?;
        Ok(TransactionId::new(self.conn.last_insert_rowid()))
    }

    pub fn create_activity(&self, new_activity: &NewActivity) -> Result<ActivityId> {
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO activities (title, description, kind, is_read, created_at)
                VALUES (?, ?, ?, 0, ?)
                ",
                params![
                    new_activity.title,
                    new_activity.description,
                    new_activity.kind.as_str(),
                    now,
                ],
            )
            .context("insert activity")?;
        Ok(ActivityId::new(self.conn.last_insert_rowid()))
    }

    pub fn list_recent_activities(&self, limit: u64) -> Result<Vec<Activity>> {
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT id, title, description, kind, is_read, created_at
                FROM activities
                ORDER BY created_at DESC, id DESC
                LIMIT ?
                ",
            )
            .context("prepare recent activities query")?;
        let rows = stmt
            .query_map(params![limit], |row| {
                let kind_raw: String = row.get(3)?;
                let kind = ActivityKind::parse(&kind_raw).ok_or_else(|| {
                    rusqlite::Error::FromSqlConversionFailure(
                        3,
                        rusqlite::types::Type::Text,
                        Box::new(std::io::Error::new(
                            std::io::ErrorKind::InvalidData,
                            format!("unknown activity kind {kind_raw}"),
                        )),
                    )
                })?;
                let created_at_raw: String = row.get(5)?;
                Ok(Activity {
                    id: ActivityId::new(row.get(0)?),
                    title: row.get(1)?,
                    description: row.get(2)?,
                    kind,
                    is_read: row.get::<_, i64>(4)? != 0,
                    created_at: parse_datetime(&created_at_raw).map_err(to_sql_error)?,
                })
            })
            .context("query recent activities")?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect recent activities")
    }

    pub fn mark_activity_read(&self, activity_id: ActivityId) -> Result<()> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE activities SET is_read = 1 WHERE id = ?",
                params![activity_id.get()],
            )
            .context("mark activity read")?;
        if rows_affected == 0 {
            bail!("activity {} not found", activity_id.get());
        }
        Ok(())
    }

    pub fn dashboard_summary(&self) -> Result<DashboardSummary> {
        let recent_orders = self.list_recent_orders(10)?;
        let product_count = self.count_products()?;
        let activities = self.list_recent_activities(5)?;

        let completed_transactions: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM transactions WHERE status = 'completed'",
                [],
                |row| row.get(0),
            )
            .context("count completed transactions")?;

        let lifetime_sales: f64 = self
            .conn
            .query_row(
                "
                SELECT COALESCE(SUM(amount), 0)
                FROM transactions
                WHERE kind = 'sale' AND status = 'completed'
                ",
                [],
                |row| row.get(0),
            )
            .context("sum lifetime sales")?;

        let returns_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM returns", [], |row| row.get(0))
            .context("count returns")?;

        let shipments_in_transit: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM shipments WHERE status = 'in_transit'",
                [],
                |row| row.get(0),
            )
            .context("count in-transit shipments")?;

        let (review_count, average_rating): (i64, f64) = self
            .conn
            .query_row(
                "SELECT COUNT(*), COALESCE(AVG(rating), 0) FROM reviews",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .context("aggregate reviews")?;

        Ok(DashboardSummary {
            recent_orders,
            product_count,
            completed_transactions: completed_transactions.max(0) as u64,
            lifetime_sales,
            activities,
            returns_count: returns_count.max(0) as u64,
            shipments_in_transit: shipments_in_transit.max(0) as u64,
            review_count: review_count.max(0) as u64,
            average_rating,
        })
    }

    /// Deterministic demo catalog. Products get staggered created_at values
    /// so the listing order is stable across runs.
    pub fn seed_demo_data(&self) -> Result<()> {
        let base = OffsetDateTime::now_utc();

        for (index, (name, sku, attribute_set, design_number, stock, price, status)) in
            DEMO_PRODUCTS.iter().enumerate()
        {
            let created_at = (base - Duration::days(index as i64 + 1))
                .format(&Rfc3339)
                .context("format demo product timestamp")?;
            self.insert_product(
                &NewProduct {
                    name: (*name).to_owned(),
                    sku: (*sku).to_owned(),
                    price: *price,
                    stock: *stock,
                    attribute_set: (*attribute_set).to_owned(),
                    product_status: "Enabled".to_owned(),
                    approval_status: "Approved".to_owned(),
                    type_name: "Simple".to_owned(),
                    design_number: (*design_number).to_owned(),
                    status: (*status).to_owned(),
                    thumbnail: None,
                },
                &created_at,
            )?;
        }

        for (index, (order_number, customer, amount, status)) in DEMO_ORDERS.iter().enumerate() {
            self.create_order(&NewOrder {
                order_number: (*order_number).to_owned(),
                customer_name: (*customer).to_owned(),
                total_amount: *amount,
                status: (*status).to_owned(),
                order_date: base - Duration::days(index as i64),
            })?;

            if *status == "delivered" || *status == "shipped" {
                self.create_transaction(&NewTransaction {
                    kind: TransactionKind::Sale,
                    amount: *amount,
                    status: "completed".to_owned(),
                })?;
            }
        }
        self.create_transaction(&NewTransaction {
            kind: TransactionKind::Refund,
            amount: 12_500.0,
            status: "completed".to_owned(),
        })?;
        self.create_transaction(&NewTransaction {
            kind: TransactionKind::Sale,
            amount: 98_000.0,
            status: "pending".to_owned(),
        })?;

        for (title, description, kind) in DEMO_ACTIVITIES {
            self.create_activity(&NewActivity {
                title: (*title).to_owned(),
                description: (*description).to_owned(),
                kind: *kind,
            })?;
        }

        let now = now_rfc3339()?;
        for (order_number, carrier, status) in DEMO_SHIPMENTS {
            self.conn
                .execute(
                    "
                    INSERT INTO shipments (order_number, carrier, status, created_at)
                    VALUES (?, ?, ?, ?)
                    ",
                    params![order_number, carrier, status, now],
                )
                .context("insert demo shipment")?;
        }
        for (order_number, reason) in DEMO_RETURNS {
            self.conn
                .execute(
                    "
                    INSERT INTO returns (order_number, reason, status, created_at)
                    VALUES (?, ?, 'requested', ?)
                    ",
                    params![order_number, reason, now],
                )
                .context("insert demo return")?;
        }
        for (product_index, rating, title) in DEMO_REVIEWS {
            self.conn
                .execute(
                    "
                    INSERT INTO reviews (product_id, rating, title, created_at)
                    VALUES (?, ?, ?, ?)
                    ",
                    params![*product_index, rating, title, now],
                )
                .context("insert demo review")?;
        }

        Ok(())
    }
}

const DEMO_PRODUCTS: &[(&str, &str, &str, &str, i64, f64, &str)] = &[
    (
        "Coral Platinum Ring",
        "FA-TF7N-PW5X",
        "Ring",
        "DR-1001",
        4,
        577_500.0,
        "active",
    ),
    (
        "Alexandrite Ring",
        "7N-1LSZ-WS5Z",
        "Ring",
        "DR-1002",
        2,
        550_000.0,
        "active",
    ),
    ("Opal Halo Ring", "RG-88KD-Q2MN", "Ring", "DR-1003", 6, 312_000.0, "active"),
    ("Sapphire Band", "RG-03JX-V8TQ", "Ring", "DR-1004", 0, 268_400.0, "out_of_stock"),
    ("Emerald Solitaire", "RG-4Y2P-N6HF", "Ring", "DR-1005", 3, 498_000.0, "active"),
    ("Pearl Strand Necklace", "NK-7Q1M-B4RC", "Necklace", "DN-2001", 8, 154_000.0, "active"),
    ("Garnet Pendant", "NK-2W9A-K7LP", "Necklace", "DN-2002", 5, 92_500.0, "active"),
    ("Amethyst Choker", "NK-5E6T-X1GD", "Necklace", "DN-2003", 1, 187_300.0, "active"),
    ("Topaz Lariat", "NK-9R4B-Z3VY", "Necklace", "DN-2004", 0, 210_000.0, "out_of_stock"),
    ("Citrine Chain", "NK-6U8S-W5QJ", "Necklace", "DN-2005", 12, 76_800.0, "active"),
    ("Jade Bangle", "BR-1P3H-C9NE", "Bracelet", "DB-3001", 7, 132_000.0, "active"),
    ("Turquoise Cuff", "BR-8K5D-M2XF", "Bracelet", "DB-3002", 4, 88_400.0, "active"),
    ("Onyx Link Bracelet", "BR-3V7G-T6AW", "Bracelet", "DB-3003", 9, 64_200.0, "active"),
    ("Moonstone Charm Band", "BR-0L2Y-R8SU", "Bracelet", "DB-3004", 2, 118_900.0, "active"),
    ("Peridot Tennis Bracelet", "BR-4N6C-J1ZK", "Bracelet", "DB-3005", 0, 342_000.0, "out_of_stock"),
    ("Ruby Drop Earrings", "ER-7M9F-D4PB", "Earring", "DE-4001", 6, 225_700.0, "active"),
    ("Aquamarine Studs", "ER-2X1Q-H8LN", "Earring", "DE-4002", 10, 97_300.0, "active"),
    ("Tanzanite Hoops", "ER-5B8J-G3VT", "Earring", "DE-4003", 3, 176_500.0, "active"),
    ("Spinel Climbers", "ER-9Z4W-A7KC", "Earring", "DE-4004", 5, 143_800.0, "active"),
    ("Zircon Dangles", "ER-6D2R-E5MY", "Earring", "DE-4005", 1, 111_000.0, "active"),
    ("Morganite Promise Ring", "RG-8H1K-U9QX", "Ring", "DR-1006", 4, 204_600.0, "active"),
    ("Tourmaline Twist Ring", "RG-2T6N-F4BW", "Ring", "DR-1007", 7, 156_200.0, "active"),
    ("Lapis Station Necklace", "NK-4A8E-S2HD", "Necklace", "DN-2006", 3, 129_500.0, "active"),
    ("Coral Bead Bracelet", "BR-7F3M-L6JP", "Bracelet", "DB-3006", 11, 58_700.0, "active"),
    ("Iolite Threader Earrings", "ER-1S5V-P9GC", "Earring", "DE-4006", 2, 84_900.0, "active"),
];

const DEMO_ORDERS: &[(&str, &str, f64, &str)] = &[
    ("ORD-2049", "Mika Tanaka", 577_500.0, "delivered"),
    ("ORD-2048", "Sora Ishikawa", 154_000.0, "shipped"),
    ("ORD-2047", "Ren Fujimoto", 92_500.0, "delivered"),
    ("ORD-2046", "Aoi Nakamura", 312_000.0, "pending"),
    ("ORD-2045", "Yuki Hasegawa", 225_700.0, "shipped"),
    ("ORD-2044", "Haru Kobayashi", 64_200.0, "delivered"),
    ("ORD-2043", "Nao Matsuda", 187_300.0, "canceled"),
    ("ORD-2042", "Rin Takahashi", 132_000.0, "delivered"),
    ("ORD-2041", "Kaito Mori", 97_300.0, "shipped"),
    ("ORD-2040", "Emi Shimizu", 118_900.0, "delivered"),
    ("ORD-2039", "Tsubasa Ono", 76_800.0, "delivered"),
];

const DEMO_ACTIVITIES: &[(&str, &str, ActivityKind)] = &[
    (
        "Low stock warning",
        "Sapphire Band is out of stock",
        ActivityKind::Alert,
    ),
    (
        "New order received",
        "ORD-2049 placed by Mika Tanaka",
        ActivityKind::Notification,
    ),
    (
        "Return requested",
        "ORD-2043 requested a return",
        ActivityKind::Alert,
    ),
    (
        "Catalog updated",
        "2 products changed price",
        ActivityKind::Update,
    ),
    (
        "Payout scheduled",
        "Next payout arrives in 3 days",
        ActivityKind::Notification,
    ),
    (
        "Policy update",
        "Marketplace fee schedule changes next month",
        ActivityKind::Update,
    ),
];

const DEMO_SHIPMENTS: &[(&str, &str, &str)] = &[
    ("ORD-2048", "Yamato", "in_transit"),
    ("ORD-2045", "Sagawa", "in_transit"),
    ("ORD-2041", "Yamato", "in_transit"),
    ("ORD-2049", "Japan Post", "delivered"),
    ("ORD-2047", "Yamato", "delivered"),
];

const DEMO_RETURNS: &[(&str, &str)] = &[
    ("ORD-2043", "changed mind"),
    ("ORD-2040", "wrong size"),
];

const DEMO_REVIEWS: &[(i64, i64, &str)] = &[
    (1, 5, "Stunning craftsmanship"),
    (2, 5, "Exactly as pictured"),
    (6, 4, "Lovely, clasp is fiddly"),
    (16, 5, "Gift was a hit"),
    (11, 3, "Smaller than expected"),
];

fn read_product_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Product> {
    let created_at_raw: String = row.get(12)?;
    let updated_at_raw: String = row.get(13)?;
    Ok(Product {
        id: ProductId::new(row.get(0)?),
        name: row.get(1)?,
        sku: row.get(2)?,
        price: row.get(3)?,
        stock: row.get(4)?,
        attribute_set: row.get(5)?,
        product_status: row.get(6)?,
        approval_status: row.get(7)?,
        type_name: row.get(8)?,
        design_number: row.get(9)?,
        status: row.get(10)?,
        thumbnail: row.get(11)?,
        created_at: parse_datetime(&created_at_raw).map_err(to_sql_error)?,
        updated_at: parse_datetime(&updated_at_raw).map_err(to_sql_error)?,
    })
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("TIENDA_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set TIENDA_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("tienda.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            bail!(
                "database is missing required table `{table}`; use a tienda-compatible database or migrate first"
            );
        }

        let columns = table_columns(conn, table)?;
        let missing: Vec<&str> = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();

        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}; run migration before launching",
                missing.join(", ")
            );
        }
    }

    Ok(())
}

fn ensure_required_indexes(conn: &Connection) -> Result<()> {
    for index in REQUIRED_INDEXES {
        conn.execute_batch(index.create_sql)
            .with_context(|| format!("ensure required index `{}`", index.name))?;
    }

    let existing_indexes = index_names(conn)?;
    let missing = REQUIRED_INDEXES
        .iter()
        .filter(|index| !existing_indexes.contains(index.name))
        .map(|index| index.name)
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        bail!(
            "database is missing required indexes: {}; run migration before launching",
            missing.join(", ")
        );
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists = conn
        .query_row(
            "
            SELECT EXISTS(
              SELECT 1
              FROM sqlite_master
              WHERE type = 'table' AND name = ?
            )
            ",
            params![table],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("check table existence for {table}"))?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;

    let names = rows
        .collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))?;
    Ok(names)
}

fn index_names(conn: &Connection) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(
            "
            SELECT name
            FROM sqlite_master
            WHERE type = 'index'
              AND name NOT LIKE 'sqlite_%'
            ORDER BY name ASC
            ",
        )
        .context("prepare index names query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query index names")?;
    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .context("collect index names")
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current timestamp")
}

fn parse_datetime(raw: &str) -> Result<OffsetDateTime> {
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(value);
    }

    if let Ok(value) = OffsetDateTime::parse(
        raw,
        &format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]"
        ),
    ) {
        return Ok(value);
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    ) {
        return Ok(value.assume_utc());
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Ok(value.assume_utc());
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    ) {
        return Ok(value.assume_utc());
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Ok(value.assume_utc());
    }

    bail!("unsupported datetime format {raw:?}")
}

fn to_sql_error(error: anyhow::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            error.to_string(),
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::{parse_datetime, validate_db_path};

    #[test]
    fn db_path_validation_rejects_uris() {
        assert!(validate_db_path("postgres://localhost/shop").is_err());
        assert!(validate_db_path("file:shop.db").is_err());
        assert!(validate_db_path("shop.db?mode=ro").is_err());
        assert!(validate_db_path("").is_err());

        assert!(validate_db_path(":memory:").is_ok());
        assert!(validate_db_path("/tmp/shop.db").is_ok());
        assert!(validate_db_path("relative/shop.db").is_ok());
    }

    #[test]
    fn datetime_parsing_accepts_common_storage_formats() {
        for raw in [
            "2026-06-01T09:30:00Z",
            "2026-06-01 09:30:00",
            "2026-06-01 09:30:00.123",
            "2026-06-01T09:30:00.123",
        ] {
            assert!(parse_datetime(raw).is_ok(), "failed on {raw}");
        }
        assert!(parse_datetime("June 1st").is_err());
    }
}
