// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityKind {
    Alert,
    Notification,
    Update,
}

impl ActivityKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Notification => "notification",
            Self::Update => "update",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "alert" => Some(Self::Alert),
            "notification" => Some(Self::Notification),
            "update" => Some(Self::Update),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Sale,
    Refund,
    Fee,
}

impl TransactionKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Refund => "refund",
            Self::Fee => "fee",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sale" => Some(Self::Sale),
            "refund" => Some(Self::Refund),
            "fee" => Some(Self::Fee),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabKind {
    Dashboard,
    Products,
    Orders,
    Notifications,
}

impl TabKind {
    pub const ALL: [Self; 4] = [
        Self::Dashboard,
        Self::Products,
        Self::Orders,
        Self::Notifications,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Products => "products",
            Self::Orders => "orders",
            Self::Notifications => "alerts",
        }
    }
}

/// Catalog row as stored. Categorical columns stay free-form strings; the
/// store does not enforce an enumeration for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
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
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Suggested values for the catalog's categorical fields. These drive the
/// edit form's cycling selects and the seeding defaults only.
pub const ATTRIBUTE_SETS: [&str; 4] = ["Ring", "Necklace", "Bracelet", "Earring"];
pub const PRODUCT_STATUSES: [&str; 2] = ["Enabled", "Disabled"];
pub const PRODUCT_TYPES: [&str; 2] = ["Simple", "Configurable"];
pub const STOCK_STATUSES: [&str; 2] = ["active", "out_of_stock"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub customer_name: String,
    pub total_amount: f64,
    pub status: String,
    pub order_date: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub title: String,
    pub description: String,
    pub kind: ActivityKind,
    pub is_read: bool,
    pub created_at: OffsetDateTime,
}

/// One fetch feeds the whole dashboard tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub recent_orders: Vec<Order>,
    pub product_count: u64,
    pub completed_transactions: u64,
    pub lifetime_sales: f64,
    pub activities: Vec<Activity>,
    pub returns_count: u64,
    pub shipments_in_transit: u64,
    pub review_count: u64,
    pub average_rating: f64,
}

impl Default for DashboardSummary {
    fn default() -> Self {
        Self {
            recent_orders: Vec::new(),
            product_count: 0,
            completed_transactions: 0,
            lifetime_sales: 0.0,
            activities: Vec::new(),
            returns_count: 0,
            shipments_in_transit: 0,
            review_count: 0,
            average_rating: 0.0,
        }
    }
}

/// One page of catalog rows plus the exact total row count, replaced
/// atomically on every successful fetch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductPage {
    pub rows: Vec<Product>,
    pub total_count: u64,
}
