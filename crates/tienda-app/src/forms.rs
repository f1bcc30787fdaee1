// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;

use anyhow::{Result, bail};

use crate::Product;

/// Editable fields carried by a product save, written in one update together
/// with a fresh `updated_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub name: String,
    pub sku: String,
    pub attribute_set: String,
    pub product_status: String,
    pub type_name: String,
    pub design_number: String,
    pub stock: i64,
    pub price: f64,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Stock,
    Price,
}

impl NumericField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stock => "quantity",
            Self::Price => "price",
        }
    }
}

/// A numeric field whose text does not parse. Surfaced to the user instead
/// of silently falling back to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldParseError {
    pub field: NumericField,
    pub raw: String,
}

impl fmt::Display for FieldParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' is not a valid number -- correct it and retry",
            self.field.label(),
            self.raw.trim()
        )
    }
}

impl std::error::Error for FieldParseError {}

/// In-progress edit form. Numeric fields stay raw text until save so the
/// user's keystrokes survive a rejected save untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFormInput {
    pub name: String,
    pub sku: String,
    pub attribute_set: String,
    pub product_status: String,
    pub type_name: String,
    pub design_number: String,
    pub stock: String,
    pub price: String,
    pub status: String,
}

fn or_default(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_owned()
    } else {
        value.to_owned()
    }
}

fn format_price(price: f64) -> String {
    if price == price.trunc() {
        format!("{}", price as i64)
    } else {
        format!("{price}")
    }
}

impl ProductFormInput {
    /// Seeds the form from a fetched record. Absent categorical fields fall
    /// back to the first option of their select; absent numerics seed zero.
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            sku: product.sku.clone(),
            attribute_set: or_default(&product.attribute_set, "Ring"),
            product_status: or_default(&product.product_status, "Enabled"),
            type_name: or_default(&product.type_name, "Simple"),
            design_number: product.design_number.clone(),
            stock: product.stock.to_string(),
            price: format_price(product.price),
            status: or_default(&product.status, "active"),
        }
    }

    /// Empty quantity seeds zero; anything else must parse as a
    /// non-negative integer.
    pub fn parse_stock(&self) -> std::result::Result<i64, FieldParseError> {
        let raw = self.stock.trim();
        if raw.is_empty() {
            return Ok(0);
        }
        match raw.parse::<i64>() {
            Ok(value) if value >= 0 => Ok(value),
            _ => Err(FieldParseError {
                field: NumericField::Stock,
                raw: self.stock.clone(),
            }),
        }
    }

    pub fn parse_price(&self) -> std::result::Result<f64, FieldParseError> {
        let raw = self.price.trim();
        if raw.is_empty() {
            return Ok(0.0);
        }
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
            _ => Err(FieldParseError {
                field: NumericField::Price,
                raw: self.price.clone(),
            }),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("product name is required -- enter a name and retry");
        }
        if self.sku.trim().is_empty() {
            bail!("product SKU is required -- enter a SKU and retry");
        }
        self.parse_stock()?;
        self.parse_price()?;
        Ok(())
    }

    /// Full save payload. Fails on the first invalid field; the form itself
    /// is left untouched for the retry.
    pub fn to_update(&self) -> Result<ProductUpdate> {
        self.validate()?;
        Ok(ProductUpdate {
            name: self.name.trim().to_owned(),
            sku: self.sku.trim().to_owned(),
            attribute_set: self.attribute_set.clone(),
            product_status: self.product_status.clone(),
            type_name: self.type_name.clone(),
            design_number: self.design_number.trim().to_owned(),
            stock: self.parse_stock()?,
            price: self.parse_price()?,
            status: self.status.clone(),
        })
    }
}
