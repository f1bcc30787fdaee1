// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::path::PathBuf;

const GEMSTONES: [&str; 16] = [
    "Sapphire",
    "Emerald",
    "Ruby",
    "Opal",
    "Topaz",
    "Garnet",
    "Amethyst",
    "Citrine",
    "Peridot",
    "Aquamarine",
    "Tanzanite",
    "Morganite",
    "Tourmaline",
    "Moonstone",
    "Spinel",
    "Zircon",
];

const SETTINGS: [&str; 8] = [
    "Solitaire",
    "Halo",
    "Pave",
    "Bezel",
    "Channel",
    "Cluster",
    "Twist",
    "Vintage",
];

const KINDS: [(&str, &str, &str); 4] = [
    ("Ring", "Ring", "DR"),
    ("Necklace", "Necklace", "DN"),
    ("Cuff", "Bracelet", "DB"),
    ("Studs", "Earring", "DE"),
];

const SKU_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone, PartialEq)]
pub struct FakeProduct {
    pub name: String,
    pub sku: String,
    pub price: f64,
    pub stock: i64,
    pub attribute_set: String,
    pub type_name: String,
    pub design_number: String,
    pub status: String,
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Deterministic catalog generator for the store integration tests.
#[derive(Debug, Clone)]
pub struct ShopFaker {
    rng: DeterministicRng,
    serial: u32,
}

impl ShopFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            serial: 0,
        }
    }

    pub fn product(&mut self) -> FakeProduct {
        let gem = self.pick(&GEMSTONES);
        let setting = self.pick(&SETTINGS);
        let (noun, attribute_set, design_prefix) = KINDS[self.rng.int_n(KINDS.len())];
        self.serial += 1;

        let stock = self.int_range_i64(0, 14);
        let status = if stock == 0 { "out_of_stock" } else { "active" };

        FakeProduct {
            name: format!("{gem} {setting} {noun}"),
            sku: self.sku(),
            price: self.int_range_i64(40_000, 700_000) as f64,
            stock,
            attribute_set: attribute_set.to_owned(),
            type_name: "Simple".to_owned(),
            design_number: format!("{design_prefix}-{:04}", 1000 + self.serial),
            status: status.to_owned(),
        }
    }

    pub fn sku(&mut self) -> String {
        let mut blocks = Vec::with_capacity(3);
        for len in [2usize, 4, 4] {
            let mut block = String::with_capacity(len);
            for _ in 0..len {
                let byte = SKU_ALPHABET[self.rng.int_n(SKU_ALPHABET.len())];
                block.push(byte as char);
            }
            blocks.push(block);
        }
        blocks.join("-")
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range_i64(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("tienda.db");
    Ok((dir, db_path))
}

#[cfg(test)]
mod tests {
    use super::ShopFaker;
    use std::collections::BTreeSet;

    #[test]
    fn same_seed_generates_same_products() {
        let mut left = ShopFaker::new(42);
        let mut right = ShopFaker::new(42);
        assert_eq!(left.product(), right.product());
    }

    #[test]
    fn product_fields_are_populated() {
        let mut faker = ShopFaker::new(7);
        let product = faker.product();
        assert!(!product.name.is_empty());
        assert_eq!(product.sku.len(), 12);
        assert!(product.price >= 40_000.0);
        assert!(product.stock >= 0);
        assert!(["Ring", "Necklace", "Bracelet", "Earring"]
            .contains(&product.attribute_set.as_str()));
        if product.stock == 0 {
            assert_eq!(product.status, "out_of_stock");
        } else {
            assert_eq!(product.status, "active");
        }
    }

    #[test]
    fn skus_vary_across_draws() {
        let mut faker = ShopFaker::new(3);
        let mut skus = BTreeSet::new();
        for _ in 0..20 {
            skus.insert(faker.sku());
        }
        assert!(skus.len() >= 19, "got {}", skus.len());
    }
}
