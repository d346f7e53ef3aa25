//! # Seed Data Generator
//!
//! Provisions a demo store, register and catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database (./tillpoint.db)
//! cargo run -p tillpoint-db --bin seed
//!
//! # Specify a database path
//! cargo run -p tillpoint-db --bin seed -- --db ./data/tillpoint.db
//! ```
//!
//! ## Generated Data
//! - Store "001" (Main Street Market) with register "R1"
//! - A small grocery catalog: unit-priced items and per-kilo weighed goods
//! - Starting inventory at the store for every product
//!
//! Idempotent enough for development: re-running against a seeded database
//! reports the duplicates and leaves the existing rows alone.

use chrono::Utc;
use std::env;
use uuid::Uuid;

use tillpoint_core::{Product, Register, Store};
use tillpoint_db::{Database, DbConfig, DbError};

/// Demo catalog: (sku, barcode, name, category, price_cents, tax_rate_bps,
/// starting stock in milliunits).
///
/// Weighed goods (per-kilo prices) get fractional-friendly stock levels.
const PRODUCTS: &[(&str, Option<&str>, &str, &str, i64, u32, i64)] = &[
    ("APL-GALA", Some("4011200296906"), "Gala Apples (kg)", "produce", 299, 500, 25_000),
    ("BAN-CAV", Some("4011300296913"), "Bananas (kg)", "produce", 159, 0, 40_000),
    ("CHS-CHED", Some("2000000000017"), "Cheddar Wedge (kg)", "dairy", 1200, 500, 8_500),
    ("MLK-2L", Some("5901234123457"), "Milk 2L", "dairy", 349, 0, 60_000),
    ("BRD-WHT", Some("5901234123464"), "White Bread", "bakery", 249, 0, 30_000),
    ("EGG-12", Some("5901234123471"), "Eggs Dozen", "dairy", 499, 0, 24_000),
    ("COF-250", Some("5901234123488"), "Ground Coffee 250g", "grocery", 799, 825, 18_000),
    ("CER-OAT", Some("5901234123495"), "Rolled Oats 1kg", "grocery", 429, 0, 22_000),
    ("SOD-COLA", Some("5449000000996"), "Cola 330ml", "beverages", 129, 1000, 120_000),
    ("WTR-1L", Some("5449000001009"), "Still Water 1L", "beverages", 99, 0, 90_000),
    ("CHO-BAR", Some("7622210449283"), "Chocolate Bar", "snacks", 189, 1000, 75_000),
    ("CRS-SALT", Some("5053990156368"), "Salted Crisps", "snacks", 149, 1000, 48_000),
];

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let db_path = parse_db_path().unwrap_or_else(|| "./tillpoint.db".to_string());

    tracing::info!(path = %db_path, "Seeding database");

    let db = match Database::new(DbConfig::new(&db_path)).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(error = %e, "Failed to open database");
            std::process::exit(1);
        }
    };

    if let Err(e) = seed(&db).await {
        tracing::error!(error = %e, "Seeding failed");
        std::process::exit(1);
    }

    tracing::info!("Seeding complete");
}

/// Extracts `--db <path>` from the command line.
fn parse_db_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .cloned()
}

async fn seed(db: &Database) -> Result<(), DbError> {
    let catalog = db.catalog();
    let now = Utc::now();

    // Store and register. Duplicates mean a previous run already provisioned
    // them; look the store up instead so inventory still lands correctly.
    let store = Store {
        id: Uuid::new_v4().to_string(),
        code: "001".to_string(),
        name: "Main Street Market".to_string(),
        address: Some("42 Main Street".to_string()),
        phone: Some("555-0142".to_string()),
        created_at: now,
    };

    let store = match catalog.insert_store(&store).await {
        Ok(()) => {
            tracing::info!(code = %store.code, "Created store");
            store
        }
        Err(DbError::UniqueViolation { .. }) => {
            tracing::info!(code = %store.code, "Store already exists, reusing");
            catalog
                .get_store_by_code(&store.code)
                .await?
                .ok_or_else(|| DbError::not_found("Store", &store.code))?
        }
        Err(e) => return Err(e),
    };

    let register = Register {
        id: Uuid::new_v4().to_string(),
        store_id: store.id.clone(),
        code: "R1".to_string(),
        name: "Front register".to_string(),
        created_at: now,
    };

    match catalog.insert_register(&register).await {
        Ok(()) => tracing::info!(code = %register.code, "Created register"),
        Err(DbError::UniqueViolation { .. }) => {
            tracing::info!(code = %register.code, "Register already exists, skipping");
        }
        Err(e) => return Err(e),
    }

    // Catalog and starting stock.
    let mut created = 0usize;
    let mut skipped = 0usize;

    for &(sku, barcode, name, category, price_cents, tax_rate_bps, stock_millis) in PRODUCTS {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku: sku.to_string(),
            barcode: barcode.map(|b| b.to_string()),
            name: name.to_string(),
            category: Some(category.to_string()),
            price_cents,
            tax_rate_bps,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        match catalog.insert_product(&product).await {
            Ok(()) => {
                catalog
                    .set_inventory(&store.id, &product.id, stock_millis)
                    .await?;
                created += 1;
            }
            Err(DbError::UniqueViolation { .. }) => {
                skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(created, skipped, "Catalog seeded");
    Ok(())
}
