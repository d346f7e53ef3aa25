//! # Catalog Repository
//!
//! Database operations for products, stores, registers and inventory.
//!
//! ## Inventory Mutation Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Inventory Update Strategy                            │
//! │                                                                         │
//! │  ❌ WRONG for the posting path: absolute update (loses racing sales)   │
//! │     UPDATE inventory SET quantity_millis = 7000 WHERE ...              │
//! │                                                                         │
//! │  ✅ CORRECT: relative delta                                            │
//! │     UPDATE inventory SET quantity_millis = quantity_millis - 3000      │
//! │                                                                         │
//! │  Register A: sells 3 → quantity - 3000                                 │
//! │  Register B: sells 2 → quantity - 2000                                 │
//! │  Any write ordering nets out to -5000. No decrement is ever lost.      │
//! │                                                                         │
//! │  The absolute set exists only for stock-take / administrative          │
//! │  corrections and is outside the engine's concurrency contract.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tillpoint_core::{InventoryLevel, Product, Register, Store};

/// Repository for catalog database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.catalog();
///
/// // Search products at the till
/// let hits = repo.search_products("appl", 20).await?;
///
/// // Administrative stock-take
/// repo.set_inventory(&store.id, &product.id, 12_000).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // =========================================================================
    // Stores & Registers
    // =========================================================================

    /// Inserts a store (provisioning time only).
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Store code already exists
    pub async fn insert_store(&self, store: &Store) -> DbResult<()> {
        debug!(code = %store.code, "Inserting store");

        sqlx::query(
            r#"
            INSERT INTO stores (id, code, name, address, phone, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&store.id)
        .bind(&store.code)
        .bind(&store.name)
        .bind(&store.address)
        .bind(&store.phone)
        .bind(store.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| classify_unique(e.into(), "store code", &store.code))?;

        Ok(())
    }

    /// Gets a store by its ID.
    pub async fn get_store(&self, id: &str) -> DbResult<Option<Store>> {
        let store = sqlx::query_as::<_, Store>(
            r#"
            SELECT id, code, name, address, phone, created_at
            FROM stores
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(store)
    }

    /// Gets a store by its business code (e.g. "001").
    pub async fn get_store_by_code(&self, code: &str) -> DbResult<Option<Store>> {
        let store = sqlx::query_as::<_, Store>(
            r#"
            SELECT id, code, name, address, phone, created_at
            FROM stores
            WHERE code = ?1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(store)
    }

    /// Inserts a register (provisioning time only).
    ///
    /// The register code is unique per store, not globally.
    pub async fn insert_register(&self, register: &Register) -> DbResult<()> {
        debug!(store_id = %register.store_id, code = %register.code, "Inserting register");

        sqlx::query(
            r#"
            INSERT INTO registers (id, store_id, code, name, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&register.id)
        .bind(&register.store_id)
        .bind(&register.code)
        .bind(&register.name)
        .bind(register.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| classify_unique(e.into(), "register code", &register.code))?;

        Ok(())
    }

    /// Gets a register by its ID.
    ///
    /// The caller (the posting engine) verifies that the register belongs
    /// to the requested store; this method does not.
    pub async fn get_register(&self, id: &str) -> DbResult<Option<Register>> {
        let register = sqlx::query_as::<_, Register>(
            r#"
            SELECT id, store_id, code, name, created_at
            FROM registers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(register)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - SKU or barcode already exists,
    ///   with the offending field named so callers can produce an
    ///   "already exists" message without leaking raw SQL error text
    pub async fn insert_product(&self, product: &Product) -> DbResult<()> {
        debug!(sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, barcode, name, category,
                price_cents, tax_rate_bps, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.tax_rate_bps)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| classify_product_unique(e.into(), product))?;

        Ok(())
    }

    /// Updates an existing product.
    ///
    /// Historical transaction lines are untouched: they carry their own
    /// snapshot of price, name and tax taken at posting time.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update_product(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                sku = ?2,
                barcode = ?3,
                name = ?4,
                category = ?5,
                price_cents = ?6,
                tax_rate_bps = ?7,
                is_active = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.tax_rate_bps)
        .bind(product.is_active)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| classify_product_unique(e.into(), product))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Soft-deactivates a product.
    ///
    /// ## Why Soft Delete?
    /// - Historical transaction lines still reference this product
    /// - Can be reactivated if deactivated by mistake
    pub async fn deactivate_product(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deactivating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET is_active = 0, updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Gets a product by its ID, active or not.
    ///
    /// The posting engine checks `is_active` itself so that it can name the
    /// product in its error instead of reporting a generic miss.
    pub async fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, sku, barcode, name, category,
                   price_cents, tax_rate_bps, is_active,
                   created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets an active product by its barcode (scanner path at the till).
    pub async fn get_product_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, sku, barcode, name, category,
                   price_cents, tax_rate_bps, is_active,
                   created_at, updated_at
            FROM products
            WHERE barcode = ?1 AND is_active = 1
            "#,
        )
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Searches active products by prefix over SKU, barcode and name.
    ///
    /// ## Example
    /// ```rust,ignore
    /// // "appl" matches "APL-GALA" by name prefix "Apples"? No - prefix of
    /// // each field: sku "appl...", barcode "appl...", name "Appl...".
    /// let hits = repo.search_products("Appl", 20).await?;
    /// ```
    pub async fn search_products(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list_active(limit).await;
        }

        let pattern = format!("{}%", query);

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, sku, barcode, name, category,
                   price_cents, tax_rate_bps, is_active,
                   created_at, updated_at
            FROM products
            WHERE is_active = 1
              AND (sku LIKE ?1 OR barcode LIKE ?1 OR name LIKE ?1)
            ORDER BY name
            LIMIT ?2
            "#,
        )
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists active products sorted by name (empty-query fallback).
    async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, sku, barcode, name, category,
                   price_cents, tax_rate_bps, is_active,
                   created_at, updated_at
            FROM products
            WHERE is_active = 1
            ORDER BY name
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    /// Gets the stock level of one product at one store.
    ///
    /// `None` means no row exists yet, which reads as a level of zero.
    pub async fn get_inventory(
        &self,
        store_id: &str,
        product_id: &str,
    ) -> DbResult<Option<InventoryLevel>> {
        let level = sqlx::query_as::<_, InventoryLevel>(
            r#"
            SELECT store_id, product_id, quantity_millis, updated_at
            FROM inventory
            WHERE store_id = ?1 AND product_id = ?2
            "#,
        )
        .bind(store_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(level)
    }

    /// Lists all stock levels at a store.
    pub async fn list_inventory(&self, store_id: &str) -> DbResult<Vec<InventoryLevel>> {
        let levels = sqlx::query_as::<_, InventoryLevel>(
            r#"
            SELECT store_id, product_id, quantity_millis, updated_at
            FROM inventory
            WHERE store_id = ?1
            ORDER BY product_id
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(levels)
    }

    /// Sets an absolute stock level (administrative stock-take path).
    ///
    /// This is the ONLY absolute inventory write in the system. It may race
    /// with concurrent postings; that is a documented limitation of the
    /// administrative path, not of the posting engine.
    pub async fn set_inventory(
        &self,
        store_id: &str,
        product_id: &str,
        quantity_millis: i64,
    ) -> DbResult<()> {
        debug!(
            store_id = %store_id,
            product_id = %product_id,
            quantity_millis = %quantity_millis,
            "Setting absolute inventory level"
        );

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO inventory (store_id, product_id, quantity_millis, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (store_id, product_id)
            DO UPDATE SET quantity_millis = excluded.quantity_millis,
                          updated_at = excluded.updated_at
            "#,
        )
        .bind(store_id)
        .bind(product_id)
        .bind(quantity_millis)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Applies a relative stock delta inside the caller's write transaction.
    ///
    /// Negative for sales, positive for refund restocking. Upserts a
    /// zero-based row if none exists, and the level may go negative:
    /// oversell is permitted by design.
    ///
    /// Takes `&mut SqliteConnection` so it joins the engine's atomic
    /// posting unit; it is never called against the pool directly.
    pub async fn adjust_inventory(
        &self,
        conn: &mut SqliteConnection,
        store_id: &str,
        product_id: &str,
        delta_millis: i64,
    ) -> DbResult<()> {
        debug!(
            store_id = %store_id,
            product_id = %product_id,
            delta_millis = %delta_millis,
            "Adjusting inventory"
        );

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO inventory (store_id, product_id, quantity_millis, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (store_id, product_id)
            DO UPDATE SET quantity_millis = inventory.quantity_millis + excluded.quantity_millis,
                          updated_at = excluded.updated_at
            "#,
        )
        .bind(store_id)
        .bind(product_id)
        .bind(delta_millis)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Error Classification Helpers
// =============================================================================

/// Rewrites a generic unique violation so the caller sees the business field
/// and value instead of the raw SQLite constraint text.
fn classify_unique(err: DbError, field: &str, value: &str) -> DbError {
    match err {
        DbError::UniqueViolation { .. } => DbError::duplicate(field, value),
        other => other,
    }
}

/// Classifies product unique violations to the offending column.
fn classify_product_unique(err: DbError, product: &Product) -> DbError {
    match err {
        DbError::UniqueViolation { field, .. } if field.contains("sku") => {
            DbError::duplicate("sku", &product.sku)
        }
        DbError::UniqueViolation { field, .. } if field.contains("barcode") => {
            DbError::duplicate("barcode", product.barcode.clone().unwrap_or_default())
        }
        other => other,
    }
}

/// Generates a new catalog entity ID.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn store(code: &str) -> Store {
        Store {
            id: generate_id(),
            code: code.to_string(),
            name: format!("Store {}", code),
            address: Some("1 Main St".to_string()),
            phone: None,
            created_at: Utc::now(),
        }
    }

    fn product(sku: &str, barcode: Option<&str>) -> Product {
        Product {
            id: generate_id(),
            sku: sku.to_string(),
            barcode: barcode.map(|b| b.to_string()),
            name: format!("Product {}", sku),
            category: Some("test".to_string()),
            price_cents: 299,
            tax_rate_bps: 500,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_store_and_register_roundtrip() {
        let db = test_db().await;
        let catalog = db.catalog();

        let s = store("001");
        catalog.insert_store(&s).await.unwrap();

        let register = Register {
            id: generate_id(),
            store_id: s.id.clone(),
            code: "R1".to_string(),
            name: "Front register".to_string(),
            created_at: Utc::now(),
        };
        catalog.insert_register(&register).await.unwrap();

        let found = catalog.get_store_by_code("001").await.unwrap().unwrap();
        assert_eq!(found.id, s.id);

        let found = catalog.get_register(&register.id).await.unwrap().unwrap();
        assert_eq!(found.store_id, s.id);
        assert_eq!(found.code, "R1");
    }

    #[tokio::test]
    async fn test_duplicate_store_code_names_field() {
        let db = test_db().await;
        let catalog = db.catalog();

        catalog.insert_store(&store("001")).await.unwrap();
        let err = catalog.insert_store(&store("001")).await.unwrap_err();

        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "store code");
                assert_eq!(value, "001");
            }
            other => panic!("expected UniqueViolation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_product_crud_and_duplicate_sku() {
        let db = test_db().await;
        let catalog = db.catalog();

        let mut p = product("APL-GALA", Some("5901234123457"));
        catalog.insert_product(&p).await.unwrap();

        // Duplicate SKU is classified to the business field.
        let dup = product("APL-GALA", None);
        let err = catalog.insert_product(&dup).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::UniqueViolation { ref field, .. } if field == "sku"
        ));

        // Barcode lookup only returns active products.
        let found = catalog
            .get_product_by_barcode("5901234123457")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, p.id);

        p.price_cents = 349;
        catalog.update_product(&p).await.unwrap();
        let found = catalog.get_product(&p.id).await.unwrap().unwrap();
        assert_eq!(found.price_cents, 349);

        catalog.deactivate_product(&p.id).await.unwrap();
        assert!(catalog
            .get_product_by_barcode("5901234123457")
            .await
            .unwrap()
            .is_none());

        // get_product still resolves inactive products (engine names them).
        let found = catalog.get_product(&p.id).await.unwrap().unwrap();
        assert!(!found.is_active);
    }

    #[tokio::test]
    async fn test_search_is_prefix_and_active_only() {
        let db = test_db().await;
        let catalog = db.catalog();

        catalog.insert_product(&product("APL-GALA", None)).await.unwrap();
        catalog.insert_product(&product("APL-FUJI", None)).await.unwrap();
        let inactive = Product {
            is_active: false,
            ..product("APL-OLD", None)
        };
        catalog.insert_product(&inactive).await.unwrap();

        let hits = catalog.search_products("APL-", 10).await.unwrap();
        assert_eq!(hits.len(), 2);

        // No prefix match in the middle of the SKU.
        let hits = catalog.search_products("GALA", 10).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_inventory_set_and_adjust() {
        let db = test_db().await;
        let catalog = db.catalog();

        let s = store("001");
        catalog.insert_store(&s).await.unwrap();
        let p = product("APL-GALA", None);
        catalog.insert_product(&p).await.unwrap();

        // Absolute set creates the row.
        catalog.set_inventory(&s.id, &p.id, 10_000).await.unwrap();

        // Relative adjust inside a write transaction.
        let mut tx = db.begin().await.unwrap();
        catalog
            .adjust_inventory(&mut tx, &s.id, &p.id, -3_000)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let level = catalog.get_inventory(&s.id, &p.id).await.unwrap().unwrap();
        assert_eq!(level.quantity_millis, 7_000);

        // Adjust upserts a zero-based row and may go negative (oversell).
        let p2 = product("APL-FUJI", None);
        catalog.insert_product(&p2).await.unwrap();

        let mut tx = db.begin().await.unwrap();
        catalog
            .adjust_inventory(&mut tx, &s.id, &p2.id, -2_500)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let level = catalog.get_inventory(&s.id, &p2.id).await.unwrap().unwrap();
        assert_eq!(level.quantity_millis, -2_500);
    }
}
