//! Database operations for the products table.

use async_trait::async_trait;
use catalog_engine::{
    error::Result, Clause, Error, LocalProduct, ProductId, ProductStore, SegmentCondition,
    StockStatus,
};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

const SELECT_PRODUCTS: &str = r#"
    SELECT id, name, description, price, sku, stock, stock_status,
           on_sale, category, tags, is_active
    FROM products"#;

/// A stored product row from the database.
#[derive(Debug)]
pub struct StoredProduct {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub sku: String,
    pub stock: i32,
    pub stock_status: String,
    pub on_sale: bool,
    pub category: String,
    pub tags: String,
    pub is_active: bool,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for StoredProduct {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(StoredProduct {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            sku: row.try_get("sku")?,
            stock: row.try_get("stock")?,
            stock_status: row.try_get("stock_status")?,
            on_sale: row.try_get("on_sale")?,
            category: row.try_get("category")?,
            tags: row.try_get("tags")?,
            is_active: row.try_get("is_active")?,
        })
    }
}

impl StoredProduct {
    /// Convert database row to an engine product.
    pub fn into_product(self) -> LocalProduct {
        // The column CHECK constraint keeps unknown statuses out.
        let stock_status = self.stock_status.parse().unwrap_or_else(|_| {
            tracing::warn!(product_id = self.id, status = %self.stock_status, "unknown stock status");
            StockStatus::default()
        });

        LocalProduct {
            id: self.id,
            name: self.name,
            description: self.description,
            price: self.price,
            sku: self.sku,
            stock: self.stock,
            stock_status,
            on_sale: self.on_sale,
            category: self.category,
            tags: self.tags,
            is_active: self.is_active,
        }
    }
}

/// Build the SELECT for a segment condition.
///
/// Every value is a bind parameter. The only text spliced into the SQL comes
/// from fixed strings, including the price operator via [`catalog_engine::Comparator::as_sql`].
pub fn segment_query(condition: &SegmentCondition) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(SELECT_PRODUCTS);
    let mut separator = " WHERE ";

    for clause in condition {
        builder.push(separator);
        separator = " AND ";

        match clause {
            Clause::OnSale => {
                builder.push("on_sale = ").push_bind(true);
            }
            Clause::StockStatus { status } => {
                builder.push("stock_status = ").push_bind(status.as_str());
            }
            Clause::Price { op, value } => {
                builder
                    .push("price ")
                    .push(op.as_sql())
                    .push(" ")
                    .push_bind(*value);
            }
            Clause::Category { contains } => {
                builder
                    .push("category ILIKE ")
                    .push_bind(like_pattern(contains))
                    .push(r" ESCAPE '\'");
            }
            Clause::Tag { contains } => {
                builder
                    .push("tags ILIKE ")
                    .push_bind(like_pattern(contains))
                    .push(r" ESCAPE '\'");
            }
        }
    }

    builder.push(" ORDER BY id");
    builder
}

/// Wrap a value in `%...%`, escaping LIKE metacharacters so it matches literally.
fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// PostgreSQL-backed product store.
#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn find(&self, id: ProductId) -> Result<Option<LocalProduct>> {
        let sql = format!("{SELECT_PRODUCTS} WHERE id = $1");
        let row = sqlx::query_as::<_, StoredProduct>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::StoreQueryFailed(e.to_string()))?;

        Ok(row.map(StoredProduct::into_product))
    }

    async fn insert(&self, product: &LocalProduct) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, price, sku, stock,
                stock_status, on_sale, category, tags, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.sku)
        .bind(product.stock)
        .bind(product.stock_status.as_str())
        .bind(product.on_sale)
        .bind(&product.category)
        .bind(&product.tags)
        .bind(product.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::write_failed(product.id, e.to_string()))?;

        Ok(())
    }

    async fn update(&self, product: &LocalProduct) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = $2,
                description = $3,
                price = $4,
                sku = $5,
                stock = $6,
                stock_status = $7,
                on_sale = $8,
                category = $9,
                tags = $10,
                is_active = $11,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.sku)
        .bind(product.stock)
        .bind(product.stock_status.as_str())
        .bind(product.on_sale)
        .bind(&product.category)
        .bind(&product.tags)
        .bind(product.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::write_failed(product.id, e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(Error::write_failed(product.id, "product not found"));
        }

        Ok(())
    }

    async fn query(&self, condition: &SegmentCondition) -> Result<Vec<LocalProduct>> {
        let rows = segment_query(condition)
            .build_query_as::<StoredProduct>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::StoreQueryFailed(e.to_string()))?;

        Ok(rows.into_iter().map(StoredProduct::into_product).collect())
    }
}
