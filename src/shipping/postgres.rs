//! PostgreSQL-backed repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use super::error::ShippingError;
use super::model::{NewShipping, ShippingFilter, ShippingRecord};
use super::repository::ShippingRepository;

const COLUMNS: &str = r#"id, "userId", "productId", count, status, "createdAt""#;

/// Stores shipments in the `shipping` table.
///
/// Column names are quoted camelCase so an existing table created by other
/// tooling for the same API can be reused as-is.
#[derive(Clone)]
pub struct PgShippingRepository {
    pool: PgPool,
}

impl PgShippingRepository {
    /// Opens a pool against `url` and makes sure the table exists.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        let repo = Self::new(pool);
        repo.ensure_schema().await?;
        info!(max_connections, "connected to postgres");
        Ok(repo)
    }

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS shipping (
                id          SERIAL PRIMARY KEY,
                "userId"    INTEGER NOT NULL,
                "productId" INTEGER NOT NULL,
                count       INTEGER NOT NULL,
                status      TEXT NOT NULL DEFAULT 'pending',
                "createdAt" TIMESTAMPTZ NOT NULL DEFAULT now()
            )"#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ShippingRow {
    id: i32,
    #[sqlx(rename = "userId")]
    user_id: i32,
    #[sqlx(rename = "productId")]
    product_id: i32,
    count: i32,
    status: String,
    #[sqlx(rename = "createdAt")]
    created_at: DateTime<Utc>,
}

impl TryFrom<ShippingRow> for ShippingRecord {
    type Error = ShippingError;

    fn try_from(row: ShippingRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|e| ShippingError::Corrupt(format!("row {}: {e}", row.id)))?;
        Ok(ShippingRecord {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            count: row.count,
            status,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl ShippingRepository for PgShippingRepository {
    async fn create(&self, shipping: NewShipping) -> Result<ShippingRecord, ShippingError> {
        let sql = format!(
            r#"INSERT INTO shipping ("userId", "productId", count) VALUES ($1, $2, $3) RETURNING {COLUMNS}"#
        );
        let row: ShippingRow = sqlx::query_as::<_, ShippingRow>(&sql)
            .bind(shipping.user_id)
            .bind(shipping.product_id)
            .bind(shipping.count)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ShippingRecord>, ShippingError> {
        let sql = format!("SELECT {COLUMNS} FROM shipping WHERE id = $1");
        let row: Option<ShippingRow> = sqlx::query_as::<_, ShippingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(ShippingRecord::try_from).transpose()
    }

    async fn cancel(&self, id: i32) -> Result<ShippingRecord, ShippingError> {
        let sql = format!("UPDATE shipping SET status = 'cancelled' WHERE id = $1 RETURNING {COLUMNS}");
        let row: Option<ShippingRow> = sqlx::query_as::<_, ShippingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or(ShippingError::NotFound(id))?.try_into()
    }

    async fn find_many(&self, filter: ShippingFilter) -> Result<Vec<ShippingRecord>, ShippingError> {
        let sql = format!(
            r#"SELECT {COLUMNS} FROM shipping WHERE ($1::INTEGER IS NULL OR "userId" = $1) ORDER BY id"#
        );
        let rows: Vec<ShippingRow> = sqlx::query_as::<_, ShippingRow>(&sql)
            .bind(filter.user_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(ShippingRecord::try_from).collect()
    }

    async fn ping(&self) -> Result<(), ShippingError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("postgres pool closed");
    }
}
