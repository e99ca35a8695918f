use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use common::{CartLineId, ProductId, UserId};
use domain::{
    Appointment, CartLine, LineKind, OrderStatus, PaymentStatus, Product, ProductCondition,
    UserSummary,
};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    LineQuery, Result, StoreError,
    store::{InventoryStore, ProductRemoval, StatusUpdate, StockUpdate},
};

const PRODUCT_COLUMNS: &str = "id, name, price, gearbox, tank, basic_info, region, color, \
     more_details, photos, condition, rating, stock";

const LINE_COLUMNS: &str = "id, product_id, user_id, payment_status, order_status, kind, \
     quantity, appointment_date, location, phone_number, created_at";

/// PostgreSQL-backed inventory store implementation.
///
/// Stock changes are single conditional `UPDATE` statements, so concurrent
/// writers from any number of processes can never drive stock negative.
#[derive(Clone)]
pub struct PostgresInventoryStore {
    pool: PgPool,
}

impl PostgresInventoryStore {
    /// Creates a new PostgreSQL inventory store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a pool to `database_url` and wraps it.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn corrupt(table: &'static str, id: Uuid, reason: impl Into<String>) -> StoreError {
        let reason = reason.into();
        tracing::warn!(table, %id, %reason, "corrupt record");
        StoreError::CorruptRecord {
            table,
            id: id.to_string(),
            reason,
        }
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        let id: Uuid = row.try_get("id")?;
        let photos: serde_json::Value = row.try_get("photos")?;
        let condition = row
            .try_get::<Option<String>, _>("condition")?
            .map(|c| c.parse::<ProductCondition>())
            .transpose()
            .map_err(|e| Self::corrupt("products", id, e.to_string()))?;
        let stock: i64 = row.try_get("stock")?;
        let stock = u32::try_from(stock)
            .map_err(|_| Self::corrupt("products", id, format!("stock out of range: {stock}")))?;

        Ok(Product {
            id: ProductId::from_uuid(id),
            name: row.try_get("name")?,
            price: row.try_get("price")?,
            gearbox: row.try_get("gearbox")?,
            tank: row.try_get("tank")?,
            basic_info: row.try_get("basic_info")?,
            region: row.try_get("region")?,
            color: row.try_get("color")?,
            more_details: row.try_get("more_details")?,
            photos: serde_json::from_value(photos)?,
            condition,
            rating: row.try_get("rating")?,
            stock,
        })
    }

    fn row_to_line(row: PgRow) -> Result<CartLine> {
        let id: Uuid = row.try_get("id")?;
        let payment_status = row
            .try_get::<String, _>("payment_status")?
            .parse::<PaymentStatus>()
            .map_err(|e| Self::corrupt("cart_lines", id, e.to_string()))?;
        let order_status = row
            .try_get::<Option<String>, _>("order_status")?
            .map(|s| s.parse::<OrderStatus>())
            .transpose()
            .map_err(|e| Self::corrupt("cart_lines", id, e.to_string()))?;

        let kind: String = row.try_get("kind")?;
        let kind = match kind.as_str() {
            "purchase" => {
                let quantity: i64 = row.try_get("quantity")?;
                let quantity = u32::try_from(quantity).map_err(|_| {
                    Self::corrupt("cart_lines", id, format!("quantity out of range: {quantity}"))
                })?;
                LineKind::Purchase { quantity }
            }
            "appointment" => {
                let date: Option<NaiveDate> = row.try_get("appointment_date")?;
                let location: Option<String> = row.try_get("location")?;
                let phone_number: Option<String> = row.try_get("phone_number")?;
                match (date, location, phone_number) {
                    (Some(date), Some(location), Some(phone_number)) => {
                        LineKind::Appointment(Appointment {
                            date,
                            location,
                            phone_number,
                        })
                    }
                    _ => {
                        return Err(Self::corrupt(
                            "cart_lines",
                            id,
                            "appointment is missing date, location or phone number",
                        ));
                    }
                }
            }
            other => {
                return Err(Self::corrupt(
                    "cart_lines",
                    id,
                    format!("unknown line kind: {other}"),
                ));
            }
        };

        Ok(CartLine {
            id: CartLineId::from_uuid(id),
            product_id: ProductId::from_uuid(row.try_get("product_id")?),
            user_id: UserId::from_uuid(row.try_get("user_id")?),
            payment_status,
            order_status,
            kind,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }

    fn map_insert_error(table: &'static str, id: Uuid, e: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return StoreError::DuplicateId {
                table,
                id: id.to_string(),
            };
        }
        StoreError::Database(e)
    }
}

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    async fn insert_product(&self, product: Product) -> Result<()> {
        let photos = serde_json::to_value(&product.photos)?;
        let id = product.id.as_uuid();

        sqlx::query(
            r#"
            INSERT INTO products (id, name, price, gearbox, tank, basic_info, region, color,
                                  more_details, photos, condition, rating, stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(id)
        .bind(&product.name)
        .bind(&product.price)
        .bind(&product.gearbox)
        .bind(&product.tank)
        .bind(&product.basic_info)
        .bind(&product.region)
        .bind(&product.color)
        .bind(&product.more_details)
        .bind(photos)
        .bind(product.condition.map(|c| c.as_str()))
        .bind(product.rating)
        .bind(i64::from(product.stock))
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_insert_error("products", id, e))?;

        Ok(())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn get_products(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.as_uuid()).collect();
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn remove_product_if_unreserved(&self, id: ProductId) -> Result<ProductRemoval> {
        let mut tx = self.pool.begin().await?;

        // Row lock blocks concurrent stock updates until we commit
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM products WHERE id = $1 FOR UPDATE")
                .bind(id.as_uuid())
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(ProductRemoval::Missing);
        }

        let pending: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM cart_lines
            WHERE product_id = $1 AND kind = 'purchase' AND payment_status = 'PENDING'
            "#,
        )
        .bind(id.as_uuid())
        .fetch_one(&mut *tx)
        .await?;
        if pending > 0 {
            return Ok(ProductRemoval::InUse {
                pending_lines: pending as u64,
            });
        }

        let row = sqlx::query(&format!(
            "DELETE FROM products WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .fetch_one(&mut *tx)
        .await?;
        let product = Self::row_to_product(row)?;

        tx.commit().await?;
        Ok(ProductRemoval::Removed(product))
    }

    async fn apply_stock_delta(&self, id: ProductId, delta: i64) -> Result<StockUpdate> {
        let applied: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products SET stock = stock + $2
            WHERE id = $1 AND stock + $2 >= 0 AND stock + $2 <= 4294967295
            RETURNING stock
            "#,
        )
        .bind(id.as_uuid())
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(stock) = applied {
            let stock = u32::try_from(stock).map_err(|_| {
                Self::corrupt("products", id.as_uuid(), format!("stock out of range: {stock}"))
            })?;
            return Ok(StockUpdate::Applied { stock });
        }

        let current: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match current {
            Some(stock) => {
                let stock = u32::try_from(stock).map_err(|_| {
                    Self::corrupt("products", id.as_uuid(), format!("stock out of range: {stock}"))
                })?;
                Ok(StockUpdate::Rejected { stock })
            }
            None => Ok(StockUpdate::ProductMissing),
        }
    }

    async fn total_stock(&self) -> Result<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(stock), 0)::BIGINT FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(total.max(0) as u64)
    }

    async fn insert_line(&self, line: CartLine) -> Result<()> {
        let id = line.id.as_uuid();
        let (kind, quantity, appointment) = match &line.kind {
            LineKind::Purchase { quantity } => ("purchase", i64::from(*quantity), None),
            LineKind::Appointment(appointment) => ("appointment", 0, Some(appointment)),
        };

        sqlx::query(
            r#"
            INSERT INTO cart_lines (id, product_id, user_id, payment_status, order_status, kind,
                                    quantity, appointment_date, location, phone_number, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(id)
        .bind(line.product_id.as_uuid())
        .bind(line.user_id.as_uuid())
        .bind(line.payment_status.as_str())
        .bind(line.order_status.map(|s| s.as_str()))
        .bind(kind)
        .bind(quantity)
        .bind(appointment.map(|a| a.date))
        .bind(appointment.map(|a| a.location.as_str()))
        .bind(appointment.map(|a| a.phone_number.as_str()))
        .bind(line.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_insert_error("cart_lines", id, e))?;

        Ok(())
    }

    async fn get_line(&self, id: CartLineId) -> Result<Option<CartLine>> {
        let row = sqlx::query(&format!(
            "SELECT {LINE_COLUMNS} FROM cart_lines WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_line).transpose()
    }

    async fn delete_line(&self, id: CartLineId) -> Result<Option<CartLine>> {
        let row = sqlx::query(&format!(
            "DELETE FROM cart_lines WHERE id = $1 RETURNING {LINE_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_line).transpose()
    }

    async fn query_lines(&self, query: LineQuery) -> Result<Vec<CartLine>> {
        let mut sql = format!("SELECT {LINE_COLUMNS} FROM cart_lines WHERE 1=1");
        let mut param_count = 0;

        // Build dynamic query
        if query.user_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND user_id = ${param_count}"));
        }
        if query.product_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND product_id = ${param_count}"));
        }
        if query.payment_statuses.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND payment_status = ANY(${param_count})"));
        }
        if query.order_status.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND order_status = ${param_count}"));
        }
        if query.kind.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND kind = ${param_count}"));
        }

        sql.push_str(" ORDER BY created_at ASC, id ASC");

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if query.offset.is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        let mut sqlx_query = sqlx::query(&sql);

        if let Some(user_id) = query.user_id {
            sqlx_query = sqlx_query.bind(user_id.as_uuid());
        }
        if let Some(product_id) = query.product_id {
            sqlx_query = sqlx_query.bind(product_id.as_uuid());
        }
        if let Some(statuses) = query.payment_statuses {
            let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
            sqlx_query = sqlx_query.bind(statuses);
        }
        if let Some(status) = query.order_status {
            sqlx_query = sqlx_query.bind(status.as_str());
        }
        if let Some(kind) = query.kind {
            sqlx_query = sqlx_query.bind(kind.as_str());
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            sqlx_query = sqlx_query.bind(offset as i64);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_line).collect()
    }

    async fn total_line_quantity(&self) -> Result<u64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM cart_lines WHERE kind = 'purchase'",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(total.max(0) as u64)
    }

    async fn mark_lines_paid(&self, user_id: UserId) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE cart_lines SET payment_status = 'PAID'
            WHERE user_id = $1 AND payment_status = 'PENDING'
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn compare_and_set_order_status(
        &self,
        id: CartLineId,
        expected: Option<OrderStatus>,
        new_status: OrderStatus,
    ) -> Result<StatusUpdate> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE cart_lines SET order_status = $3
            WHERE id = $1 AND order_status IS NOT DISTINCT FROM $2
            RETURNING {LINE_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(expected.map(|s| s.as_str()))
        .bind(new_status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(StatusUpdate::Updated(Self::row_to_line(row)?));
        }

        match self.get_line(id).await? {
            Some(line) => Ok(StatusUpdate::Stale {
                current: line.order_status,
            }),
            None => Ok(StatusUpdate::LineMissing),
        }
    }

    async fn upsert_user(&self, user: UserSummary) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, names)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                names = EXCLUDED.names
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.names)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_users(&self, ids: &[UserId]) -> Result<Vec<UserSummary>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.as_uuid()).collect();
        let rows = sqlx::query("SELECT id, email, names FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| -> Result<UserSummary> {
                Ok(UserSummary {
                    id: UserId::from_uuid(row.try_get("id")?),
                    email: row.try_get("email")?,
                    names: row.try_get("names")?,
                })
            })
            .collect()
    }
}
