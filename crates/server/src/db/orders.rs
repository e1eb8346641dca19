//! `PostgreSQL` order repository.
//!
//! Line snapshots live in a `JSONB` column; money is `NUMERIC(10,2)`.
//! Every read filters on `user_id` so ownership is part of the predicate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use enzi_core::{OrderId, OrderLine, UserId};

use super::{OrderStore, RepositoryError, page_offset};
use crate::models::{NewOrder, Order};

const ORDER_COLUMNS: &str = "id, user_id, total_amount, item_count, items, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    total_amount: Decimal,
    item_count: i32,
    items: Json<Vec<OrderLine>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            total_amount: row.total_amount,
            item_count: row.item_count,
            items: row.items.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Order store backed by the `orders` table.
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let sql = format!(
            "INSERT INTO orders (id, user_id, total_amount, item_count, items) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(OrderId::generate())
            .bind(order.user_id)
            .bind(order.total_amount)
            .bind(order.item_count)
            .bind(Json(&order.items))
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn list_by_owner(
        &self,
        owner: UserId,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Order>, i64), RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE user_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(owner)
            .bind(i64::from(limit))
            .bind(page_offset(page, limit))
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;

        Ok((rows.into_iter().map(Order::from).collect(), total))
    }

    async fn list_by_owner_in_window(
        &self,
        owner: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE user_id = $1 AND created_at >= $2 AND created_at <= $3 \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(owner)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn find_by_id_and_owner(
        &self,
        id: OrderId,
        owner: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND user_id = $2");
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Order::from))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
