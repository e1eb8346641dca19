//! Order placement and retrieval.
//!
//! Placement runs the proposal through [`enzi_core::reconcile`] against the
//! shared catalog and persists only the reconciled result, owned by the
//! authenticated caller.

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use thiserror::Error;

use enzi_core::{Catalog, OrderId, ProposedOrder, ReconcileError, reconcile};

use crate::db::{OrderStore, RepositoryError};
use crate::models::{DailySummary, Identity, NewOrder, Order, Pagination};

/// Why an order operation failed.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The proposal disagreed with the catalog.
    #[error(transparent)]
    Rejected(#[from] ReconcileError),

    /// The store failed.
    #[error("order persistence failed: {0}")]
    Repository(#[from] RepositoryError),
}

/// Inclusive `[start, end]` bounds of one calendar day, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Midnight to 23:59:59.999 of the day containing `now`, in `now`'s zone.
    ///
    /// When a DST transition skips local midnight, the day starts at the
    /// first local time that exists.
    #[must_use]
    pub fn containing<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let resolve = |local: NaiveDateTime| {
            tz.from_local_datetime(&local)
                .earliest()
                .map(|t| t.with_timezone(&Utc))
        };
        Self::for_date(now.date_naive(), now.with_timezone(&Utc), &resolve)
    }

    /// Window for `date`, where `resolve` maps local wall time to UTC (or
    /// `None` inside a gap). Unresolvable bounds fall back to `fallback`.
    fn for_date(
        date: NaiveDate,
        fallback: DateTime<Utc>,
        resolve: &impl Fn(NaiveDateTime) -> Option<DateTime<Utc>>,
    ) -> Self {
        let start = day_start(date, resolve).unwrap_or(fallback);
        let end = date
            .succ_opt()
            .and_then(|next| day_start(next, resolve))
            .map_or(fallback, |next| next - Duration::milliseconds(1));

        Self { date, start, end }
    }
}

/// Granularity used to step over a DST gap; real gaps are whole quarter hours.
const GAP_STEP_MINUTES: i64 = 15;
/// Steps in one day.
const GAP_STEPS: i32 = 96;

/// First existing local instant of `date`, in UTC.
fn day_start(
    date: NaiveDate,
    resolve: &impl Fn(NaiveDateTime) -> Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..GAP_STEPS).find_map(|n| resolve(midnight + Duration::minutes(GAP_STEP_MINUTES) * n))
}

/// Order service over a catalog and an order store.
#[derive(Clone)]
pub struct OrderService {
    catalog: Arc<Catalog>,
    orders: Arc<dyn OrderStore>,
}

impl OrderService {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, orders: Arc<dyn OrderStore>) -> Self {
        Self { catalog, orders }
    }

    /// The order store this service persists to.
    #[must_use]
    pub fn store(&self) -> &dyn OrderStore {
        self.orders.as_ref()
    }

    /// Reconcile a proposal and persist it for `owner`.
    ///
    /// Submitting the same proposal twice creates two orders.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Rejected` with the first reconciliation failure,
    /// or `OrderError::Repository` if the order could not be stored.
    pub async fn place(&self, owner: &Identity, proposed: &ProposedOrder) -> Result<Order, OrderError> {
        let reconciled = reconcile(&self.catalog, proposed).inspect_err(|e| {
            tracing::info!(
                user_id = %owner.id,
                code = e.code(),
                reason = %e,
                "Order rejected"
            );
        })?;

        let order = self
            .orders
            .create(NewOrder::from_reconciled(owner.id, reconciled))
            .await?;

        tracing::info!(
            order_id = %order.id,
            user_id = %owner.id,
            total = %order.total_amount,
            items = order.item_count,
            "Order created"
        );
        Ok(order)
    }

    /// One page of the owner's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the store fails.
    pub async fn list(
        &self,
        owner: &Identity,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Order>, Pagination), OrderError> {
        let (orders, total) = self.orders.list_by_owner(owner.id, page, limit).await?;
        Ok((orders, Pagination::new(page, limit, total)))
    }

    /// The owner's orders for the server-local current day, with totals.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the store fails.
    pub async fn today(&self, owner: &Identity) -> Result<(Vec<Order>, DailySummary), OrderError> {
        self.on_day(owner, DayWindow::containing(&Local::now())).await
    }

    /// The owner's orders within `window`, with totals.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the store fails.
    pub async fn on_day(
        &self,
        owner: &Identity,
        window: DayWindow,
    ) -> Result<(Vec<Order>, DailySummary), OrderError> {
        let orders = self
            .orders
            .list_by_owner_in_window(owner.id, window.start, window.end)
            .await?;
        let summary = DailySummary::from_orders(&orders, window.date);
        Ok((orders, summary))
    }

    /// Fetch one of the owner's orders. Other users' orders are `None`.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the store fails.
    pub async fn find(&self, owner: &Identity, id: OrderId) -> Result<Option<Order>, OrderError> {
        Ok(self.orders.find_by_id_and_owner(id, owner.id).await?)
    }
}
