//! Order domain types and response views.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use enzi_core::{OrderId, OrderLine, ReconciledOrder, UserId};

use super::user::Identity;

/// A persisted order. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_amount: Decimal,
    pub item_count: i32,
    /// Snapshot of what was bought, priced from the catalog.
    pub items: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Response shape, embedding the owning user.
    #[must_use]
    pub fn view(self, owner: &Identity) -> OrderView {
        OrderView {
            id: self.id,
            total_amount: self.total_amount,
            item_count: self.item_count,
            items: self.items,
            created_at: self.created_at,
            user: owner.clone(),
        }
    }
}

/// Input for persisting an order. The store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub total_amount: Decimal,
    pub item_count: i32,
    pub items: Vec<OrderLine>,
}

impl NewOrder {
    /// Pair a reconciled order with its owner.
    #[must_use]
    pub fn from_reconciled(user_id: UserId, order: ReconciledOrder) -> Self {
        Self {
            user_id,
            total_amount: order.total_amount,
            item_count: order.item_count,
            items: order.items,
        }
    }
}

/// An order as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub item_count: i32,
    pub items: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
    pub user: Identity,
}

/// Page metadata for order listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    #[must_use]
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let limit_wide = i64::from(limit.max(1));
        Self {
            page,
            limit,
            total,
            total_pages: (total + limit_wide - 1) / limit_wide,
        }
    }
}

/// Totals over one day's orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub total_orders: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub total_items: i64,
    /// Server-local calendar date, `YYYY-MM-DD`.
    pub date: NaiveDate,
}

impl DailySummary {
    #[must_use]
    pub fn from_orders(orders: &[Order], date: NaiveDate) -> Self {
        Self {
            total_orders: orders.len(),
            total_amount: orders.iter().map(|o| o.total_amount).sum(),
            total_items: orders.iter().map(|o| i64::from(o.item_count)).sum(),
            date,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use enzi_core::{Email, MenuItemId, Quantity};

    fn order(total_cents: i64, item_count: i32) -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::generate(),
            user_id: UserId::generate(),
            total_amount: Decimal::new(total_cents, 2),
            item_count,
            items: vec![OrderLine {
                id: MenuItemId::new(1),
                name: "Espresso".to_owned(),
                price: Decimal::new(250, 2),
                quantity: Quantity::new(i64::from(item_count)).unwrap(),
            }],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_pagination_total_pages_rounds_up() {
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 10, 10).total_pages, 1);
        assert_eq!(Pagination::new(1, 10, 11).total_pages, 2);
        assert_eq!(Pagination::new(3, 4, 9).total_pages, 3);
    }

    #[test]
    fn test_daily_summary_sums() {
        let orders = vec![order(500, 2), order(750, 3)];
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let summary = DailySummary::from_orders(&orders, date);

        assert_eq!(summary.total_orders, 2);
        assert_eq!(summary.total_amount, Decimal::new(1250, 2));
        assert_eq!(summary.total_items, 5);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["date"], "2026-10-18");
        assert_eq!(json["totalAmount"], 12.5);
    }

    #[test]
    fn test_view_embeds_owner() {
        let owner = Identity {
            id: UserId::generate(),
            email: Email::parse("barista@enzi.coffee").unwrap(),
            name: "Barista".to_owned(),
        };
        let json = serde_json::to_value(order(500, 2).view(&owner)).unwrap();

        assert_eq!(json["totalAmount"], 5.0);
        assert_eq!(json["itemCount"], 2);
        assert_eq!(json["user"]["email"], "barista@enzi.coffee");
        assert!(json.get("userId").is_none());
    }
}
