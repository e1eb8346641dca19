//! Order reconciliation.
//!
//! A client submits a [`ProposedOrder`]: the lines it believes it is buying,
//! plus the total and item count it computed locally. None of the money in a
//! proposal is trusted. [`reconcile`] re-derives the total and count from the
//! [`Catalog`] and either returns a [`ReconciledOrder`] built purely from
//! catalog data, or the first reason the proposal cannot be accepted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::menu::Catalog;
use crate::types::{MenuItemId, Quantity, line_total, within_tolerance};

/// One line of a client-proposed order.
///
/// `claimed_name` and `claimed_price` are what the client displayed. They are
/// carried for diagnostics only and never reach a persisted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedOrderLine {
    pub item_id: MenuItemId,
    pub quantity: Quantity,
    pub claimed_name: String,
    pub claimed_price: Decimal,
}

/// An order as assembled by the client, before any server-side checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedOrder {
    pub lines: Vec<ProposedOrderLine>,
    pub claimed_total: Decimal,
    pub claimed_item_count: i32,
}

/// Snapshot of one purchased item, frozen at the time of purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: MenuItemId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: Quantity,
}

impl OrderLine {
    /// `price × quantity` for this line.
    #[must_use]
    pub fn total(&self) -> Decimal {
        line_total(self.price, self.quantity.get())
    }
}

/// A proposal that passed reconciliation; every value here comes from the
/// catalog, not from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledOrder {
    pub total_amount: Decimal,
    pub item_count: i32,
    pub items: Vec<OrderLine>,
}

/// Why a proposed order was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    /// The proposal has no lines.
    #[error("order must contain at least one item")]
    EmptyOrder,

    /// A line references an id the catalog does not offer (unknown or
    /// unavailable).
    #[error("menu item with id {item_id} not found")]
    InvalidMenuItem { item_id: MenuItemId },

    /// The claimed total is more than one cent away from the catalog total.
    #[error("total amount {claimed} does not match calculated total {trusted}")]
    TotalMismatch { claimed: Decimal, trusted: Decimal },

    /// The claimed item count differs from the sum of line quantities.
    #[error("item count {claimed} does not match calculated count {trusted}")]
    ItemCountMismatch { claimed: i32, trusted: i32 },
}

impl ReconcileError {
    /// Stable machine-readable code for API clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyOrder => "EMPTY_ORDER",
            Self::InvalidMenuItem { .. } => "INVALID_MENU_ITEM",
            Self::TotalMismatch { .. } => "TOTAL_MISMATCH",
            Self::ItemCountMismatch { .. } => "ITEM_COUNT_MISMATCH",
        }
    }
}

/// Check a proposed order against the catalog.
///
/// Lines are processed in input order and the first unknown item aborts the
/// whole order. The total comparison allows [`TOTAL_TOLERANCE`] of drift; the
/// item count must match exactly. The result is built from catalog names and
/// prices only.
///
/// [`TOTAL_TOLERANCE`]: crate::types::TOTAL_TOLERANCE
///
/// # Errors
///
/// Returns the first `ReconcileError` encountered.
pub fn reconcile(
    catalog: &Catalog,
    proposed: &ProposedOrder,
) -> Result<ReconciledOrder, ReconcileError> {
    if proposed.lines.is_empty() {
        return Err(ReconcileError::EmptyOrder);
    }

    let mut trusted_total = Decimal::ZERO;
    let mut trusted_count: i32 = 0;
    let mut items = Vec::with_capacity(proposed.lines.len());

    for line in &proposed.lines {
        let menu_item = catalog
            .get(line.item_id)
            .ok_or(ReconcileError::InvalidMenuItem {
                item_id: line.item_id,
            })?;

        trusted_total += line_total(menu_item.price, line.quantity.get());
        trusted_count = trusted_count.saturating_add(i32::from(line.quantity));

        items.push(OrderLine {
            id: menu_item.id,
            name: menu_item.name.clone(),
            price: menu_item.price,
            quantity: line.quantity,
        });
    }

    if !within_tolerance(trusted_total, proposed.claimed_total) {
        return Err(ReconcileError::TotalMismatch {
            claimed: proposed.claimed_total,
            trusted: trusted_total,
        });
    }

    if trusted_count != proposed.claimed_item_count {
        return Err(ReconcileError::ItemCountMismatch {
            claimed: proposed.claimed_item_count,
            trusted: trusted_count,
        });
    }

    Ok(ReconciledOrder {
        total_amount: trusted_total,
        item_count: trusted_count,
        items,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::menu::MenuItem;
    use crate::types::Category;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(id: i32, quantity: i64, name: &str, price: &str) -> ProposedOrderLine {
        ProposedOrderLine {
            item_id: MenuItemId::new(id),
            quantity: Quantity::new(quantity).unwrap(),
            claimed_name: name.to_owned(),
            claimed_price: d(price),
        }
    }

    fn proposal(lines: Vec<ProposedOrderLine>, total: &str, count: i32) -> ProposedOrder {
        ProposedOrder {
            lines,
            claimed_total: d(total),
            claimed_item_count: count,
        }
    }

    fn catalog_with_unavailable_item() -> Catalog {
        let mut items = Catalog::builtin().declared().to_vec();
        items.push(MenuItem {
            id: MenuItemId::new(42),
            name: "Pumpkin Spice Latte".to_owned(),
            price: d("5.25"),
            description: "Seasonal".to_owned(),
            category: Category::Hot,
            available: false,
        });
        Catalog::new(items).unwrap()
    }

    #[test]
    fn test_accepts_matching_single_line() {
        let order = reconcile(
            &Catalog::builtin(),
            &proposal(vec![line(1, 2, "Espresso", "2.50")], "5.00", 2),
        )
        .unwrap();

        assert_eq!(order.total_amount, d("5.00"));
        assert_eq!(order.item_count, 2);
        assert_eq!(order.items.len(), 1);
    }

    #[test]
    fn test_rejects_total_outside_tolerance() {
        let err = reconcile(
            &Catalog::builtin(),
            &proposal(vec![line(1, 2, "Espresso", "2.50")], "5.50", 2),
        )
        .unwrap_err();

        assert_eq!(
            err,
            ReconcileError::TotalMismatch {
                claimed: d("5.50"),
                trusted: d("5.00"),
            }
        );
        assert_eq!(err.code(), "TOTAL_MISMATCH");
    }

    #[test]
    fn test_accepts_total_within_tolerance() {
        let catalog = Catalog::builtin();
        for claimed in ["5.001", "5.01", "4.99"] {
            let result = reconcile(
                &catalog,
                &proposal(vec![line(1, 2, "Espresso", "2.50")], claimed, 2),
            );
            assert!(result.is_ok(), "claimed total {claimed} should be accepted");
        }
        let result = reconcile(
            &catalog,
            &proposal(vec![line(1, 2, "Espresso", "2.50")], "5.0101", 2),
        );
        assert!(matches!(result, Err(ReconcileError::TotalMismatch { .. })));
    }

    #[test]
    fn test_rejects_unknown_item() {
        let err = reconcile(
            &Catalog::builtin(),
            &proposal(vec![line(999, 1, "Mystery", "1.00")], "1.00", 1),
        )
        .unwrap_err();

        assert_eq!(
            err,
            ReconcileError::InvalidMenuItem {
                item_id: MenuItemId::new(999)
            }
        );
        assert_eq!(err.code(), "INVALID_MENU_ITEM");
    }

    #[test]
    fn test_unavailable_item_reported_as_invalid_menu_item() {
        let err = reconcile(
            &catalog_with_unavailable_item(),
            &proposal(vec![line(42, 1, "Pumpkin Spice Latte", "5.25")], "5.25", 1),
        )
        .unwrap_err();

        assert_eq!(
            err,
            ReconcileError::InvalidMenuItem {
                item_id: MenuItemId::new(42)
            }
        );
    }

    #[test]
    fn test_empty_order_rejected() {
        let err = reconcile(&Catalog::builtin(), &proposal(vec![], "0", 0)).unwrap_err();
        assert_eq!(err, ReconcileError::EmptyOrder);
        assert_eq!(err.code(), "EMPTY_ORDER");
    }

    #[test]
    fn test_item_count_must_match_exactly() {
        let err = reconcile(
            &Catalog::builtin(),
            &proposal(vec![line(2, 3, "Latte", "3.50")], "10.50", 4),
        )
        .unwrap_err();

        assert_eq!(
            err,
            ReconcileError::ItemCountMismatch {
                claimed: 4,
                trusted: 3
            }
        );
    }

    #[test]
    fn test_fails_fast_on_first_unknown_line() {
        let err = reconcile(
            &Catalog::builtin(),
            &proposal(
                vec![
                    line(1, 1, "Espresso", "2.50"),
                    line(500, 1, "Ghost", "1.00"),
                    line(600, 1, "Phantom", "1.00"),
                ],
                "4.50",
                3,
            ),
        )
        .unwrap_err();

        assert_eq!(
            err,
            ReconcileError::InvalidMenuItem {
                item_id: MenuItemId::new(500)
            }
        );
    }

    #[test]
    fn test_unknown_item_reported_before_total_mismatch() {
        let err = reconcile(
            &Catalog::builtin(),
            &proposal(vec![line(999, 1, "Mystery", "1.00")], "1000.00", 77),
        )
        .unwrap_err();
        assert_eq!(err.code(), "INVALID_MENU_ITEM");
    }

    #[test]
    fn test_trusted_total_is_exact_sum() {
        let catalog = Catalog::builtin();
        let lines: Vec<ProposedOrderLine> = catalog
            .all_available()
            .iter()
            .enumerate()
            .map(|(i, item)| ProposedOrderLine {
                item_id: item.id,
                quantity: Quantity::new(i64::try_from(i % 10 + 1).unwrap()).unwrap(),
                claimed_name: item.name.clone(),
                claimed_price: item.price,
            })
            .collect();

        let expected_total: Decimal = lines
            .iter()
            .map(|l| catalog.get(l.item_id).unwrap().price * Decimal::from(l.quantity.get()))
            .sum();
        let expected_count: i32 = lines.iter().map(|l| i32::from(l.quantity)).sum();

        let order = reconcile(
            &catalog,
            &ProposedOrder {
                lines,
                claimed_total: expected_total,
                claimed_item_count: expected_count,
            },
        )
        .unwrap();

        assert_eq!(order.total_amount, expected_total);
        assert_eq!(order.item_count, expected_count);
        assert_eq!(
            order.items.iter().map(OrderLine::total).sum::<Decimal>(),
            expected_total
        );
    }

    #[test]
    fn test_snapshot_uses_catalog_values_not_claims() {
        // Claimed name and price are wrong but do not affect the money.
        let order = reconcile(
            &Catalog::builtin(),
            &proposal(vec![line(3, 2, "Free Coffee", "0.01")], "6.00", 2),
        )
        .unwrap();

        let snapshot = &order.items[0];
        assert_eq!(snapshot.name, "Cappuccino");
        assert_eq!(snapshot.price, d("3.00"));
        assert_eq!(snapshot.quantity.get(), 2);
    }

    #[test]
    fn test_snapshot_independent_of_correct_claims() {
        let catalog = Catalog::builtin();
        let honest = proposal(vec![line(5, 1, "Americano", "2.75")], "2.75", 1);
        let mut mutated = honest.clone();
        mutated.lines[0].claimed_name = "Something Else".to_owned();
        mutated.lines[0].claimed_price = d("99.99");

        let from_honest = reconcile(&catalog, &honest).unwrap();
        let from_mutated = reconcile(&catalog, &mutated).unwrap();
        assert_eq!(from_honest, from_mutated);
    }

    #[test]
    fn test_repeated_item_lines_accumulate() {
        let order = reconcile(
            &Catalog::builtin(),
            &proposal(
                vec![line(7, 2, "Iced Latte", "3.75"), line(7, 1, "Iced Latte", "3.75")],
                "11.25",
                3,
            ),
        )
        .unwrap();
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.total_amount, d("11.25"));
    }

    #[test]
    fn test_order_line_serializes_numeric_price() {
        let line = OrderLine {
            id: MenuItemId::new(8),
            name: "Iced Mocha".to_owned(),
            price: d("4.25"),
            quantity: Quantity::new(2).unwrap(),
        };
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["price"], 4.25);
        assert_eq!(json["quantity"], 2);

        let back: OrderLine = serde_json::from_value(json).unwrap();
        assert_eq!(back, line);
    }
}
