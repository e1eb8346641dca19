//! Client-side cart model.
//!
//! A cart is what the point-of-sale screen builds up before checkout. It
//! carries its own totals so the UI can display them, and converts into a
//! [`ProposedOrder`] whose claims the server then re-checks.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::menu::MenuItem;
use crate::order::{ProposedOrder, ProposedOrderLine};
use crate::types::{MenuItemId, Quantity, QuantityError, line_total};

/// One line in the cart: a copy of the menu item as displayed, plus quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub item: MenuItem,
    pub quantity: Quantity,
}

impl CartLine {
    /// `price × quantity` using the displayed price.
    #[must_use]
    pub fn total(&self) -> Decimal {
        line_total(self.item.price, self.quantity.get())
    }
}

/// Ordered collection of cart lines, at most one per menu item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `item`.
    ///
    /// A new item is appended with quantity 1; an item already in the cart is
    /// bumped by one, capped at [`Quantity::MAX`].
    pub fn add(&mut self, item: &MenuItem) {
        if let Some(line) = self.line_mut(item.id) {
            line.quantity = line.quantity.saturating_inc();
        } else {
            self.lines.push(CartLine {
                item: item.clone(),
                quantity: Quantity::ONE,
            });
        }
    }

    /// Remove the line for `id`, if present.
    pub fn remove(&mut self, id: MenuItemId) {
        self.lines.retain(|line| line.item.id != id);
    }

    /// Set the quantity of an existing line.
    ///
    /// Zero removes the line. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError` if `quantity` exceeds [`Quantity::MAX`].
    pub fn update_quantity(&mut self, id: MenuItemId, quantity: u8) -> Result<(), QuantityError> {
        if quantity == 0 {
            self.remove(id);
            return Ok(());
        }
        let quantity = Quantity::new(i64::from(quantity))?;
        if let Some(line) = self.line_mut(id) {
            line.quantity = quantity;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of line totals at displayed prices.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::total).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> i32 {
        self.lines.iter().map(|line| i32::from(line.quantity)).sum()
    }

    /// Quantity of `id` in the cart, or 0 if absent.
    #[must_use]
    pub fn quantity_of(&self, id: MenuItemId) -> u8 {
        self.lines
            .iter()
            .find(|line| line.item.id == id)
            .map_or(0, |line| line.quantity.get())
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Build the proposal submitted at checkout, claiming this cart's totals.
    #[must_use]
    pub fn to_proposed_order(&self) -> ProposedOrder {
        ProposedOrder {
            lines: self
                .lines
                .iter()
                .map(|line| ProposedOrderLine {
                    item_id: line.item.id,
                    quantity: line.quantity,
                    claimed_name: line.item.name.clone(),
                    claimed_price: line.item.price,
                })
                .collect(),
            claimed_total: self.total(),
            claimed_item_count: self.item_count(),
        }
    }

    fn line_mut(&mut self, id: MenuItemId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.item.id == id)
    }
}
