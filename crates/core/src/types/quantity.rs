//! Per-line order quantity.

use serde::{Deserialize, Serialize};

/// Error returned when a quantity is outside `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("quantity must be between {min} and {max} (got {got})", min = Quantity::MIN, max = Quantity::MAX)]
pub struct QuantityError {
    /// The rejected value.
    pub got: i64,
}

/// Number of units of one menu item on an order line, always in `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Quantity(u8);

impl Quantity {
    /// Smallest quantity a line may carry.
    pub const MIN: u8 = 1;
    /// Largest quantity a line may carry.
    pub const MAX: u8 = 10;
    /// A single unit.
    pub const ONE: Self = Self(1);

    /// Create a quantity, rejecting values outside `1..=10`.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError` if `value` is out of range.
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(QuantityError { got: value })
    }

    /// The quantity as a small integer.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// One more unit, saturating at [`Quantity::MAX`].
    #[must_use]
    pub const fn saturating_inc(self) -> Self {
        if self.0 >= Self::MAX {
            self
        } else {
            Self(self.0 + 1)
        }
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u8 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl From<Quantity> for i32 {
    fn from(quantity: Quantity) -> Self {
        Self::from(quantity.0)
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
