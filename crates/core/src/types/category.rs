//! Menu categories.

use serde::{Deserialize, Serialize};

/// Error returned when a string is not a known [`Category`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid menu category: {0}")]
pub struct CategoryError(pub String);

/// Drink category shown on the menu board.
///
/// Parsing is exact and lowercase (`hot`, `cold`, `espresso`), matching the
/// wire format used by the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Hot,
    Cold,
    Espresso,
}

impl Category {
    /// All categories, in menu-board order.
    pub const ALL: [Self; 3] = [Self::Hot, Self::Cold, Self::Espresso];

    /// Wire name of the category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::Cold => "cold",
            Self::Espresso => "espresso",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hot" => Ok(Self::Hot),
            "cold" => Ok(Self::Cold),
            "espresso" => Ok(Self::Espresso),
            _ => Err(CategoryError(s.to_owned())),
        }
    }
}
