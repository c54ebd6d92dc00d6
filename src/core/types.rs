use serde::{Deserialize, Serialize};
use std::fmt;

/// Authoritative number of items in the cart.
///
/// Owned by the cart store; everything in this crate only reads it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartCount(u64);

impl CartCount {
    pub const ZERO: CartCount = CartCount(0);

    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// A badge is shown only for a non-empty cart.
    pub const fn is_visible(self) -> bool {
        self.0 > 0
    }
}

impl From<u64> for CartCount {
    fn from(count: u64) -> Self {
        Self(count)
    }
}

impl From<CartCount> for u64 {
    fn from(count: CartCount) -> Self {
        count.0
    }
}

impl fmt::Display for CartCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Class name carried by every rendered badge, server-side and client-side.
pub const BADGE_CLASS: &str = "cart-count-badge";

/// Machine-readable count attribute on the badge element.
pub const BADGE_COUNT_ATTR: &str = "data-cart-count";

/// Name of the notification event emitted after every client render.
pub const BADGE_UPDATED_EVENT: &str = "cart_badge_updated";
