//! Read-only seam onto the platform's cart store.

use crate::core::{CartCount, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// The only question this crate ever asks the cart: how many items are in it.
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn item_count(&self) -> Result<CartCount>;
}

/// Process-local cart store, used by the bundled server and in tests.
///
/// The setter stands in for the platform mutating its own cart.
#[derive(Debug, Default)]
pub struct InMemoryCartStore {
    count: AtomicU64,
}

impl InMemoryCartStore {
    pub fn new(initial: CartCount) -> Self {
        Self {
            count: AtomicU64::new(initial.get()),
        }
    }

    pub fn set(&self, count: CartCount) {
        self.count.store(count.get(), Ordering::SeqCst);
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn item_count(&self) -> Result<CartCount> {
        Ok(CartCount::new(self.count.load(Ordering::SeqCst)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_live_value() {
        let store = InMemoryCartStore::new(CartCount::new(2));
        assert_eq!(store.item_count().await.unwrap(), CartCount::new(2));
        store.set(CartCount::new(5));
        assert_eq!(store.item_count().await.unwrap(), CartCount::new(5));
    }
}
