// ============================================================================
// cartbadge Library
// ============================================================================

pub mod cart;
pub mod client;
pub mod config;
pub mod core;
pub mod nonce;
pub mod patcher;
pub mod web;

// Re-export main types for convenience
pub use cart::{CartStore, InMemoryCartStore};
pub use config::{AppConfig, ClientConfig};
pub use crate::core::{BadgeError, CartCount, Result};
pub use nonce::Nonce;
pub use patcher::patch;

// Re-export the reconciliation API
pub use client::{HttpCountSource, LoopSettings, LoopStats, MemoryDom, ReconciliationLoop, Timings};
