//! Client-side badge reconciliation.
//!
//! The loop listens on four independent channels (named cart events, observed
//! network requests, filtered DOM mutations and direct control interaction),
//! coalesces bursts through one debounce slot, asks the count endpoint for the
//! live count and re-renders the badge in place.

pub mod count;
pub mod debounce;
pub mod dom;
pub mod mutation;
pub mod network;
pub mod reconciler;
pub mod renderer;
pub mod triggers;

pub use count::{CountSource, FetchError, HttpCountSource, interpret_count_response};
pub use debounce::{DebounceState, Debouncer};
pub use dom::{Anchor, Badge, BadgeEvent, Dom, MemoryDom};
pub use mutation::{MutationFilter, MutationKind, MutationRecord, MutationWatch};
pub use network::{ObservedClient, RequestListener};
pub use reconciler::{LoopSettings, LoopStats, ReconciliationLoop};
pub use renderer::{RenderOutcome, render};
pub use triggers::{CartEvent, Control, Interaction, InteractionKind, Timings, Trigger};
