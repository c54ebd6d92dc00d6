pub mod error;
pub mod types;

pub use error::{BadgeError, Result};
pub use types::{BADGE_CLASS, BADGE_COUNT_ATTR, BADGE_UPDATED_EVENT, CartCount};
