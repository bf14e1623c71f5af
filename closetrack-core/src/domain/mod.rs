//! Domain types for closetrack

pub mod market;
pub mod price;
pub mod snapshot;

pub use market::{Market, MarketError};
pub use price::{round_close, PriceEntry};
pub use snapshot::{Snapshot, UPDATED_FORMAT};
