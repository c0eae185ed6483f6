//! Price state module
//!
//! Per-market YES/NO price snapshots merged from independent ticks

mod cache;
mod snapshot;

pub use cache::PriceCache;
pub use snapshot::{PriceSnapshot, PriceUpdate};
