// ABOUTME: Records module - order entities and training-window filtering.
// ABOUTME: Filtering keeps orders at or before the cutoff and their items.

mod filter;
mod types;

pub use filter::*;
pub use types::*;
