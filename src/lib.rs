// ABOUTME: Root module for recsync - training-window consensus for recommenders.
// ABOUTME: Re-exports all public types from submodules.

pub mod config;
pub mod cutoff;
pub mod error;
pub mod prelude;
pub mod records;
pub mod server;
pub mod sync;
pub mod time;

pub use error::SyncError;
