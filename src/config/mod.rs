// ABOUTME: Config module - environment-driven settings for one instance.
// ABOUTME: Includes the operator cutoff pin and peer list.

mod settings;

pub use settings::*;
