// ABOUTME: Time module - parses domain timestamps into epoch milliseconds.
// ABOUTME: Orders carry ISO local date-times without an offset.

mod codec;

pub use codec::*;
