// ABOUTME: Sync module - one fetch, agree, filter, train cycle.
// ABOUTME: Defines the record source and trainer seams around the driver.

mod driver;
mod source;
mod trainer;

pub use driver::*;
pub use source::*;
pub use trainer::*;
