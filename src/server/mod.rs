// ABOUTME: Server module - HTTP endpoints every recommender instance serves.
// ABOUTME: Peers read the cutoff here; operators trigger training here.

mod routes;

pub use routes::*;
