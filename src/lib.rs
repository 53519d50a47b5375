//! Closed-access KOL mission marketplace service.
//!
//! The `marketplace` module holds the domain core: the follower tier program,
//! the campaign eligibility engine, and the application lifecycle, together
//! with the services and HTTP surface built around them. Storage and
//! notification delivery sit behind traits so the bundled in-memory store can
//! be swapped for a hosted backend.

pub mod config;
pub mod error;
pub mod marketplace;
pub mod telemetry;
