//! ESG lookup store and company cache.
//!
//! Seeded metric tables, simulated provider ratings, and the cache adapter
//! the action handlers query.

pub mod adapter;
pub mod company;
pub mod snapshot;
pub mod tables;

pub use adapter::{CacheOrigin, EsgAdapter, ParityResult};
pub use company::SimulatedRatings;
pub use snapshot::write_snapshot;
pub use tables::{MetricTable, SeedTables};
