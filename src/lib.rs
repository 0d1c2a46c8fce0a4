// Library crate for the league milestone engine
// This file exposes the public API for the binary and integration tests

pub mod config;
pub mod milestones;
pub mod shared;
pub mod stats;

// Re-export commonly used types for easier access in tests
pub use config::{Config, StoreSource};
pub use milestones::{
    Achievement, MilestoneError, MilestoneReport, MilestoneRequest, MilestoneService, Scope,
    ThresholdTable,
};
pub use shared::AppError;
pub use stats::{
    aggregate, Checkpoint, InMemoryStatsRepository, PostgresStatsRepository, StatCategory,
    StatRow, StatsError, StatsRepository,
};
