use thiserror::Error;

use crate::milestones::MilestoneError;
use crate::stats::StatsError;

/// Errors surfaced by the milestone-check binary.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error(transparent)]
    Stats(#[from] StatsError),

    #[error(transparent)]
    Milestone(#[from] MilestoneError),

    #[error("Milestone check timed out after {0}s")]
    Timeout(u64),

    #[error("Output error: {0}")]
    Output(String),
}
