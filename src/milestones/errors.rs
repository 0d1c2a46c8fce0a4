use thiserror::Error;

use crate::stats::Checkpoint;

#[derive(Debug, Error)]
pub enum MilestoneError {
    #[error("Checkpoint gap: last checked {last_checked}, requested {requested}")]
    CheckpointGap {
        last_checked: Checkpoint,
        requested: Checkpoint,
    },

    #[error("Invalid checkpoint: {0} is not a regular-season week")]
    InvalidCheckpoint(Checkpoint),
}
