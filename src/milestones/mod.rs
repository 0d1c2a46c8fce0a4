pub mod crossing;
pub mod models;
pub mod ranker;
pub mod reconcile;
pub mod service;
pub mod thresholds;

mod errors;

pub use crossing::crossed;
pub use errors::MilestoneError;
pub use models::*;
pub use ranker::{category_priority, rank};
pub use reconcile::{career_previous, ensure_single_week_step};
pub use service::{
    detect_player_crossings, MilestoneRequest, MilestoneService, PlayerAchievements,
    TotalsSnapshot,
};
pub use thresholds::ThresholdTable;
