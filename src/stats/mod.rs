pub mod aggregator;
pub mod derived;
pub mod models;
pub mod repository;

mod errors;

pub use aggregator::aggregate;
pub use derived::{apply_derived, fields, passer_rating, to_fixed, StatCategory};
pub use errors::StatsError;
pub use models::*;
pub use repository::{
    InMemoryStatsRepository, PostgresStatsRepository, StatQuery, StatsRepository, TotalsWindow,
};
