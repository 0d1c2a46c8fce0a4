use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::shared::AppError;
use crate::stats::Checkpoint;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where stat rows are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSource {
    Postgres { database_url: String },
    Fixture { path: PathBuf },
}

/// Runtime settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store: StoreSource,
    pub checkpoint: Checkpoint,
    pub last_checked: Option<Checkpoint>,
    pub prior_final_week: Option<i32>,
    pub timeout: Duration,
    pub rank: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. `STATS_FIXTURE` takes precedence
    /// over `DATABASE_URL`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = match (lookup("STATS_FIXTURE"), lookup("DATABASE_URL")) {
            (Some(path), _) => StoreSource::Fixture {
                path: PathBuf::from(path),
            },
            (None, Some(database_url)) => StoreSource::Postgres { database_url },
            (None, None) => {
                return Err(AppError::Config(
                    "either STATS_FIXTURE or DATABASE_URL must be set".to_string(),
                ))
            }
        };

        let season: i32 = required(&lookup, "LEAGUE_SEASON")?;
        let week: i32 = required(&lookup, "LEAGUE_WEEK")?;
        let checkpoint = Checkpoint::new(season, week);

        let last_checked = match optional::<i32, _>(&lookup, "LAST_CHECKED_WEEK")? {
            Some(last_week) => {
                let last_season =
                    optional::<i32, _>(&lookup, "LAST_CHECKED_SEASON")?.unwrap_or(season);
                Some(Checkpoint::new(last_season, last_week))
            }
            None => None,
        };

        let prior_final_week = optional::<i32, _>(&lookup, "PRIOR_SEASON_FINAL_WEEK")?;

        let timeout_secs =
            optional::<u64, _>(&lookup, "MILESTONE_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let rank = optional::<bool, _>(&lookup, "RANK_ACHIEVEMENTS")?.unwrap_or(true);

        Ok(Self {
            store,
            checkpoint,
            last_checked,
            prior_final_week,
            timeout: Duration::from_secs(timeout_secs),
            rank,
        })
    }
}

fn optional<T, F>(lookup: &F, key: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::Config(format!("{} has an invalid value: {}", key, raw))),
        None => Ok(None),
    }
}

fn required<T, F>(lookup: &F, key: &str) -> Result<T, AppError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key)?.ok_or_else(|| AppError::Config(format!("{} must be set", key)))
}
