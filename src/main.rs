use gridstats::{
    AppError, Config, InMemoryStatsRepository, MilestoneRequest, MilestoneService,
    PostgresStatsRepository, StatsRepository, StoreSource, ThresholdTable,
};
use sqlx::postgres::PgPoolOptions;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gridstats=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "Milestone check failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;
    info!(checkpoint = %config.checkpoint, "Starting milestone check");

    let repository: Arc<dyn StatsRepository> = match &config.store {
        StoreSource::Fixture { path } => Arc::new(InMemoryStatsRepository::from_fixture(path)?),
        StoreSource::Postgres { database_url } => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;
            Arc::new(PostgresStatsRepository::new(pool))
        }
    };

    let service = MilestoneService::new(repository, Arc::new(ThresholdTable::standard()));

    let mut request = MilestoneRequest::new(config.checkpoint);
    if let Some(last_checked) = config.last_checked {
        request = request.after(last_checked);
    }
    if let Some(week) = config.prior_final_week {
        request = request.prior_season_ended_at(week);
    }
    if !config.rank {
        request = request.unranked();
    }

    // Everything below is read-only, so abandoning it on timeout is safe.
    let report = tokio::time::timeout(config.timeout, service.check_milestones(&request))
        .await
        .map_err(|_| AppError::Timeout(config.timeout.as_secs()))??;

    for achievement in &report.achievements {
        info!(%achievement, "Milestone reached");
    }

    let json =
        serde_json::to_string_pretty(&report).map_err(|e| AppError::Output(e.to_string()))?;
    println!("{}", json);

    Ok(())
}
