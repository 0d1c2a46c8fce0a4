use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::aggregator::aggregate;
use super::derived::{fields, StatCategory};
use super::models::{Checkpoint, StatRow, ENTITY_ID};
use super::StatsError;

/// Accumulation window for a query, ending at an inclusive checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalsWindow {
    /// Weeks 1..=through.week of through.season.
    Season(Checkpoint),
    /// Every completed week up to and including the checkpoint.
    Career(Checkpoint),
}

impl TotalsWindow {
    pub fn checkpoint(&self) -> Checkpoint {
        match self {
            TotalsWindow::Season(checkpoint) | TotalsWindow::Career(checkpoint) => *checkpoint,
        }
    }

    pub fn covers(&self, row: &StatRow) -> bool {
        match self {
            TotalsWindow::Season(through) => through.covers_in_season(row.season, row.week),
            TotalsWindow::Career(through) => through.covers_all_time(row.season, row.week),
        }
    }
}

/// Filter shared by raw-row and bulk-total fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatQuery {
    pub category: StatCategory,
    pub window: TotalsWindow,
    pub team: Option<String>,
}

impl StatQuery {
    pub fn new(category: StatCategory, window: TotalsWindow) -> Self {
        Self {
            category,
            window,
            team: None,
        }
    }

    pub fn for_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    fn matches(&self, row: &StatRow) -> bool {
        if !self.window.covers(row) {
            return false;
        }
        match &self.team {
            Some(team) => row.text(fields::TEAM) == Some(team.as_str()),
            None => true,
        }
    }
}

/// Read-only access to the per-game stat store.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// One summed row per entity for the query's window, in a single round trip.
    async fn fetch_totals(&self, query: &StatQuery) -> Result<Vec<StatRow>, StatsError>;

    /// Raw per-game rows matching the query.
    async fn fetch_rows(&self, query: &StatQuery) -> Result<Vec<StatRow>, StatsError>;
}

/// In-memory store used in tests and when running against a JSON fixture.
#[derive(Debug, Default)]
pub struct InMemoryStatsRepository {
    rows: Arc<RwLock<HashMap<StatCategory, Vec<StatRow>>>>,
}

impl InMemoryStatsRepository {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn with_rows(rows: HashMap<StatCategory, Vec<StatRow>>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(rows)),
        }
    }

    /// Loads a JSON object keyed by category name, each holding an array of rows.
    pub fn from_fixture(path: &Path) -> Result<Self, StatsError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StatsError::Fixture(format!("{}: {}", path.display(), e)))?;
        let rows: HashMap<StatCategory, Vec<StatRow>> = serde_json::from_str(&raw)
            .map_err(|e| StatsError::Fixture(format!("{}: {}", path.display(), e)))?;
        debug!(
            path = %path.display(),
            categories = rows.len(),
            "Loaded stat fixture"
        );
        Ok(Self::with_rows(rows))
    }

    /// Appends completed-game rows. Existing rows are never edited.
    pub async fn record_rows(&self, category: StatCategory, rows: Vec<StatRow>) {
        let mut guard = self.rows.write().await;
        guard.entry(category).or_default().extend(rows);
    }

    pub async fn row_count(&self, category: StatCategory) -> usize {
        self.rows
            .read()
            .await
            .get(&category)
            .map(Vec::len)
            .unwrap_or_default()
    }
}

#[async_trait]
impl StatsRepository for InMemoryStatsRepository {
    #[instrument(skip(self))]
    async fn fetch_totals(&self, query: &StatQuery) -> Result<Vec<StatRow>, StatsError> {
        let rows = self.fetch_rows(query).await?;
        let through = query.window.checkpoint();

        // Descriptive fields follow the entity's most recent game.
        let mut latest: HashMap<&str, &StatRow> = HashMap::new();
        for row in &rows {
            let seen = latest.entry(row.entity_id.as_str()).or_insert(row);
            if row.checkpoint() >= seen.checkpoint() {
                *seen = row;
            }
        }

        let totals: Vec<StatRow> = aggregate(&rows, &[ENTITY_ID], &[], query.category)
            .into_rows()
            .into_iter()
            .map(|mut row| {
                if let Some(last) = latest.get(row.entity_id.as_str()) {
                    for descriptive in [fields::NAME, fields::TEAM] {
                        if let Some(value) = last.text(descriptive) {
                            row.set(descriptive, value.to_string());
                        }
                    }
                }
                row.season = through.season;
                row.week = through.week;
                row
            })
            .collect();

        debug!(entities = totals.len(), "Summed totals in memory");
        Ok(totals)
    }

    #[instrument(skip(self))]
    async fn fetch_rows(&self, query: &StatQuery) -> Result<Vec<StatRow>, StatsError> {
        let guard = self.rows.read().await;
        let rows: Vec<StatRow> = guard
            .get(&query.category)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.matches(row))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        debug!(rows = rows.len(), "Fetched rows from memory");
        Ok(rows)
    }
}

/// PostgreSQL store. Each category lives in its own table with
/// `entity_id, name, team, season, week` plus the category's numeric columns.
pub struct PostgresStatsRepository {
    pool: PgPool,
}

impl PostgresStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn window_clause(window: &TotalsWindow) -> &'static str {
    match window {
        TotalsWindow::Season(_) => "week > 0 AND season = $1 AND week <= $2",
        TotalsWindow::Career(_) => "week > 0 AND (season < $1 OR (season = $1 AND week <= $2))",
    }
}

fn totals_sql(query: &StatQuery) -> String {
    let sums: Vec<String> = query
        .category
        .summed_fields()
        .iter()
        .map(|column| format!("SUM(\"{0}\")::DOUBLE PRECISION AS \"{0}\"", column))
        .collect();
    let team_filter = if query.team.is_some() { " AND team = $3" } else { "" };
    let table = query.category.table_name();
    let window = window_clause(&query.window);

    // Name and team come from each entity's latest game in the window.
    format!(
        "SELECT totals.*, latest.name, latest.team \
         FROM (SELECT entity_id, {sums} FROM {table} WHERE {window}{team_filter} \
         GROUP BY entity_id) AS totals \
         JOIN (SELECT DISTINCT ON (entity_id) entity_id, name, team \
         FROM {table} WHERE {window}{team_filter} \
         ORDER BY entity_id, season DESC, week DESC) AS latest USING (entity_id)",
        sums = sums.join(", "),
    )
}

fn rows_sql(query: &StatQuery) -> String {
    let columns: Vec<String> = query
        .category
        .summed_fields()
        .iter()
        .map(|column| format!("\"{0}\"::DOUBLE PRECISION AS \"{0}\"", column))
        .collect();
    let team_filter = if query.team.is_some() { " AND team = $3" } else { "" };

    format!(
        "SELECT entity_id, name, team, season, week, {} FROM {} WHERE {}{} ORDER BY season, week",
        columns.join(", "),
        query.category.table_name(),
        window_clause(&query.window),
        team_filter
    )
}

fn decode_row(
    row: &sqlx::postgres::PgRow,
    category: StatCategory,
    season: i32,
    week: i32,
) -> Result<StatRow, sqlx::Error> {
    let mut stat_row = StatRow::new(row.try_get::<String, _>("entity_id")?, season, week);

    for descriptive in [fields::NAME, fields::TEAM] {
        if let Some(value) = row.try_get::<Option<String>, _>(descriptive)? {
            stat_row.set(descriptive, value);
        }
    }
    for column in category.summed_fields() {
        let value: Option<f64> = row.try_get(*column)?;
        stat_row.set(column, value.unwrap_or_default());
    }

    Ok(stat_row)
}

#[async_trait]
impl StatsRepository for PostgresStatsRepository {
    #[instrument(skip(self))]
    async fn fetch_totals(&self, query: &StatQuery) -> Result<Vec<StatRow>, StatsError> {
        let through = query.window.checkpoint();
        let sql = totals_sql(query);

        let mut statement = sqlx::query(&sql).bind(through.season).bind(through.week);
        if let Some(team) = &query.team {
            statement = statement.bind(team.as_str());
        }

        let rows = statement.fetch_all(&self.pool).await.map_err(|e| {
            warn!(error = %e, category = %query.category, "Failed to fetch totals from database");
            StatsError::from(e)
        })?;

        let totals = rows
            .iter()
            .map(|row| decode_row(row, query.category, through.season, through.week))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(entities = totals.len(), "Fetched totals from database");
        Ok(totals)
    }

    #[instrument(skip(self))]
    async fn fetch_rows(&self, query: &StatQuery) -> Result<Vec<StatRow>, StatsError> {
        let through = query.window.checkpoint();
        let sql = rows_sql(query);

        let mut statement = sqlx::query(&sql).bind(through.season).bind(through.week);
        if let Some(team) = &query.team {
            statement = statement.bind(team.as_str());
        }

        let rows = statement.fetch_all(&self.pool).await.map_err(|e| {
            warn!(error = %e, category = %query.category, "Failed to fetch rows from database");
            StatsError::from(e)
        })?;

        let stat_rows = rows
            .iter()
            .map(|row| {
                let season: i32 = row.try_get("season")?;
                let week: i32 = row.try_get("week")?;
                decode_row(row, query.category, season, week)
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        debug!(rows = stat_rows.len(), "Fetched rows from database");
        Ok(stat_rows)
    }
}
