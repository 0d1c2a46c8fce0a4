use std::collections::HashMap;

use gridstats::stats::fields;
use gridstats::{InMemoryStatsRepository, StatCategory, StatRow};

// ============================================================================
// Row Builders
// ============================================================================

/// Fluent constructor for a single game line.
pub struct RowBuilder {
    row: StatRow,
}

impl RowBuilder {
    pub fn player(id: &str, name: &str, team: &str) -> Self {
        Self {
            row: StatRow::new(id, 0, 0)
                .with(fields::NAME, name)
                .with(fields::TEAM, team),
        }
    }

    pub fn team(team: &str) -> Self {
        Self {
            row: StatRow::new(team, 0, 0).with(fields::TEAM, team),
        }
    }

    pub fn at(mut self, season: i32, week: i32) -> Self {
        self.row.season = season;
        self.row.week = week;
        self
    }

    pub fn stat(mut self, field: &str, value: f64) -> Self {
        self.row.set(field, value);
        self
    }

    pub fn build(self) -> StatRow {
        self.row
    }
}

// ============================================================================
// League Builder
// ============================================================================

/// Collects rows per category and seeds an in-memory store with them.
#[derive(Default)]
pub struct LeagueBuilder {
    rows: HashMap<StatCategory, Vec<StatRow>>,
}

impl LeagueBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rushing(mut self, id: &str, name: &str, season: i32, week: i32, yards: f64) -> Self {
        let row = RowBuilder::player(id, name, "BUF")
            .at(season, week)
            .stat(fields::YARDS, yards)
            .stat(fields::ATTEMPTS, 18.0)
            .stat(fields::TOUCHDOWNS, 1.0)
            .build();
        self.rows.entry(StatCategory::Rushing).or_default().push(row);
        self
    }

    pub fn passing(mut self, id: &str, name: &str, season: i32, week: i32, yards: f64) -> Self {
        let row = RowBuilder::player(id, name, "KC")
            .at(season, week)
            .stat(fields::YARDS, yards)
            .stat(fields::ATTEMPTS, 35.0)
            .stat(fields::COMPLETIONS, 24.0)
            .stat(fields::TOUCHDOWNS, 2.0)
            .stat(fields::INTERCEPTIONS, 1.0)
            .build();
        self.rows.entry(StatCategory::Passing).or_default().push(row);
        self
    }

    pub fn tackles(mut self, id: &str, name: &str, season: i32, week: i32, tackles: f64) -> Self {
        let row = RowBuilder::player(id, name, "SF")
            .at(season, week)
            .stat(fields::TACKLES, tackles)
            .build();
        self.rows.entry(StatCategory::Defense).or_default().push(row);
        self
    }

    pub fn team_game(mut self, team: &str, season: i32, week: i32, points: f64, won: bool) -> Self {
        let row = RowBuilder::team(team)
            .at(season, week)
            .stat(fields::TEAM_POINTS, points)
            .stat(fields::TEAM_WIN, if won { 1.0 } else { 0.0 })
            .build();
        self.rows.entry(StatCategory::Team).or_default().push(row);
        self
    }

    pub fn build(self) -> InMemoryStatsRepository {
        InMemoryStatsRepository::with_rows(self.rows)
    }
}
