use chrono::Utc;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument, warn};

use super::{
    crossing::crossed,
    ranker::rank,
    reconcile::{career_previous, ensure_single_week_step},
    Achievement, MilestoneError, MilestoneReport, MilestoneStat, Scope, ThresholdTable,
};
use crate::stats::{
    aggregate, apply_derived, fields, Checkpoint, StatCategory, StatQuery, StatRow, StatsError,
    StatsRepository, TotalsWindow,
};

/// Parameters for one milestone-check run.
#[derive(Debug, Clone)]
pub struct MilestoneRequest {
    pub checkpoint: Checkpoint,
    /// Checkpoint of the previous successful run, when known.
    pub last_checked: Option<Checkpoint>,
    /// Last regular-season week of the season before `checkpoint`. Needed to
    /// accept a week-1 run that follows the prior season's final run.
    pub prior_final_week: Option<i32>,
    pub rank: bool,
}

impl MilestoneRequest {
    pub fn new(checkpoint: Checkpoint) -> Self {
        Self {
            checkpoint,
            last_checked: None,
            prior_final_week: None,
            rank: true,
        }
    }

    pub fn after(mut self, last_checked: Checkpoint) -> Self {
        self.last_checked = Some(last_checked);
        self
    }

    pub fn prior_season_ended_at(mut self, week: i32) -> Self {
        self.prior_final_week = Some(week);
        self
    }

    pub fn unranked(mut self) -> Self {
        self.rank = false;
        self
    }
}

/// Per-category lookups built by one batch fetch. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct TotalsSnapshot {
    /// Entities active this season, in store order.
    pub current: Vec<StatRow>,
    pub previous: HashMap<String, StatRow>,
    pub career: HashMap<String, StatRow>,
}

impl TotalsSnapshot {
    fn previous_value(&self, entity_id: &str, field: &str) -> f64 {
        self.previous
            .get(entity_id)
            .map(|row| row.number(field))
            .unwrap_or_default()
    }

    fn career_value(&self, entity_id: &str, field: &str) -> f64 {
        self.career
            .get(entity_id)
            .map(|row| row.number(field))
            .unwrap_or_default()
    }
}

/// Player achievements from one pass, kept apart by scope.
#[derive(Debug, Clone, Default)]
pub struct PlayerAchievements {
    pub season: Vec<Achievement>,
    pub career: Vec<Achievement>,
}

pub struct MilestoneService {
    repository: Arc<dyn StatsRepository>,
    thresholds: Arc<ThresholdTable>,
}

impl MilestoneService {
    pub fn new(repository: Arc<dyn StatsRepository>, thresholds: Arc<ThresholdTable>) -> Self {
        Self {
            repository,
            thresholds,
        }
    }

    /// Runs the season, career and team passes for a checkpoint. Store
    /// failures only remove the affected category's achievements.
    #[instrument(skip(self), fields(checkpoint = %request.checkpoint))]
    pub async fn check_milestones(
        &self,
        request: &MilestoneRequest,
    ) -> Result<MilestoneReport, MilestoneError> {
        let checkpoint = request.checkpoint;
        if checkpoint.week <= 0 {
            return Err(MilestoneError::InvalidCheckpoint(checkpoint));
        }
        if let Some(last_checked) = request.last_checked {
            ensure_single_week_step(last_checked, checkpoint, request.prior_final_week)?;
        }

        let (players, team) = tokio::join!(
            self.player_achievements(checkpoint),
            self.team_achievements(checkpoint)
        );

        let mut achievements = players.season;
        achievements.extend(players.career);
        achievements.extend(team);

        if request.rank {
            rank(&mut achievements);
        }

        info!(
            achievements = achievements.len(),
            ranked = request.rank,
            "Milestone check complete"
        );

        Ok(MilestoneReport {
            checkpoint,
            generated_at: Utc::now(),
            achievements,
        })
    }

    /// Season and career passes over every player category with markers.
    pub async fn player_achievements(&self, checkpoint: Checkpoint) -> PlayerAchievements {
        let categories: Vec<StatCategory> = StatCategory::iter()
            .filter(|category| category.is_player_category())
            .filter(|category| self.thresholds.covers_category(*category))
            .collect();

        let passes = join_all(
            categories
                .iter()
                .map(|category| self.category_achievements(*category, checkpoint)),
        )
        .await;

        let mut combined = PlayerAchievements::default();
        for pass in passes {
            combined.season.extend(pass.season);
            combined.career.extend(pass.career);
        }
        combined
    }

    async fn category_achievements(
        &self,
        category: StatCategory,
        checkpoint: Checkpoint,
    ) -> PlayerAchievements {
        match self.fetch_snapshot(category, checkpoint).await {
            Ok(snapshot) => {
                let found = detect_player_crossings(category, &snapshot, &self.thresholds);
                debug!(
                    %category,
                    active = snapshot.current.len(),
                    season = found.season.len(),
                    career = found.career.len(),
                    "Category processed"
                );
                found
            }
            Err(err) => {
                warn!(?err, %category, "Skipping category after fetch failure");
                PlayerAchievements::default()
            }
        }
    }

    /// Issues the current-season, previous-season and career bulk fetches
    /// concurrently and indexes the results by entity.
    #[instrument(skip(self))]
    pub async fn fetch_snapshot(
        &self,
        category: StatCategory,
        checkpoint: Checkpoint,
    ) -> Result<TotalsSnapshot, StatsError> {
        let current_query = StatQuery::new(category, TotalsWindow::Season(checkpoint));
        let previous_query = StatQuery::new(category, TotalsWindow::Season(checkpoint.previous()));
        let career_query = StatQuery::new(category, TotalsWindow::Career(checkpoint));

        let (current, previous, career) = tokio::try_join!(
            self.repository.fetch_totals(&current_query),
            self.repository.fetch_totals(&previous_query),
            self.repository.fetch_totals(&career_query)
        )?;

        Ok(TotalsSnapshot {
            current: with_derived(category, current),
            previous: index_by_entity(with_derived(category, previous)),
            career: index_by_entity(with_derived(category, career)),
        })
    }

    /// Franchise pass: one bulk fetch of team game rows folded per team, then
    /// one previous-checkpoint fetch per team. A failing team is skipped.
    #[instrument(skip(self))]
    pub async fn team_achievements(&self, checkpoint: Checkpoint) -> Vec<Achievement> {
        let stats = self.thresholds.stats_for(Scope::Team, StatCategory::Team);
        if stats.is_empty() {
            return Vec::new();
        }

        let current_query = StatQuery::new(StatCategory::Team, TotalsWindow::Career(checkpoint));
        let rows = match self.repository.fetch_rows(&current_query).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(?err, "Skipping team milestones after fetch failure");
                return Vec::new();
            }
        };

        let current = aggregate(&rows, &[fields::TEAM], &[], StatCategory::Team);
        let mut achievements = Vec::new();

        for record in current.iter() {
            let team = record.key.as_str();
            let previous_query =
                StatQuery::new(StatCategory::Team, TotalsWindow::Career(checkpoint.previous()))
                    .for_team(team);

            let previous_rows = match self.repository.fetch_rows(&previous_query).await {
                Ok(rows) => rows,
                Err(err) => {
                    warn!(?err, team, "Skipping team after previous-total fetch failure");
                    continue;
                }
            };
            let previous = aggregate(&previous_rows, &[fields::TEAM], &[], StatCategory::Team);

            for stat in &stats {
                let field = stat.field();
                let now = record.number(field);
                let before = previous
                    .get(team)
                    .map(|prior| prior.number(field))
                    .unwrap_or_default();

                for milestone in crossed(now, before, self.thresholds.markers(Scope::Team, *stat)) {
                    achievements.push(Achievement::team(*stat, team, milestone, now));
                }
            }
        }

        debug!(
            teams = current.len(),
            achievements = achievements.len(),
            "Team pass processed"
        );
        achievements
    }
}

/// Per-entity crossing detection over an already-fetched snapshot.
pub fn detect_player_crossings(
    category: StatCategory,
    snapshot: &TotalsSnapshot,
    thresholds: &ThresholdTable,
) -> PlayerAchievements {
    let season_stats = thresholds.stats_for(Scope::Season, category);
    let career_stats = thresholds.stats_for(Scope::Career, category);
    let mut found = PlayerAchievements::default();

    for row in &snapshot.current {
        let entity_id = row.entity_id.as_str();
        let subject = row.text(fields::NAME).unwrap_or(entity_id);
        let team = row.text(fields::TEAM).map(str::to_string);

        for stat in &season_stats {
            let field = stat.field();
            let now = row.number(field);
            let before = snapshot.previous_value(entity_id, field);
            push_crossings(
                &mut found.season,
                Scope::Season,
                *stat,
                subject,
                &team,
                now,
                before,
                thresholds,
            );
        }

        for stat in &career_stats {
            let field = stat.field();
            let career_now = snapshot.career_value(entity_id, field);
            let career_before = career_previous(
                career_now,
                row.number(field),
                snapshot.previous_value(entity_id, field),
            );
            push_crossings(
                &mut found.career,
                Scope::Career,
                *stat,
                subject,
                &team,
                career_now,
                career_before,
                thresholds,
            );
        }
    }

    found
}

#[allow(clippy::too_many_arguments)]
fn push_crossings(
    out: &mut Vec<Achievement>,
    scope: Scope,
    stat: MilestoneStat,
    subject: &str,
    team: &Option<String>,
    now: f64,
    before: f64,
    thresholds: &ThresholdTable,
) {
    for milestone in crossed(now, before, thresholds.markers(scope, stat)) {
        out.push(Achievement::player(
            scope,
            stat,
            subject,
            team.clone(),
            milestone,
            now,
        ));
    }
}

fn with_derived(category: StatCategory, mut rows: Vec<StatRow>) -> Vec<StatRow> {
    for row in &mut rows {
        apply_derived(category, row);
    }
    rows
}

fn index_by_entity(rows: Vec<StatRow>) -> HashMap<String, StatRow> {
    rows.into_iter()
        .map(|row| (row.entity_id.clone(), row))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::fields::*;
    use crate::stats::InMemoryStatsRepository;

    fn rushing(player: &str, season: i32, week: i32, yards: f64) -> StatRow {
        StatRow::new(player, season, week)
            .with(NAME, format!("Player {}", player))
            .with(TEAM, "BUF")
            .with(YARDS, yards)
            .with(ATTEMPTS, 20.0)
            .with(TOUCHDOWNS, 0.0)
    }

    fn team_game(team: &str, season: i32, week: i32, points: f64, win: f64) -> StatRow {
        StatRow::new(format!("{}-{}-{}", team, season, week), season, week)
            .with(TEAM, team)
            .with(TEAM_POINTS, points)
            .with(TEAM_WIN, win)
    }

    fn rushing_markers() -> Arc<ThresholdTable> {
        Arc::new(ThresholdTable::from_entries([
            (Scope::Season, MilestoneStat::RushingYards, vec![100, 250, 500]),
            (Scope::Career, MilestoneStat::RushingYards, vec![1000]),
        ]))
    }

    async fn service_with(
        rows: Vec<(StatCategory, Vec<StatRow>)>,
        thresholds: Arc<ThresholdTable>,
    ) -> MilestoneService {
        let repo = InMemoryStatsRepository::new();
        for (category, rows) in rows {
            repo.record_rows(category, rows).await;
        }
        MilestoneService::new(Arc::new(repo), thresholds)
    }

    #[tokio::test]
    async fn season_crossing_reports_only_reached_markers() {
        let service = service_with(
            vec![(
                StatCategory::Rushing,
                vec![
                    rushing("rb", 2024, 1, 30.0),
                    rushing("rb", 2024, 2, 30.0),
                    rushing("rb", 2024, 3, 30.0),
                    rushing("rb", 2024, 4, 170.0),
                ],
            )],
            rushing_markers(),
        )
        .await;

        let found = service.player_achievements(Checkpoint::new(2024, 4)).await;
        let milestones: Vec<u32> = found.season.iter().map(|a| a.milestone).collect();

        assert_eq!(milestones, vec![100, 250]);
        assert_eq!(found.season[0].subject, "Player rb");
        assert_eq!(found.season[0].current_value, 260.0);
        assert!(found.career.is_empty());
    }

    #[tokio::test]
    async fn career_crossing_uses_week_contribution() {
        let service = service_with(
            vec![(
                StatCategory::Rushing,
                vec![
                    rushing("vet", 2023, 10, 950.0),
                    rushing("vet", 2024, 1, 20.0),
                    rushing("vet", 2024, 2, 40.0),
                ],
            )],
            rushing_markers(),
        )
        .await;

        let week_one = service.player_achievements(Checkpoint::new(2024, 1)).await;
        assert!(week_one.career.is_empty());

        let week_two = service.player_achievements(Checkpoint::new(2024, 2)).await;
        assert_eq!(week_two.career.len(), 1);
        assert_eq!(week_two.career[0].milestone, 1000);
        assert_eq!(week_two.career[0].scope, Scope::Career);
        assert_eq!(week_two.career[0].current_value, 1010.0);
    }

    #[tokio::test]
    async fn rerunning_a_later_week_does_not_refire() {
        let service = service_with(
            vec![(
                StatCategory::Rushing,
                vec![rushing("rb", 2024, 1, 120.0), rushing("rb", 2024, 2, 10.0)],
            )],
            rushing_markers(),
        )
        .await;

        let first = service.player_achievements(Checkpoint::new(2024, 1)).await;
        assert_eq!(first.season.len(), 1);

        let second = service.player_achievements(Checkpoint::new(2024, 2)).await;
        assert!(second.season.is_empty());
    }

    #[tokio::test]
    async fn team_pass_folds_games_per_franchise() {
        let thresholds = Arc::new(ThresholdTable::from_entries([(
            Scope::Team,
            MilestoneStat::TeamWins,
            vec![2, 3],
        )]));
        let service = service_with(
            vec![(
                StatCategory::Team,
                vec![
                    team_game("BUF", 2023, 1, 31.0, 1.0),
                    team_game("MIA", 2023, 1, 10.0, 0.0),
                    team_game("BUF", 2024, 1, 24.0, 1.0),
                    team_game("MIA", 2024, 1, 17.0, 1.0),
                ],
            )],
            thresholds,
        )
        .await;

        let achievements = service.team_achievements(Checkpoint::new(2024, 1)).await;

        assert_eq!(achievements.len(), 1);
        assert_eq!(achievements[0].subject, "BUF");
        assert_eq!(achievements[0].milestone, 2);
        assert_eq!(achievements[0].scope, Scope::Team);
    }

    #[tokio::test]
    async fn rejects_preseason_checkpoint() {
        let service = service_with(vec![], rushing_markers()).await;
        let result = service
            .check_milestones(&MilestoneRequest::new(Checkpoint::new(2024, 0)))
            .await;
        assert!(matches!(result, Err(MilestoneError::InvalidCheckpoint(_))));
    }

    #[test]
    fn missing_lookups_count_as_zero() {
        let snapshot = TotalsSnapshot {
            current: vec![rushing("new", 2024, 1, 120.0)],
            previous: HashMap::new(),
            career: HashMap::new(),
        };

        let found = detect_player_crossings(StatCategory::Rushing, &snapshot, &rushing_markers());

        assert_eq!(found.season.len(), 1);
        assert!(found.career.is_empty());
    }
}
