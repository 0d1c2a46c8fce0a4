use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{AsRefStr, Display, EnumIter};

use crate::stats::{fields, Checkpoint, StatCategory};

/// Accumulation horizon of a milestone.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Scope {
    Season,
    Career,
    Team,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AchievementKind {
    Player,
    Team,
}

/// A statistic that milestones can be configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum MilestoneStat {
    PassingYards,
    PassingTouchdowns,
    RushingYards,
    RushingTouchdowns,
    ReceivingYards,
    Receptions,
    ReceivingTouchdowns,
    ScrimmageYards,
    Tackles,
    Sacks,
    Interceptions,
    FieldGoalsMade,
    KickingPoints,
    PuntYards,
    PancakeBlocks,
    TeamPoints,
    TeamPassingYards,
    TeamRushingYards,
    TeamWins,
}

impl MilestoneStat {
    pub fn category(&self) -> StatCategory {
        match self {
            MilestoneStat::PassingYards | MilestoneStat::PassingTouchdowns => StatCategory::Passing,
            MilestoneStat::RushingYards | MilestoneStat::RushingTouchdowns => StatCategory::Rushing,
            MilestoneStat::ReceivingYards
            | MilestoneStat::Receptions
            | MilestoneStat::ReceivingTouchdowns => StatCategory::Receiving,
            MilestoneStat::ScrimmageYards => StatCategory::Scrimmage,
            MilestoneStat::Tackles | MilestoneStat::Sacks | MilestoneStat::Interceptions => {
                StatCategory::Defense
            }
            MilestoneStat::FieldGoalsMade | MilestoneStat::KickingPoints => StatCategory::Kicking,
            MilestoneStat::PuntYards => StatCategory::Punting,
            MilestoneStat::PancakeBlocks => StatCategory::Blocking,
            MilestoneStat::TeamPoints
            | MilestoneStat::TeamPassingYards
            | MilestoneStat::TeamRushingYards
            | MilestoneStat::TeamWins => StatCategory::Team,
        }
    }

    /// Field of the aggregated row holding this statistic's cumulative value.
    pub fn field(&self) -> &'static str {
        match self {
            MilestoneStat::PassingYards
            | MilestoneStat::RushingYards
            | MilestoneStat::ReceivingYards => fields::YARDS,
            MilestoneStat::PassingTouchdowns
            | MilestoneStat::RushingTouchdowns
            | MilestoneStat::ReceivingTouchdowns => fields::TOUCHDOWNS,
            MilestoneStat::Receptions => fields::RECEPTIONS,
            MilestoneStat::ScrimmageYards => fields::SCRIMMAGE_YARDS,
            MilestoneStat::Tackles => fields::TACKLES,
            MilestoneStat::Sacks => fields::SACKS,
            MilestoneStat::Interceptions => fields::INTERCEPTIONS,
            MilestoneStat::FieldGoalsMade => fields::FG_MADE,
            MilestoneStat::KickingPoints => fields::POINTS,
            MilestoneStat::PuntYards => fields::PUNT_YARDS,
            MilestoneStat::PancakeBlocks => fields::PANCAKES,
            MilestoneStat::TeamPoints => fields::TEAM_POINTS,
            MilestoneStat::TeamPassingYards => fields::TEAM_PASS_YARDS,
            MilestoneStat::TeamRushingYards => fields::TEAM_RUSH_YARDS,
            MilestoneStat::TeamWins => fields::TEAM_WIN,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MilestoneStat::PassingYards => "Passing Yards",
            MilestoneStat::PassingTouchdowns => "Passing Touchdowns",
            MilestoneStat::RushingYards => "Rushing Yards",
            MilestoneStat::RushingTouchdowns => "Rushing Touchdowns",
            MilestoneStat::ReceivingYards => "Receiving Yards",
            MilestoneStat::Receptions => "Receptions",
            MilestoneStat::ReceivingTouchdowns => "Receiving Touchdowns",
            MilestoneStat::ScrimmageYards => "Scrimmage Yards",
            MilestoneStat::Tackles => "Tackles",
            MilestoneStat::Sacks => "Sacks",
            MilestoneStat::Interceptions => "Interceptions",
            MilestoneStat::FieldGoalsMade => "Field Goals Made",
            MilestoneStat::KickingPoints => "Kicking Points",
            MilestoneStat::PuntYards => "Punt Yards",
            MilestoneStat::PancakeBlocks => "Pancake Blocks",
            MilestoneStat::TeamPoints => "Points Scored",
            MilestoneStat::TeamPassingYards => "Team Passing Yards",
            MilestoneStat::TeamRushingYards => "Team Rushing Yards",
            MilestoneStat::TeamWins => "Wins",
        }
    }

    /// Label used for grouping and presentation ordering.
    pub fn category_label(&self) -> &'static str {
        match self {
            MilestoneStat::TeamPoints => "Team Scoring",
            MilestoneStat::TeamPassingYards => "Team Passing",
            MilestoneStat::TeamRushingYards => "Team Rushing",
            MilestoneStat::TeamWins => "Team Record",
            other => other.category().into(),
        }
    }
}

/// A newly crossed milestone, ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    #[serde(rename = "type")]
    pub kind: AchievementKind,
    pub scope: Scope,
    pub category: String,
    pub subject: String,
    pub team: Option<String>,
    pub milestone: u32,
    pub current_value: f64,
    pub stat_name: String,
}

impl Achievement {
    pub fn player(
        scope: Scope,
        stat: MilestoneStat,
        subject: impl Into<String>,
        team: Option<String>,
        milestone: u32,
        current_value: f64,
    ) -> Self {
        Self {
            kind: AchievementKind::Player,
            scope,
            category: stat.category_label().to_string(),
            subject: subject.into(),
            team,
            milestone,
            current_value,
            stat_name: stat.display_name().to_string(),
        }
    }

    pub fn team(
        stat: MilestoneStat,
        team: impl Into<String>,
        milestone: u32,
        current_value: f64,
    ) -> Self {
        let team = team.into();
        Self {
            kind: AchievementKind::Team,
            scope: Scope::Team,
            category: stat.category_label().to_string(),
            subject: team.clone(),
            team: Some(team),
            milestone,
            current_value,
            stat_name: stat.display_name().to_string(),
        }
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let horizon = match self.scope {
            Scope::Season => "season ",
            Scope::Career => "career ",
            Scope::Team => "franchise ",
        };
        match (&self.kind, &self.team) {
            (AchievementKind::Player, Some(team)) => write!(f, "{} ({})", self.subject, team)?,
            _ => f.write_str(&self.subject)?,
        }
        write!(
            f,
            " reached {} {}{} ({:.0})",
            self.milestone, horizon, self.stat_name, self.current_value
        )
    }
}

/// Outcome of one milestone-check run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneReport {
    pub checkpoint: Checkpoint,
    pub generated_at: DateTime<Utc>,
    pub achievements: Vec<Achievement>,
}
