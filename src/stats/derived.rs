use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, IntoStaticStr};

use super::models::StatRow;

/// Raw and derived field names shared by the aggregator, the store and the
/// milestone table.
pub mod fields {
    pub const NAME: &str = "name";
    pub const TEAM: &str = "team";
    pub const JERSEY: &str = "jersey";

    pub const YARDS: &str = "yards";
    pub const ATTEMPTS: &str = "attempts";
    pub const COMPLETIONS: &str = "completions";
    pub const TOUCHDOWNS: &str = "td";
    pub const INTERCEPTIONS: &str = "int";
    pub const RECEPTIONS: &str = "receptions";
    pub const PUNTS: &str = "punts";
    pub const PUNT_YARDS: &str = "yds";
    pub const XP_MADE: &str = "xpmade";
    pub const RUSH_YARDS: &str = "rushYards";
    pub const REC_YARDS: &str = "recYards";
    pub const TACKLES: &str = "tackles";
    pub const SACKS: &str = "sacks";
    pub const PANCAKES: &str = "pancakes";

    pub const TEAM_POINTS: &str = "points_for";
    pub const TEAM_PASS_YARDS: &str = "pass_yards";
    pub const TEAM_RUSH_YARDS: &str = "rush_yards";
    pub const TEAM_WIN: &str = "win";

    pub const FG_MADE_BUCKETS: [&str; 5] = [
        "fg_made_0_19",
        "fg_made_20_29",
        "fg_made_30_39",
        "fg_made_40_49",
        "fg_made_50",
    ];
    pub const FG_ATT_BUCKETS: [&str; 5] = [
        "fg_att_0_19",
        "fg_att_20_29",
        "fg_att_30_39",
        "fg_att_40_49",
        "fg_att_50",
    ];

    pub const YPC: &str = "ypc";
    pub const YPR: &str = "ypr";
    pub const YPA: &str = "ypa";
    pub const PUNT_AVG: &str = "avg";
    pub const COMPLETION_PCT: &str = "completionpct";
    pub const RATING: &str = "rating";
    pub const POINTS: &str = "points";
    pub const FG_MADE: &str = "fgMade";
    pub const FG_ATT: &str = "fgAtt";
    pub const FG_PCT: &str = "fgPct";
    pub const SCRIMMAGE_YARDS: &str = "scrimmageYards";
}

use fields::*;

/// The kind of stat line being aggregated. The caller always knows this, so
/// derived fields are chosen by category rather than by inspecting row shape.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    IntoStaticStr,
    EnumIter,
)]
pub enum StatCategory {
    Passing,
    Rushing,
    Receiving,
    Scrimmage,
    Defense,
    Kicking,
    Punting,
    Blocking,
    Team,
}

impl StatCategory {
    /// Numeric columns stored for this category. The store sums exactly these.
    pub fn summed_fields(&self) -> &'static [&'static str] {
        match self {
            StatCategory::Passing => &[YARDS, ATTEMPTS, COMPLETIONS, TOUCHDOWNS, INTERCEPTIONS],
            StatCategory::Rushing => &[YARDS, ATTEMPTS, TOUCHDOWNS],
            StatCategory::Receiving => &[YARDS, RECEPTIONS, TOUCHDOWNS],
            StatCategory::Scrimmage => &[RUSH_YARDS, REC_YARDS],
            StatCategory::Defense => &[TACKLES, SACKS, INTERCEPTIONS],
            StatCategory::Kicking => &[
                XP_MADE,
                "fg_made_0_19",
                "fg_made_20_29",
                "fg_made_30_39",
                "fg_made_40_49",
                "fg_made_50",
                "fg_att_0_19",
                "fg_att_20_29",
                "fg_att_30_39",
                "fg_att_40_49",
                "fg_att_50",
            ],
            StatCategory::Punting => &[PUNTS, PUNT_YARDS],
            StatCategory::Blocking => &[PANCAKES, SACKS],
            StatCategory::Team => &[TEAM_POINTS, TEAM_PASS_YARDS, TEAM_RUSH_YARDS, TEAM_WIN],
        }
    }

    /// Backing table in the relational store.
    pub fn table_name(&self) -> &'static str {
        match self {
            StatCategory::Passing => "passing_stats",
            StatCategory::Rushing => "rushing_stats",
            StatCategory::Receiving => "receiving_stats",
            StatCategory::Scrimmage => "scrimmage_stats",
            StatCategory::Defense => "defense_stats",
            StatCategory::Kicking => "kicking_stats",
            StatCategory::Punting => "punting_stats",
            StatCategory::Blocking => "blocking_stats",
            StatCategory::Team => "team_game_stats",
        }
    }

    /// Whether rows of this category describe players (as opposed to teams).
    pub fn is_player_category(&self) -> bool {
        !matches!(self, StatCategory::Team)
    }
}

/// Extra digits inspected when deciding whether a value sits exactly on a
/// rounding tie. Far below the spacing of any f64 near a tie.
const TIE_DIGITS: usize = 30;

/// Fixed-precision text rendering of the exact binary value. Exact ties round
/// away from zero.
pub fn to_fixed(value: f64, places: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let expanded = format!("{:.*}", places + TIE_DIGITS, value);
    let tail = &expanded[expanded.len() - TIE_DIGITS..];
    let exact_tie = tail.starts_with('5') && tail[1..].bytes().all(|digit| digit == b'0');

    if exact_tie {
        let half_step = 0.5 * 10f64.powi(-(places as i32));
        format!("{:.*}", places, value + half_step.copysign(value))
    } else {
        format!("{:.*}", places, value)
    }
}

/// Passer rating on the 0..=158.33 scale. Zero attempts rate 0.
pub fn passer_rating(
    completions: f64,
    attempts: f64,
    yards: f64,
    touchdowns: f64,
    interceptions: f64,
) -> f64 {
    if attempts <= 0.0 {
        return 0.0;
    }
    let clamp = |value: f64| value.clamp(0.0, 2.375);
    let a = clamp((completions / attempts - 0.3) * 5.0);
    let b = clamp((yards / attempts - 3.0) * 0.25);
    let c = clamp((touchdowns / attempts) * 20.0);
    let d = clamp(2.375 - (interceptions / attempts) * 25.0);
    (a + b + c + d) / 6.0 * 100.0
}

/// Attaches the derived fields for `category` to an already-summed row.
/// Ratios whose denominator is zero are left untouched.
pub fn apply_derived(category: StatCategory, row: &mut StatRow) {
    match category {
        StatCategory::Rushing => {
            let attempts = row.number(ATTEMPTS);
            if attempts > 0.0 {
                row.set(YPC, to_fixed(row.number(YARDS) / attempts, 2));
            }
            row.set(POINTS, row.number(TOUCHDOWNS) * 6.0);
        }
        StatCategory::Receiving => {
            let receptions = row.number(RECEPTIONS);
            if receptions > 0.0 {
                row.set(YPR, to_fixed(row.number(YARDS) / receptions, 2));
            }
            row.set(POINTS, row.number(TOUCHDOWNS) * 6.0);
        }
        StatCategory::Punting => {
            let punts = row.number(PUNTS);
            if punts > 0.0 {
                row.set(PUNT_AVG, to_fixed(row.number(PUNT_YARDS) / punts, 2));
            }
        }
        StatCategory::Passing => {
            let attempts = row.number(ATTEMPTS);
            if attempts > 0.0 {
                row.set(YPA, to_fixed(row.number(YARDS) / attempts, 2));
                // Raw ratio; downstream renders it as-is.
                row.set(COMPLETION_PCT, to_fixed(row.number(COMPLETIONS) / attempts, 2));
                row.set(POINTS, row.number(TOUCHDOWNS) * 6.0);
            }
            let rating = passer_rating(
                row.number(COMPLETIONS),
                attempts,
                row.number(YARDS),
                row.number(TOUCHDOWNS),
                row.number(INTERCEPTIONS),
            );
            row.set(RATING, to_fixed(rating, 2));
        }
        StatCategory::Kicking => {
            let made: f64 = FG_MADE_BUCKETS.iter().map(|name| row.number(name)).sum();
            let attempted: f64 = FG_ATT_BUCKETS.iter().map(|name| row.number(name)).sum();
            let pct = if attempted > 0.0 { made / attempted } else { 0.0 };
            row.set(FG_MADE, made);
            row.set(FG_ATT, attempted);
            row.set(FG_PCT, to_fixed(pct, 3));
            row.set(POINTS, row.number(XP_MADE) + made * 3.0);
        }
        StatCategory::Scrimmage => {
            row.set(SCRIMMAGE_YARDS, row.number(RUSH_YARDS) + row.number(REC_YARDS));
        }
        StatCategory::Defense | StatCategory::Blocking | StatCategory::Team => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn row() -> StatRow {
        StatRow::new("p1", 2024, 1)
    }

    #[rstest]
    #[case(5.0, 2, "5.00")]
    #[case(2.0 / 3.0, 2, "0.67")]
    #[case(0.125, 2, "0.13")]
    #[case(-0.125, 2, "-0.13")]
    #[case(3.0 / 40.0, 2, "0.07")]
    #[case(7.0 / 40.0, 2, "0.17")]
    #[case(43.0 / 40.0, 2, "1.07")]
    #[case(2.5, 0, "3")]
    #[case(0.8, 3, "0.800")]
    #[case(158.333_333, 2, "158.33")]
    fn formats_fixed_precision(#[case] value: f64, #[case] places: usize, #[case] expected: &str) {
        assert_eq!(to_fixed(value, places), expected);
    }

    #[test]
    fn rushing_derives_ypc_and_points() {
        let mut rushing = row()
            .with(YARDS, 150.0)
            .with(ATTEMPTS, 30.0)
            .with(TOUCHDOWNS, 3.0);
        apply_derived(StatCategory::Rushing, &mut rushing);
        assert_eq!(rushing.text(YPC), Some("5.00"));
        assert_eq!(rushing.number(POINTS), 18.0);
    }

    #[test]
    fn rushing_skips_ypc_without_attempts() {
        let mut rushing = row().with(YARDS, 0.0).with(ATTEMPTS, 0.0);
        apply_derived(StatCategory::Rushing, &mut rushing);
        assert!(rushing.get(YPC).is_none());
        assert_eq!(rushing.number(YPC), 0.0);
    }

    #[test]
    fn receiving_derives_ypr() {
        let mut receiving = row()
            .with(YARDS, 95.0)
            .with(RECEPTIONS, 7.0)
            .with(TOUCHDOWNS, 1.0);
        apply_derived(StatCategory::Receiving, &mut receiving);
        assert_eq!(receiving.text(YPR), Some("13.57"));
        assert_eq!(receiving.number(POINTS), 6.0);
    }

    #[test]
    fn punting_average_needs_punts() {
        let mut punting = row().with(PUNTS, 4.0).with(PUNT_YARDS, 183.0);
        apply_derived(StatCategory::Punting, &mut punting);
        assert_eq!(punting.text(PUNT_AVG), Some("45.75"));

        let mut idle = row().with(PUNTS, 0.0).with(PUNT_YARDS, 0.0);
        apply_derived(StatCategory::Punting, &mut idle);
        assert!(idle.get(PUNT_AVG).is_none());
    }

    #[test]
    fn completion_pct_is_a_raw_ratio() {
        let mut passing = row().with(COMPLETIONS, 20.0).with(ATTEMPTS, 30.0);
        apply_derived(StatCategory::Passing, &mut passing);
        assert_eq!(passing.text(COMPLETION_PCT), Some("0.67"));
    }

    #[test]
    fn perfect_passer_rating_is_capped() {
        let mut passing = row()
            .with(COMPLETIONS, 30.0)
            .with(ATTEMPTS, 30.0)
            .with(YARDS, 500.0)
            .with(TOUCHDOWNS, 5.0)
            .with(INTERCEPTIONS, 0.0);
        apply_derived(StatCategory::Passing, &mut passing);

        let rating: f64 = passing.text(RATING).unwrap().parse().unwrap();
        assert!(rating > 100.0);
        assert!(rating <= 158.34);
        assert_eq!(passing.text(RATING), Some("158.33"));
        assert_eq!(passing.text(YPA), Some("16.67"));
        assert_eq!(passing.number(POINTS), 30.0);
    }

    #[test]
    fn zero_attempts_rate_zero() {
        let mut passing = row().with(ATTEMPTS, 0.0);
        apply_derived(StatCategory::Passing, &mut passing);
        assert_eq!(passing.text(RATING), Some("0.00"));
        assert!(passing.get(YPA).is_none());
        assert!(passing.get(COMPLETION_PCT).is_none());
    }

    #[test]
    fn terrible_passing_floors_at_zero() {
        let rating = passer_rating(0.0, 10.0, 0.0, 0.0, 5.0);
        assert_eq!(rating, 0.0);
    }

    #[test]
    fn kicking_sums_buckets() {
        let mut kicking = row()
            .with(XP_MADE, 3.0)
            .with("fg_made_20_29", 2.0)
            .with("fg_made_50", 1.0)
            .with("fg_att_20_29", 2.0)
            .with("fg_att_40_49", 1.0)
            .with("fg_att_50", 1.0);
        apply_derived(StatCategory::Kicking, &mut kicking);
        assert_eq!(kicking.number(FG_MADE), 3.0);
        assert_eq!(kicking.number(FG_ATT), 4.0);
        assert_eq!(kicking.text(FG_PCT), Some("0.750"));
        assert_eq!(kicking.number(POINTS), 12.0);
    }

    #[test]
    fn kicking_without_attempts_has_zero_pct() {
        let mut kicking = row().with(XP_MADE, 2.0);
        apply_derived(StatCategory::Kicking, &mut kicking);
        assert_eq!(kicking.text(FG_PCT), Some("0.000"));
        assert_eq!(kicking.number(POINTS), 2.0);
    }

    #[test]
    fn scrimmage_uses_explicit_fields_only() {
        let mut scrimmage = row().with(YARDS, 999.0).with(RUSH_YARDS, 80.0);
        apply_derived(StatCategory::Scrimmage, &mut scrimmage);
        assert_eq!(scrimmage.number(SCRIMMAGE_YARDS), 80.0);
    }
}
