use super::errors::MilestoneError;
use crate::stats::Checkpoint;

/// Career total as of the previous checkpoint, rebuilt from this week's
/// season delta. Must be computed per statistic.
///
/// Assumes exactly one week separates the two season snapshots; see
/// [`ensure_single_week_step`]. Never returns a negative value.
pub fn career_previous(career_current: f64, season_current: f64, season_previous: f64) -> f64 {
    let week_contribution = season_current - season_previous;
    (career_current - week_contribution).max(0.0)
}

/// Rejects runs that would skip or repeat weeks. The season-window delta only
/// equals one week's contribution when `last_checked` is the week directly
/// before `requested`. A request that opens a new season is only accepted when
/// `prior_final_week` is known and `last_checked` is that week.
pub fn ensure_single_week_step(
    last_checked: Checkpoint,
    requested: Checkpoint,
    prior_final_week: Option<i32>,
) -> Result<(), MilestoneError> {
    let same_season_step =
        last_checked.season == requested.season && last_checked.week + 1 == requested.week;
    let season_rollover = requested.week == 1
        && last_checked.season + 1 == requested.season
        && prior_final_week == Some(last_checked.week);

    if same_season_step || season_rollover {
        Ok(())
    } else {
        Err(MilestoneError::CheckpointGap {
            last_checked,
            requested,
        })
    }
}
