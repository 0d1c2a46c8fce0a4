use std::cmp::Reverse;

use super::models::Achievement;

/// Presentation buckets, matched in order against the lowercased category label.
const PRIORITY_BUCKETS: &[(&[&str], u8)] = &[
    (&["pass"], 0),
    (&["rush"], 1),
    (&["receiv", "scrimmage"], 2),
    (&["defen", "tackle", "sack", "intercept"], 3),
    (&["kick", "punt", "field goal"], 4),
    (&["block"], 5),
];

const OTHER_PRIORITY: u8 = 6;

pub fn category_priority(category: &str) -> u8 {
    let label = category.to_lowercase();
    PRIORITY_BUCKETS
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| label.contains(needle)))
        .map(|(_, priority)| *priority)
        .unwrap_or(OTHER_PRIORITY)
}

/// Stable sort by category priority, then by milestone descending.
pub fn rank(achievements: &mut [Achievement]) {
    achievements.sort_by_key(|achievement| {
        (
            category_priority(&achievement.category),
            Reverse(achievement.milestone),
        )
    });
}
