use std::collections::HashMap;

use super::models::{MilestoneStat, Scope};
use crate::stats::StatCategory;

/// Ordered milestone markers per (scope, statistic).
#[derive(Debug, Clone, Default)]
pub struct ThresholdTable {
    markers: HashMap<(Scope, MilestoneStat), Vec<u32>>,
}

impl ThresholdTable {
    /// Builds a table from raw entries. Each list is sorted ascending and
    /// deduplicated; empty lists are dropped.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Scope, MilestoneStat, Vec<u32>)>,
    {
        let mut markers: HashMap<(Scope, MilestoneStat), Vec<u32>> = HashMap::new();
        for (scope, stat, values) in entries {
            let list = markers.entry((scope, stat)).or_default();
            list.extend(values);
        }
        for list in markers.values_mut() {
            list.sort_unstable();
            list.dedup();
        }
        markers.retain(|_, list| !list.is_empty());
        Self { markers }
    }

    /// League-standard markers.
    pub fn standard() -> Self {
        use MilestoneStat::*;
        use Scope::*;

        Self::from_entries([
            (Season, PassingYards, vec![1000, 2000, 3000, 4000, 5000]),
            (Season, PassingTouchdowns, vec![10, 20, 30, 40, 50]),
            (Season, RushingYards, vec![500, 1000, 1500, 2000]),
            (Season, RushingTouchdowns, vec![5, 10, 15, 20]),
            (Season, ReceivingYards, vec![500, 1000, 1500]),
            (Season, Receptions, vec![50, 75, 100]),
            (Season, ReceivingTouchdowns, vec![5, 10, 15]),
            (Season, ScrimmageYards, vec![1000, 1500, 2000]),
            (Season, Tackles, vec![50, 100, 150]),
            (Season, Sacks, vec![5, 10, 15, 20]),
            (Season, Interceptions, vec![3, 5, 8, 10]),
            (Season, FieldGoalsMade, vec![10, 20, 30]),
            (Season, KickingPoints, vec![50, 100, 150]),
            (Season, PuntYards, vec![2000, 3000, 4000]),
            (Season, PancakeBlocks, vec![25, 50, 75]),
            (Career, PassingYards, vec![5000, 10000, 20000, 30000, 40000, 50000]),
            (Career, PassingTouchdowns, vec![50, 100, 200, 300, 400]),
            (Career, RushingYards, vec![2500, 5000, 7500, 10000, 12500, 15000]),
            (Career, RushingTouchdowns, vec![25, 50, 75, 100]),
            (Career, ReceivingYards, vec![2500, 5000, 7500, 10000, 12500]),
            (Career, Receptions, vec![250, 500, 750, 1000]),
            (Career, ReceivingTouchdowns, vec![25, 50, 75, 100]),
            (Career, ScrimmageYards, vec![5000, 10000, 15000, 20000]),
            (Career, Tackles, vec![250, 500, 750, 1000]),
            (Career, Sacks, vec![25, 50, 75, 100]),
            (Career, Interceptions, vec![10, 20, 30, 40]),
            (Career, FieldGoalsMade, vec![50, 100, 200, 300]),
            (Career, KickingPoints, vec![250, 500, 1000, 1500]),
            (Career, PuntYards, vec![10000, 20000, 30000, 40000]),
            (Career, PancakeBlocks, vec![100, 200, 300]),
            (Team, TeamPoints, vec![1000, 2500, 5000, 7500, 10000]),
            (Team, TeamPassingYards, vec![10000, 25000, 50000, 75000, 100000]),
            (Team, TeamRushingYards, vec![5000, 10000, 25000, 50000]),
            (Team, TeamWins, vec![10, 25, 50, 75, 100]),
        ])
    }

    /// Markers for a (scope, statistic) pair; empty when unconfigured.
    pub fn markers(&self, scope: Scope, stat: MilestoneStat) -> &[u32] {
        self.markers
            .get(&(scope, stat))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Configured statistics of `category` for `scope`, in declaration order.
    pub fn stats_for(&self, scope: Scope, category: StatCategory) -> Vec<MilestoneStat> {
        use strum::IntoEnumIterator;

        MilestoneStat::iter()
            .filter(|stat| stat.category() == category)
            .filter(|stat| self.markers.contains_key(&(scope, *stat)))
            .collect()
    }

    /// Whether any scope has markers for a statistic of `category`.
    pub fn covers_category(&self, category: StatCategory) -> bool {
        self.markers.keys().any(|(_, stat)| stat.category() == category)
    }
}
