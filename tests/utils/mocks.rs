use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use gridstats::stats::{StatQuery, StatsError, StatsRepository};
use gridstats::{StatCategory, StatRow};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Wraps a repository and counts round trips.
#[derive(Clone)]
pub struct CountingRepository {
    inner: Arc<dyn StatsRepository>,
    queries: Arc<RwLock<Vec<StatQuery>>>,
}

impl CountingRepository {
    pub fn new(inner: Arc<dyn StatsRepository>) -> Self {
        Self {
            inner,
            queries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn queries_for(&self, category: StatCategory) -> usize {
        self.queries
            .read()
            .await
            .iter()
            .filter(|query| query.category == category)
            .count()
    }
}

#[async_trait]
impl StatsRepository for CountingRepository {
    async fn fetch_totals(&self, query: &StatQuery) -> Result<Vec<StatRow>, StatsError> {
        self.queries.write().await.push(query.clone());
        self.inner.fetch_totals(query).await
    }

    async fn fetch_rows(&self, query: &StatQuery) -> Result<Vec<StatRow>, StatsError> {
        self.queries.write().await.push(query.clone());
        self.inner.fetch_rows(query).await
    }
}

/// Fails every query for the configured categories or teams.
pub struct FlakyRepository {
    inner: Arc<dyn StatsRepository>,
    failing_categories: HashSet<StatCategory>,
    failing_teams: HashSet<String>,
}

impl FlakyRepository {
    pub fn new(inner: Arc<dyn StatsRepository>) -> Self {
        Self {
            inner,
            failing_categories: HashSet::new(),
            failing_teams: HashSet::new(),
        }
    }

    pub fn failing_category(mut self, category: StatCategory) -> Self {
        self.failing_categories.insert(category);
        self
    }

    pub fn failing_team(mut self, team: &str) -> Self {
        self.failing_teams.insert(team.to_string());
        self
    }

    fn check(&self, query: &StatQuery) -> Result<(), StatsError> {
        if self.failing_categories.contains(&query.category) {
            return Err(StatsError::Repository(format!(
                "{} store unavailable",
                query.category
            )));
        }
        if let Some(team) = &query.team {
            if self.failing_teams.contains(team) {
                return Err(StatsError::Repository(format!("{} lookup failed", team)));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl StatsRepository for FlakyRepository {
    async fn fetch_totals(&self, query: &StatQuery) -> Result<Vec<StatRow>, StatsError> {
        self.check(query)?;
        self.inner.fetch_totals(query).await
    }

    async fn fetch_rows(&self, query: &StatQuery) -> Result<Vec<StatRow>, StatsError> {
        self.check(query)?;
        self.inner.fetch_rows(query).await
    }
}
