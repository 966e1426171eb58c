//! The stat backend boundary.
//!
//! The executor never knows where numbers come from: databases, caches and
//! remote APIs all sit behind [`StatSource`]. The crate ships one in-memory
//! implementation, [`MemorySource`], for fixtures and tests.

use crate::error::FetchError;
use crate::plan::Filters;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[path = "source/memory.rs"]
mod memory;

pub use memory::MemorySource;

/// Canonical metric → value for one entity in one context.
pub type StatLine = BTreeMap<String, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    Win,
    Loss,
    Tie,
}

/// One game from an entity's game log. Per-game numbers are looked up by
/// canonical metric name in `stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: String,
    #[serde(default)]
    pub season: Option<i32>,
    #[serde(default)]
    pub week: Option<u32>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub opponent: String,
    /// `true` for home games, `false` for road games.
    pub home: bool,
    #[serde(default)]
    pub division_game: bool,
    #[serde(default)]
    pub conference_game: bool,
    #[serde(default)]
    pub score: Option<String>,
    #[serde(default)]
    pub result: Option<GameOutcome>,
    #[serde(default)]
    pub stats: StatLine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderEntry {
    pub entity: String,
    #[serde(default)]
    pub team: Option<String>,
    pub value: f64,
}

/// A league-wide ranked list for one metric, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueLeaders {
    pub metric: String,
    pub leaders: Vec<LeaderEntry>,
    pub league_average: Option<f64>,
    /// Number of entities the source ranked, before `limit` was applied.
    pub total_entities: usize,
}

impl LeagueLeaders {
    /// Whether `leaders` lists every ranked entity.
    pub fn is_complete(&self) -> bool {
        self.leaders.len() >= self.total_entities
    }
}

/// Capability the executor uses to obtain statistics.
///
/// Every call is independent; the executor may issue several concurrently and
/// treats each failure as local to the entity it was made for.
#[async_trait]
pub trait StatSource: Send + Sync {
    /// Aggregated stats for one player or team under `filters` (season list,
    /// positions, context keys).
    async fn fetch_entity_stats(&self, entity: &str, filters: &Filters) -> Result<StatLine, FetchError>;

    /// Game log for one entity, in chronological order.
    async fn fetch_game_log(&self, entity: &str, filters: &Filters) -> Result<Vec<GameRecord>, FetchError>;

    /// Ranked list for `metric`, truncated to `limit` entries.
    async fn fetch_league_leaders(
        &self,
        sport: &str,
        metric: &str,
        filters: &Filters,
        limit: usize,
    ) -> Result<LeagueLeaders, FetchError>;
}
