//! Executed-plan output handed to the response formatter.
//!
//! The envelope ([`ResultRecord`]) is the same for every query type; only the
//! [`Payload`] variant differs, and each query type always produces the same
//! variant.

use crate::plan::{AggregationType, Comparator, QueryType, ResponseFormat, SortOrder};
use crate::ranking::{ComparisonResult, OverallRow};
use crate::source::{GameOutcome, GameRecord, StatLine};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    pub query_type: QueryType,
    pub response_format: ResponseFormat,
    /// Entities (players, teams) the result is about, in plan order.
    pub subjects: Vec<String>,
    pub seasons: Vec<i32>,
    /// Canonical metrics requested by the plan.
    pub metrics: Vec<String>,
    pub payload: Payload,
    /// Failure reason keyed by entity, season, metric or game id.
    pub errors: BTreeMap<String, String>,
}

impl ResultRecord {
    pub fn comparison(&self) -> Option<&ComparisonResult> {
        match &self.payload {
            Payload::Comparison { comparison, .. } => Some(comparison),
            Payload::Seasons(seasons) => seasons.comparison.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    /// SingleEntityStat: one entity's canonical-metric map.
    EntityStats(EntityLine),
    /// Player and team comparisons of any width.
    Comparison { entities: Vec<EntityLine>, comparison: ComparisonResult },
    Seasons(SeasonComparison),
    Leaders(LeaderboardResult),
    Ranking { entity: String, ranks: Vec<PlayerRankResult> },
    Aggregate(AggregateResult),
    Threshold(ThresholdResult),
    Games { entity: String, games: Vec<GameSummary> },
    Contextual(ContextualBreakdown),
    GameRanking(GameRankingResult),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityLine {
    pub entity: String,
    pub stats: StatLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improved,
    Declined,
    Stable,
}

impl TrendDirection {
    pub fn of(change: f64) -> Self {
        if change > 0.0 {
            TrendDirection::Improved
        } else if change < 0.0 {
            TrendDirection::Declined
        } else {
            TrendDirection::Stable
        }
    }
}

/// First-to-last chronological change of one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricTrend {
    pub from_season: i32,
    pub to_season: i32,
    pub change: f64,
    /// `None` when the first season's value is zero.
    pub percentage_change: Option<f64>,
    pub direction: TrendDirection,
}

/// Change between two consecutive seasons.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressionStep {
    pub from_season: i32,
    pub to_season: i32,
    pub change: f64,
    pub trend: TrendDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonMetricSummary {
    pub metric: String,
    pub best_season: i32,
    pub best_value: f64,
    pub worst_season: i32,
    pub worst_value: f64,
    /// `best_value - worst_value`.
    pub improvement: f64,
    pub all_values: BTreeMap<i32, f64>,
    pub trend: Option<MetricTrend>,
    /// Consecutive-season steps; only filled for three or more seasons.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub progression: Vec<ProgressionStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonComparison {
    pub entity: String,
    /// Seasons with data, chronological.
    pub seasons: Vec<i32>,
    pub stats: BTreeMap<i32, StatLine>,
    pub by_metric: Vec<SeasonMetricSummary>,
    /// Per-metric season rankings plus the overall season ranking; only for
    /// three or more seasons. Entities are season labels.
    pub comparison: Option<ComparisonResult>,
}

impl SeasonComparison {
    pub fn metric(&self, metric: &str) -> Option<&SeasonMetricSummary> {
        self.by_metric.iter().find(|m| m.metric == metric)
    }

    pub fn overall(&self) -> Option<&[OverallRow]> {
        self.comparison.as_ref().and_then(|c| c.overall.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderRow {
    pub rank: usize,
    pub entity: String,
    pub team: Option<String>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardResult {
    pub sport: String,
    pub metric: String,
    pub leaders: Vec<LeaderRow>,
    pub league_average: Option<f64>,
    pub total_entities: usize,
    /// How far the top entry sits above the league average, in percent.
    pub top_above_average_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRankResult {
    pub metric: String,
    pub value: f64,
    /// `None` when the leaderboard is too shallow to place the entity.
    pub rank: Option<usize>,
    pub total_entities: usize,
    pub league_average: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricAggregate {
    pub metric: String,
    /// The figure selected by the aggregation type.
    pub value: f64,
    pub sum: f64,
    pub average: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Entities contributing to the figures.
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub aggregation: AggregationType,
    /// `true` when the figures come from league-wide leaderboards rather than
    /// named entities.
    pub league_wide: bool,
    pub metrics: Vec<MetricAggregate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdResult {
    pub metric: String,
    pub comparator: Comparator,
    pub threshold: f64,
    pub matches: Vec<LeaderRow>,
    /// Whether the scanned leaderboard covered every ranked entity.
    pub complete: bool,
    pub total_entities: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSummary {
    pub game_id: String,
    pub week: Option<u32>,
    pub date: Option<NaiveDate>,
    pub opponent: String,
    pub home: bool,
    pub score: Option<String>,
    pub result: Option<GameOutcome>,
    pub stats: StatLine,
}

impl GameSummary {
    pub(crate) fn from_record(game: &GameRecord, stats: StatLine) -> Self {
        Self {
            game_id: game.game_id.clone(),
            week: game.week,
            date: game.date,
            opponent: game.opponent.clone(),
            home: game.home,
            score: game.score.clone(),
            result: game.result,
            stats,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContextBucket {
    pub context: String,
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    pub ties: usize,
    pub totals: StatLine,
    pub averages: StatLine,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextualBreakdown {
    pub entity: String,
    /// `all_games` first, then `home`/`away`, then `division`/`conference`.
    pub buckets: Vec<ContextBucket>,
}

impl ContextualBreakdown {
    pub fn bucket(&self, context: &str) -> Option<&ContextBucket> {
        self.buckets.iter().find(|b| b.context == context)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRank {
    /// Dense rank.
    pub rank: usize,
    pub game_id: String,
    pub week: Option<u32>,
    pub date: Option<NaiveDate>,
    pub opponent: String,
    pub result: Option<GameOutcome>,
    pub score: Option<String>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRankingResult {
    pub entity: String,
    pub metric: String,
    pub sort_order: SortOrder,
    pub games: Vec<GameRank>,
    pub average: f64,
    /// Highest-value game regardless of sort order.
    pub best: GameRank,
    /// Lowest-value game regardless of sort order.
    pub worst: GameRank,
}
