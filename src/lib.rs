//! Rule-based query planning and multi-entity comparison for sports statistics.
//!
//! `boxscore` takes an already-structured [`QueryDescription`] (entity names,
//! seasons, metric names and the raw question text), classifies it into one of
//! the [`QueryType`] shapes, and executes the resulting [`QueryPlan`] against a
//! caller-provided [`StatSource`]:
//!
//! ```text
//! QueryDescription ── classify ──▶ QueryPlan ── execute(source) ──▶ ResultRecord | ErrorRecord
//!                     (classifier.rs)            (executor.rs)
//!                                                   │
//!                                                   ├─ per-entity fetch (concurrent, partial-failure tolerant)
//!                                                   ├─ metric extraction (normalize.rs)
//!                                                   └─ rankings / overall score (ranking.rs)
//! ```
//!
//! Classification is pure and total: every description yields exactly one plan.
//! Execution never fails because a single entity failed; only a query with no
//! usable data at all comes back as an [`ErrorRecord`].

#[macro_use]
mod macros;
mod api;
mod classifier;
mod description;
mod error;
mod executor;
mod normalize;
mod plan;
mod ranking;
mod result;
mod rules;
mod source;

pub use api::{Options, answer, classify, classify_verbose_with, classify_with, execute, execute_with};
pub use classifier::{ClassificationDetails, CueMask};
pub use description::QueryDescription;
pub use error::{ErrorRecord, FetchError, QueryError};
pub use executor::QueryExecutor;
pub use normalize::{canonical_name, canonicalize, is_derived, metric_value};
pub use plan::{
    AggregationType, Comparator, ContextFilters, Filters, OpponentType, QueryPlan, QueryType, ResponseFormat,
    SortOrder, Threshold, Venue,
};
pub use ranking::{ComparisonResult, MetricRanking, OverallRow, RankingRow, compare, dense_ranks, rank_descending};
pub use result::{
    AggregateResult, ContextBucket, ContextualBreakdown, EntityLine, GameRank, GameRankingResult, GameSummary, LeaderRow,
    LeaderboardResult, MetricAggregate, MetricTrend, Payload, PlayerRankResult, ProgressionStep, ResultRecord,
    SeasonComparison, SeasonMetricSummary, ThresholdResult, TrendDirection,
};
pub use source::{GameOutcome, GameRecord, LeaderEntry, LeagueLeaders, MemorySource, StatLine, StatSource};
