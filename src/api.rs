use crate::classifier::{self, ClassificationDetails};
use crate::description::QueryDescription;
use crate::error::ErrorRecord;
use crate::executor::QueryExecutor;
use crate::plan::QueryPlan;
use crate::result::ResultRecord;
use crate::source::StatSource;
use serde::Deserialize;
use std::time::Duration;

/// Options that affect classification and execution.
///
/// Deserializes from JSON with every field optional:
///
/// ```
/// let opts: boxscore::Options = serde_json::from_str(r#"{"fetch_timeout_ms": 250}"#).unwrap();
/// assert_eq!(opts.leaderboard_limit, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Per-fetch deadline. A fetch that misses it counts as that entity's failure.
    ///
    /// Setting it requires executing inside a Tokio runtime with the time
    /// driver enabled. With `None` any executor can drive the query.
    pub fetch_timeout_ms: Option<u64>,
    /// Leaderboard length when the question does not say ("top 5").
    pub leaderboard_limit: usize,
    /// Leaderboard depth scanned for player rankings and threshold queries.
    pub ranking_pool_size: usize,
    /// Per-game metric used when a game-ranking question names none.
    pub default_game_metric: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: None,
            leaderboard_limit: 10,
            ranking_pool_size: 100,
            default_game_metric: "passing_yards".to_string(),
        }
    }
}

impl Options {
    pub(crate) fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }
}

/// Classify `description` with default [`Options`].
///
/// # Example
/// ```
/// use boxscore::{QueryDescription, QueryType, classify};
///
/// let desc = QueryDescription::new("nfl", "Compare Parsons, Watt and Garrett sacks")
///     .with_players(["Micah Parsons", "T.J. Watt", "Myles Garrett"])
///     .with_metrics(["sacks"]);
/// assert_eq!(classify(&desc).query_type, QueryType::MultiEntityComparison);
/// ```
pub fn classify(description: &QueryDescription) -> QueryPlan {
    classify_with(description, &Options::default())
}

pub fn classify_with(description: &QueryDescription, options: &Options) -> QueryPlan {
    classifier::classify(description, options)
}

/// Classify and return the matched rule, cues and timing alongside the plan.
pub fn classify_verbose_with(description: &QueryDescription, options: &Options) -> (QueryPlan, ClassificationDetails) {
    classifier::classify_traced(description, options)
}

/// Execute `plan` against `source` with default [`Options`].
pub async fn execute(plan: &QueryPlan, source: &dyn StatSource) -> Result<ResultRecord, ErrorRecord> {
    execute_with(plan, source, &Options::default()).await
}

pub async fn execute_with(
    plan: &QueryPlan,
    source: &dyn StatSource,
    options: &Options,
) -> Result<ResultRecord, ErrorRecord> {
    QueryExecutor::new(source, options).execute(plan).await
}

/// Classify and execute in one call.
pub async fn answer(
    description: &QueryDescription,
    source: &dyn StatSource,
    options: &Options,
) -> Result<ResultRecord, ErrorRecord> {
    let plan = classify_with(description, options);
    execute_with(&plan, source, options).await
}
