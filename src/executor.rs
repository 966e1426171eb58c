//! Plan execution.
//!
//! The executor turns a [`QueryPlan`] into a [`ResultRecord`] by calling a
//! [`StatSource`] and running the algorithm selected by the plan's
//! [`QueryType`].
//!
//! ```text
//! QueryPlan ── match query_type ──┬─ comparison.rs   single entity, 2..N players/teams
//!                                 ├─ seasons.rs      2..N seasons of one entity, trends
//!                                 ├─ league.rs       leaders, player rank, aggregate, threshold
//!                                 └─ games.rs        game lookup, contextual buckets, game ranking
//!                                          │
//!                 fan-out (this file): one fetch per entity, joined in plan order,
//!                 each optionally under a timeout; failures land in `errors`
//!                                          │
//!                                          v
//!                              ResultRecord | ErrorRecord
//! ```
//!
//! Failure policy: a failed fetch is recorded against its entity and the rest
//! carry on. Only a plan that ends up with no usable data returns an
//! [`ErrorRecord`].

#[path = "executor/comparison.rs"]
mod comparison;
#[path = "executor/games.rs"]
mod games;
#[path = "executor/league.rs"]
mod league;
#[path = "executor/seasons.rs"]
mod seasons;

use crate::api::Options;
use crate::error::{ErrorRecord, FetchError, QueryError};
use crate::normalize;
use crate::plan::{Filters, QueryPlan, QueryType};
use crate::result::{Payload, ResultRecord};
use crate::source::{StatLine, StatSource};
use futures::future::join_all;
use std::collections::BTreeMap;
use std::future::Future;

/// Failure reasons keyed by entity, season, metric or game id.
pub(crate) type ErrorMap = BTreeMap<String, String>;

/// Runs plans against one stat source.
pub struct QueryExecutor<'a> {
    source: &'a dyn StatSource,
    options: &'a Options,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(source: &'a dyn StatSource, options: &'a Options) -> Self {
        Self { source, options }
    }

    pub async fn execute(&self, plan: &QueryPlan) -> Result<ResultRecord, ErrorRecord> {
        tracing::info!(
            query_type = %plan.query_type,
            players = plan.primary_entities.len(),
            teams = plan.secondary_entities.len(),
            seasons = plan.filters.seasons.len(),
            "executing plan"
        );

        match plan.query_type {
            QueryType::SingleEntityStat => self.single_entity(plan).await,
            QueryType::PairComparison
            | QueryType::MultiEntityComparison
            | QueryType::TeamComparison
            | QueryType::MultiTeamComparison => self.entity_comparison(plan).await,
            QueryType::SeasonComparison | QueryType::MultiSeasonComparison => self.season_comparison(plan).await,
            QueryType::LeagueLeaders => self.league_leaders(plan).await,
            QueryType::PlayerRanking => self.player_ranking(plan).await,
            QueryType::AggregateStat => self.aggregate(plan).await,
            QueryType::ThresholdQuery => self.threshold(plan).await,
            QueryType::GameSpecificStat => self.game_specific(plan).await,
            QueryType::ContextualPerformance => self.contextual(plan).await,
            QueryType::GamePerformanceComparison => self.game_ranking(plan).await,
        }
    }

    /// Await `fetch`, bounded by the configured timeout.
    async fn guarded<T, F>(&self, label: &str, fetch: F) -> Result<T, FetchError>
    where
        F: Future<Output = Result<T, FetchError>>,
    {
        let Some(limit) = self.options.fetch_timeout() else {
            return fetch.await;
        };
        match tokio::time::timeout(limit, fetch).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                entity: label.to_string(),
                after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    /// Fetch every entity concurrently. Successes come back in input order.
    async fn fetch_entities(&self, names: &[String], filters: &Filters) -> (Vec<(String, StatLine)>, ErrorMap) {
        let fetches = names.iter().map(|name| async move {
            let result = self.guarded(name, self.source.fetch_entity_stats(name, filters)).await;
            (name, result)
        });
        let (ok, errors) = split_results(join_all(fetches).await);
        (ok.into_iter().map(|(name, stats)| (name.clone(), stats)).collect(), errors)
    }

    /// The plan's single subject, or a plan-level error.
    fn subject<'p>(&self, plan: &'p QueryPlan) -> Result<&'p str, ErrorRecord> {
        plan.subject().ok_or_else(|| ErrorRecord::new(plan.query_type, QueryError::MissingSubject))
    }

    /// The metric a single-metric plan ranks by: the first requested one, else
    /// the first metric named in the question.
    fn single_metric(&self, plan: &QueryPlan) -> Result<String, ErrorRecord> {
        plan.metrics
            .first()
            .cloned()
            .or_else(|| normalize::metric_in_question(&plan.question.to_ascii_lowercase()).map(str::to_string))
            .ok_or_else(|| {
                ErrorRecord::new(plan.query_type, QueryError::NoMetric { question: plan.question.clone() })
            })
    }
}

/// Split joined fetch results into successes (input order) and a failure map,
/// logging each outcome.
fn split_results<K, T>(results: Vec<(K, Result<T, FetchError>)>) -> (Vec<(K, T)>, ErrorMap)
where
    K: std::fmt::Display,
{
    let mut ok = Vec::with_capacity(results.len());
    let mut errors = ErrorMap::new();
    for (key, result) in results {
        match result {
            Ok(value) => {
                tracing::debug!(entity = %key, "fetch succeeded");
                ok.push((key, value));
            }
            Err(err) => {
                tracing::warn!(entity = %key, error = %err, "fetch failed");
                errors.insert(key.to_string(), err.to_string());
            }
        }
    }
    (ok, errors)
}

/// Wrap a payload in the common envelope.
fn record(plan: &QueryPlan, subjects: Vec<String>, payload: Payload, errors: ErrorMap) -> ResultRecord {
    ResultRecord {
        query_type: plan.query_type,
        response_format: plan.response_format,
        subjects,
        seasons: plan.filters.seasons.clone(),
        metrics: plan.metrics.clone(),
        payload,
        errors,
    }
}

/// Total failure: nothing usable came back.
fn no_data(plan: &QueryPlan, errors: ErrorMap, attempted: Vec<String>) -> ErrorRecord {
    ErrorRecord::new(plan.query_type, QueryError::NoData).with_errors(errors).with_attempted(attempted)
}

/// Requested metrics, or every metric present in `lines` when none were requested.
fn metrics_or_all<'l>(plan: &QueryPlan, lines: impl Iterator<Item = &'l StatLine>) -> Vec<String> {
    if !plan.metrics.is_empty() {
        return plan.metrics.clone();
    }
    let mut all: Vec<String> = lines.flat_map(|line| line.keys().cloned()).collect();
    all.sort();
    all.dedup();
    all
}
