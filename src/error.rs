use crate::plan::QueryType;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Failure of a single [`StatSource`](crate::StatSource) call.
///
/// These are recorded per entity (or per game, or per leaderboard) and do not
/// abort a query on their own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("no data found for {entity}")]
    NotFound { entity: String },
    #[error("fetch for {entity} timed out after {after_ms}ms")]
    Timeout { entity: String, after_ms: u64 },
    #[error("metric {metric} is not supported by this source")]
    Unsupported { metric: String },
    #[error("backend error: {0}")]
    Backend(String),
}

/// Plan-level failure: the query as a whole produced nothing usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("no data for any entity")]
    NoData,
    #[error("no player or team specified")]
    MissingSubject,
    #[error("comparison needs at least {required} entities, found {found}")]
    InsufficientEntities { required: usize, found: usize },
    #[error("no metric specified for leaderboard (question: {question:?})")]
    NoMetric { question: String },
    #[error("no threshold value found (question: {question:?})")]
    NoThreshold { question: String },
    #[error("no games matched the requested context")]
    NoMatchingGames,
    #[error("leaderboard fetch failed: {0}")]
    Leaderboard(#[source] FetchError),
}

/// The error side of an executed plan.
///
/// Carries the per-entity failure reasons collected before the query gave up,
/// so callers can attribute the failure.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{query_type}: {error}")]
pub struct ErrorRecord {
    pub query_type: QueryType,
    #[serde(serialize_with = "display")]
    pub error: QueryError,
    /// Failure reason keyed by entity, season or game id.
    pub errors: BTreeMap<String, String>,
    /// Entities the executor tried to fetch, in plan order.
    pub attempted: Vec<String>,
}

impl ErrorRecord {
    pub fn new(query_type: QueryType, error: QueryError) -> Self {
        Self { query_type, error, errors: BTreeMap::new(), attempted: Vec::new() }
    }

    pub(crate) fn with_errors(mut self, errors: BTreeMap<String, String>) -> Self {
        self.errors = errors;
        self
    }

    pub(crate) fn with_attempted(mut self, attempted: Vec<String>) -> Self {
        self.attempted = attempted;
        self
    }
}

fn display<T: std::fmt::Display, S: serde::Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_record_serializes_reason_as_text() {
        let mut errors = BTreeMap::new();
        errors.insert("C".to_string(), FetchError::NotFound { entity: "C".into() }.to_string());
        let record = ErrorRecord::new(QueryType::PairComparison, QueryError::NoData)
            .with_errors(errors)
            .with_attempted(vec!["C".into()]);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["query_type"], "pair_comparison");
        assert_eq!(json["error"], "no data for any entity");
        assert_eq!(json["errors"]["C"], "no data found for C");
        assert_eq!(record.to_string(), "pair_comparison: no data for any entity");
    }
}
