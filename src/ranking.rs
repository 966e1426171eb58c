//! Per-metric rankings and the cross-metric overall ranking.
//!
//! Every N-way algorithm (players, teams, seasons) goes through [`compare`].
//!
//! Tie policy: equal values get sequential ranks in encounter order. Encounter
//! order is the order entities were handed in, which for executed plans is
//! plan order (fetches are joined in order, not by completion). The overall
//! ranking breaks equal scores the same way.
//!
//! ```text
//! values      A:10  B:30  C:20
//! sorted      B:30  C:20  A:10
//! rank        1     2     3
//! Borda       N-rank+1 per metric, summed across metrics
//! ```

use crate::normalize::metric_value;
use crate::source::StatLine;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    /// 1-based.
    pub rank: usize,
    pub entity: String,
    pub value: f64,
}

/// One metric's outcome across all entities that have it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRanking {
    pub metric: String,
    pub winner: String,
    pub value: f64,
    pub all_values: BTreeMap<String, f64>,
    pub rankings: Vec<RankingRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallRow {
    pub rank: usize,
    pub entity: String,
    pub score: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparisonResult {
    /// Ranked metrics in request order. Metrics no entity has are absent.
    pub by_metric: Vec<MetricRanking>,
    /// Borda-style ranking; `None` when no metric could be ranked.
    pub overall: Option<Vec<OverallRow>>,
}

impl ComparisonResult {
    pub fn metric(&self, metric: &str) -> Option<&MetricRanking> {
        self.by_metric.iter().find(|m| m.metric == metric)
    }

    pub fn winner(&self, metric: &str) -> Option<&str> {
        self.metric(metric).map(|m| m.winner.as_str())
    }
}

/// Sort `(entity, value)` pairs descending with a stable sort and assign
/// sequential 1-based ranks. NaN values are dropped.
pub fn rank_descending<'a, I>(values: I) -> Vec<RankingRow>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut values: Vec<(&str, f64)> = values.into_iter().filter(|(_, v)| !v.is_nan()).collect();
    values.sort_by(|a, b| b.1.total_cmp(&a.1));
    values
        .into_iter()
        .enumerate()
        .map(|(idx, (entity, value))| RankingRow { rank: idx + 1, entity: entity.to_string(), value })
        .collect()
}

/// Dense ranks for an already sorted slice: equal neighbours share a rank and
/// the next distinct value takes the following integer (`1, 1, 2`).
pub fn dense_ranks(sorted: &[f64]) -> Vec<usize> {
    let mut ranks = Vec::with_capacity(sorted.len());
    let mut rank = 0;
    let mut prev: Option<f64> = None;
    for &value in sorted {
        if prev.is_none_or(|p| p.total_cmp(&value) != Ordering::Equal) {
            rank += 1;
        }
        ranks.push(rank);
        prev = Some(value);
    }
    ranks
}

/// N-way comparison over already fetched stat lines, in encounter order.
///
/// With no requested metrics every metric present in any line is ranked,
/// in name order.
pub fn compare(entities: &[(String, StatLine)], metrics: &[String]) -> ComparisonResult {
    let metrics: Vec<String> = if metrics.is_empty() {
        entities.iter().flat_map(|(_, stats)| stats.keys().cloned()).collect::<BTreeSet<_>>().into_iter().collect()
    } else {
        metrics.to_vec()
    };

    let by_metric: Vec<MetricRanking> = metrics.iter().filter_map(|metric| rank_metric(entities, metric)).collect();
    if by_metric.is_empty() {
        return ComparisonResult { by_metric, overall: None };
    }

    let overall = overall_ranking(entities.iter().map(|(name, _)| name.as_str()), &by_metric);
    ComparisonResult { by_metric, overall: Some(overall) }
}

fn rank_metric(entities: &[(String, StatLine)], metric: &str) -> Option<MetricRanking> {
    let values: Vec<(&str, f64)> =
        entities.iter().filter_map(|(name, stats)| metric_value(stats, metric).map(|v| (name.as_str(), v))).collect();
    let rankings = rank_descending(values.iter().copied());
    let top = rankings.first()?;

    Some(MetricRanking {
        metric: metric.to_string(),
        winner: top.entity.clone(),
        value: top.value,
        all_values: values.iter().map(|(name, v)| (name.to_string(), *v)).collect(),
        rankings,
    })
}

/// `score = Σ (N − rank + 1)` with `N` the number of entities; an entity
/// missing from a metric's ranking scores nothing for it.
fn overall_ranking<'a>(entities: impl Iterator<Item = &'a str>, by_metric: &[MetricRanking]) -> Vec<OverallRow> {
    let entities: Vec<&str> = entities.collect();
    let n = entities.len();

    let mut scores: Vec<(&str, usize)> = entities
        .iter()
        .map(|entity| {
            let score = by_metric
                .iter()
                .filter_map(|m| m.rankings.iter().find(|row| row.entity == *entity))
                .map(|row| (n + 1).saturating_sub(row.rank))
                .sum();
            (*entity, score)
        })
        .collect();
    scores.sort_by(|a, b| b.1.cmp(&a.1));

    scores
        .into_iter()
        .enumerate()
        .map(|(idx, (entity, score))| OverallRow { rank: idx + 1, entity: entity.to_string(), score })
        .collect()
}
