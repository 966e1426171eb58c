//! Query classification.
//!
//! Classification turns a [`QueryDescription`] into a [`QueryPlan`]. It is a
//! pure, total function: every description produces exactly one plan, and a
//! question no rule recognizes falls through to `SingleEntityStat`.
//!
//! ## How the parts work together
//!
//! ```text
//! QueryDescription ── Signals::new ──────────────────────────────
//!                      - lower-cased question
//!                      - TriggerInfo::scan (trigger.rs): cues, phrases, teams, week
//!                      - deduplicated entities, canonical metrics
//!                               │
//!                               v
//!                     ordered rules (rules.rs), first match wins
//!                       - skip rules whose cues did not fire
//!                       - production may decline (None)
//!                       - context extraction (extract.rs)
//!                               │
//!                               v
//!                     build_plan: entities, filters, step tables
//!                               │
//!                               v
//!                           QueryPlan
//! ```
//!
//! Rule order is load-bearing. A week-numbered "Burrow vs Ravens" must be seen
//! by the game rule before the comparison rule ever looks at "vs", and an
//! explicit leaderboard strategy beats every keyword.
//!
//! ## Responsibilities by module
//!
//! - `trigger.rs`: one pass over the question computing cue bits.
//! - `rules.rs`: the ordered rule list and its productions.
//! - `extract.rs`: week, opponent, venue, sort and threshold extraction, and
//!   comparison sub-classification by entity counts.
//! - `metrics.rs`: the optional classification trace.

#[path = "classifier/extract.rs"]
mod extract;
#[path = "classifier/metrics.rs"]
mod metrics;
#[path = "classifier/rules.rs"]
mod rules;
#[cfg(test)]
#[path = "classifier/tests.rs"]
mod tests;
#[path = "classifier/trigger.rs"]
mod trigger;

pub use metrics::ClassificationDetails;
pub use trigger::CueMask;

use crate::api::Options;
use crate::description::QueryDescription;
use crate::normalize;
use crate::plan::{AggregationType, ContextFilters, Filters, QueryPlan, QueryType, ResponseFormat};
use once_cell::sync::Lazy;
use std::time::Instant;
use trigger::TriggerInfo;

static RULES: Lazy<Vec<Rule>> = Lazy::new(rules::get);

/// One classifier rule. Built with the `rule!` macro.
pub(crate) struct Rule {
    pub name: &'static str,
    /// OR-mask of [`CueMask`] bits; `0` means always eligible.
    pub cues: u32,
    pub production: fn(&Signals<'_>) -> Option<Classification>,
}

/// Everything a rule production may look at.
pub(crate) struct Signals<'a> {
    pub description: &'a QueryDescription,
    pub options: &'a Options,
    pub lower: String,
    pub trigger: TriggerInfo,
    /// Players, deduplicated, mention order.
    pub players: Vec<String>,
    /// Teams from the description, deduplicated, mention order.
    pub teams: Vec<String>,
    pub seasons: Vec<i32>,
    /// Canonical metric names.
    pub metrics: Vec<String>,
}

impl<'a> Signals<'a> {
    fn new(description: &'a QueryDescription, options: &'a Options) -> Self {
        let lower = description.question.to_ascii_lowercase();
        let trigger = TriggerInfo::scan(description, &lower);
        let mut seasons = Vec::with_capacity(description.seasons.len());
        for season in &description.seasons {
            if !seasons.contains(season) {
                seasons.push(*season);
            }
        }

        Signals {
            description,
            options,
            lower,
            trigger,
            players: dedup_names(&description.players),
            teams: dedup_names(&description.teams),
            seasons,
            metrics: normalize::canonicalize(&description.metrics),
        }
    }
}

/// A rule's verdict.
#[derive(Debug, Clone)]
pub(crate) struct Classification {
    pub query_type: QueryType,
    pub response_format: ResponseFormat,
    pub aggregation: Option<AggregationType>,
    /// Teams to compare when they came from the question text rather than
    /// the description.
    pub teams: Option<Vec<String>>,
    pub limit: Option<usize>,
    pub context: ContextFilters,
}

impl Classification {
    pub fn new(query_type: QueryType, response_format: ResponseFormat) -> Self {
        Self {
            query_type,
            response_format,
            aggregation: None,
            teams: None,
            limit: None,
            context: ContextFilters::default(),
        }
    }

    pub fn aggregated(mut self, aggregation: AggregationType) -> Self {
        self.aggregation = Some(aggregation);
        self
    }
}

/// Classify with the default rule set.
pub(crate) fn classify(description: &QueryDescription, options: &Options) -> QueryPlan {
    run(description, options).0
}

/// Classify and return the trace alongside the plan.
pub(crate) fn classify_traced(description: &QueryDescription, options: &Options) -> (QueryPlan, ClassificationDetails) {
    run(description, options)
}

fn run(description: &QueryDescription, options: &Options) -> (QueryPlan, ClassificationDetails) {
    let start = Instant::now();
    let signals = Signals::new(description, options);

    let mut evaluated = 0;
    let mut skipped = 0;
    let mut matched = None;
    for rule in RULES.iter() {
        if !signals.trigger.admits(rule.cues) {
            skipped += 1;
            continue;
        }
        evaluated += 1;
        if let Some(classification) = (rule.production)(&signals) {
            matched = Some((rule.name, classification));
            break;
        }
    }
    let (rule_name, classification) = matched
        .unwrap_or_else(|| ("fallback", Classification::new(QueryType::SingleEntityStat, ResponseFormat::Simple)));

    tracing::debug!(
        rule = rule_name,
        query_type = %classification.query_type,
        cues = ?signals.trigger.cues,
        "classified query"
    );

    let details = ClassificationDetails {
        matched_rule: rule_name,
        cues: signals.trigger.cues,
        phrases: signals.trigger.phrases.iter().copied().collect(),
        teams_detected: signals.trigger.teams.clone(),
        week: signals.trigger.week,
        rules_evaluated: evaluated,
        rules_skipped: skipped,
        elapsed: start.elapsed(),
    };
    (build_plan(signals, classification), details)
}

fn build_plan(signals: Signals<'_>, classification: Classification) -> QueryPlan {
    let query_type = classification.query_type;
    let filters = Filters {
        sport: signals.description.sport.clone(),
        seasons: signals.seasons,
        positions: signals.description.positions.clone(),
        limit: classification.limit,
        context: classification.context,
        extra: Default::default(),
    };

    QueryPlan {
        query_type,
        primary_entities: signals.players,
        secondary_entities: classification.teams.unwrap_or(signals.teams),
        metrics: signals.metrics,
        filters,
        aggregation: classification.aggregation,
        response_format: classification.response_format,
        processing_steps: query_type.processing_steps(),
        data_sources: query_type.data_sources(),
        question: signals.description.question.clone(),
    }
}

/// Drop blank and case-insensitively repeated names, keeping first spelling.
fn dedup_names(names: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        if !name.is_empty() && !out.iter().any(|seen| seen.eq_ignore_ascii_case(name)) {
            out.push(name.to_string());
        }
    }
    out
}
