//! Query plans.
//!
//! A [`QueryPlan`] is the complete, immutable hand-off between the classifier
//! and the executor. The [`QueryType`] alone decides which executor branch
//! runs; everything else on the plan parameterizes that branch.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The closed set of query shapes the executor knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    /// "Micah Parsons sacks"
    SingleEntityStat,
    /// "Micah Parsons vs T.J. Watt sacks"
    PairComparison,
    /// "Compare Parsons, Watt, and Garrett"
    MultiEntityComparison,
    /// "Cowboys vs Giants defensive stats"
    TeamComparison,
    /// "Cowboys vs Giants vs Eagles"
    MultiTeamComparison,
    /// "Parsons 2023 vs 2024"
    SeasonComparison,
    /// "Parsons 2022 vs 2023 vs 2024"
    MultiSeasonComparison,
    /// "Who leads the league in sacks?"
    LeagueLeaders,
    /// "Where does Parsons rank in sacks?"
    PlayerRanking,
    /// "Average sacks per team in the NFC East"
    AggregateStat,
    /// "Players with more than 10 sacks"
    ThresholdQuery,
    /// "Burrow vs Ravens week 5"
    GameSpecificStat,
    /// "Burrow home vs away games"
    ContextualPerformance,
    /// "Burrow's best games this season"
    GamePerformanceComparison,
}

impl QueryType {
    pub const ALL: [QueryType; 14] = [
        QueryType::SingleEntityStat,
        QueryType::PairComparison,
        QueryType::MultiEntityComparison,
        QueryType::TeamComparison,
        QueryType::MultiTeamComparison,
        QueryType::SeasonComparison,
        QueryType::MultiSeasonComparison,
        QueryType::LeagueLeaders,
        QueryType::PlayerRanking,
        QueryType::AggregateStat,
        QueryType::ThresholdQuery,
        QueryType::GameSpecificStat,
        QueryType::ContextualPerformance,
        QueryType::GamePerformanceComparison,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QueryType::SingleEntityStat => "single_entity_stat",
            QueryType::PairComparison => "pair_comparison",
            QueryType::MultiEntityComparison => "multi_entity_comparison",
            QueryType::TeamComparison => "team_comparison",
            QueryType::MultiTeamComparison => "multi_team_comparison",
            QueryType::SeasonComparison => "season_comparison",
            QueryType::MultiSeasonComparison => "multi_season_comparison",
            QueryType::LeagueLeaders => "league_leaders",
            QueryType::PlayerRanking => "player_ranking",
            QueryType::AggregateStat => "aggregate_stat",
            QueryType::ThresholdQuery => "threshold_query",
            QueryType::GameSpecificStat => "game_specific_stat",
            QueryType::ContextualPerformance => "contextual_performance",
            QueryType::GamePerformanceComparison => "game_performance_comparison",
        }
    }

    /// Named processing steps for this query type. Informational only.
    pub fn processing_steps(self) -> &'static [&'static str] {
        match self {
            QueryType::SingleEntityStat => {
                &["resolve_entity", "fetch_entity_stats", "extract_requested_metrics", "format_simple_response"]
            }
            QueryType::PairComparison => &[
                "resolve_all_player_ids",
                "fetch_all_player_stats",
                "extract_metrics_for_all_players",
                "compare_metrics",
                "format_comparison_response",
            ],
            QueryType::MultiEntityComparison => &[
                "resolve_all_player_ids",
                "batch_fetch_player_stats",
                "extract_metrics_for_all_players",
                "perform_n_way_comparison",
                "rank_by_metrics",
                "format_multi_comparison_response",
            ],
            QueryType::TeamComparison => &[
                "resolve_all_team_ids",
                "fetch_all_team_stats",
                "extract_metrics_for_all_teams",
                "compare_team_metrics",
                "format_team_comparison_response",
            ],
            QueryType::MultiTeamComparison => &[
                "resolve_all_team_ids",
                "batch_fetch_team_stats",
                "extract_metrics_for_all_teams",
                "perform_n_way_team_comparison",
                "rank_teams_by_metrics",
                "format_multi_team_comparison_response",
            ],
            QueryType::SeasonComparison => &[
                "resolve_player_id",
                "fetch_multi_season_stats",
                "extract_metrics_across_seasons",
                "compare_season_metrics",
                "format_season_comparison_response",
            ],
            QueryType::MultiSeasonComparison => &[
                "resolve_player_id",
                "batch_fetch_multi_season_stats",
                "extract_metrics_across_all_seasons",
                "perform_n_way_season_comparison",
                "identify_trends",
                "format_multi_season_comparison_response",
            ],
            QueryType::LeagueLeaders => &["fetch_league_stats", "rank_by_metric", "format_ranking_response"],
            QueryType::PlayerRanking => &[
                "resolve_player_id",
                "fetch_player_stats",
                "fetch_league_stats",
                "calculate_player_rank",
                "format_ranking_response",
            ],
            QueryType::AggregateStat => &[
                "resolve_all_entity_ids",
                "fetch_all_entity_stats",
                "aggregate_metrics",
                "format_aggregate_response",
            ],
            QueryType::ThresholdQuery => {
                &["fetch_league_stats", "apply_threshold", "format_ranking_response"]
            }
            QueryType::GameSpecificStat => &[
                "resolve_player_id",
                "fetch_player_gamelog",
                "filter_by_game_context",
                "extract_game_stats",
                "format_game_response",
            ],
            QueryType::ContextualPerformance => &[
                "resolve_player_id",
                "fetch_player_gamelog",
                "filter_by_context",
                "aggregate_contextual_stats",
                "format_contextual_comparison",
            ],
            QueryType::GamePerformanceComparison => &[
                "resolve_player_id",
                "fetch_player_gamelog",
                "rank_games_by_performance",
                "identify_best_worst_games",
                "format_game_ranking_response",
            ],
        }
    }

    /// Data-source capabilities this query type needs from the stat backend.
    pub fn data_sources(self) -> &'static [&'static str] {
        match self {
            QueryType::SingleEntityStat => &["PlayerStats"],
            QueryType::PairComparison => &["PlayerStats", "MultiplePlayerStats"],
            QueryType::MultiEntityComparison => &["PlayerStats", "BatchPlayerStats"],
            QueryType::TeamComparison => &["TeamStats", "MultipleTeamStats"],
            QueryType::MultiTeamComparison => &["TeamStats", "BatchTeamStats"],
            QueryType::SeasonComparison => &["PlayerStats", "MultiSeasonStats"],
            QueryType::MultiSeasonComparison => &["PlayerStats", "BatchSeasonStats"],
            QueryType::LeagueLeaders => &["LeagueStats", "AllPlayersStats"],
            QueryType::PlayerRanking => &["PlayerStats", "LeagueStats"],
            QueryType::AggregateStat => &["PlayerStats", "TeamStats", "LeagueStats"],
            QueryType::ThresholdQuery => &["LeagueStats", "AllPlayersStats"],
            QueryType::GameSpecificStat => &["PlayerGamelog"],
            QueryType::ContextualPerformance => &["PlayerGamelog"],
            QueryType::GamePerformanceComparison => &["PlayerGamelog"],
        }
    }

    /// Types whose subjects are the plan's secondary (team) entities.
    pub fn compares_teams(self) -> bool {
        matches!(self, QueryType::TeamComparison | QueryType::MultiTeamComparison)
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation hint for the downstream formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    Simple,
    Detailed,
    /// Several metrics for a single entity.
    MultiStat,
    /// Team totals for a single team.
    TeamStats,
    ComparisonTable,
    Ranking,
}

impl ResponseFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseFormat::Simple => "simple",
            ResponseFormat::Detailed => "detailed",
            ResponseFormat::MultiStat => "multi_stat",
            ResponseFormat::TeamStats => "team_stats",
            ResponseFormat::ComparisonTable => "comparison_table",
            ResponseFormat::Ranking => "ranking",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationType {
    Sum,
    Average,
    Rank,
    Filter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Desc,
    Asc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Venue {
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpponentType {
    Division,
    Conference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    Gt,
    Ge,
    Lt,
    Le,
}

impl Comparator {
    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Comparator::Gt => value > threshold,
            Comparator::Ge => value >= threshold,
            Comparator::Lt => value < threshold,
            Comparator::Le => value <= threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub comparator: Comparator,
    pub value: f64,
}

/// Question-derived context keys. All optional; set only by the classifier
/// rule that recognized the corresponding cue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<Venue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_type: Option<OpponentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_metric: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Threshold>,
}

/// Filters forwarded to every [`StatSource`](crate::StatSource) call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Filters {
    pub sport: String,
    pub seasons: Vec<i32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub positions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(flatten)]
    pub context: ContextFilters,
    /// Free-form context keys the classifier does not interpret.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Filters {
    pub fn new(sport: impl Into<String>) -> Self {
        Self { sport: sport.into(), ..Self::default() }
    }

    /// A copy of these filters narrowed to a single season.
    pub fn for_season(&self, season: i32) -> Self {
        Self { seasons: vec![season], ..self.clone() }
    }
}

/// Fully resolved execution description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPlan {
    pub query_type: QueryType,
    /// Players, in mention order, deduplicated.
    pub primary_entities: Vec<String>,
    /// Teams, in mention order, deduplicated.
    pub secondary_entities: Vec<String>,
    /// Canonical metric names, deduplicated.
    pub metrics: Vec<String>,
    pub filters: Filters,
    pub aggregation: Option<AggregationType>,
    pub response_format: ResponseFormat,
    pub processing_steps: &'static [&'static str],
    pub data_sources: &'static [&'static str],
    /// The original question, kept for the leaderboard metric fallback.
    pub question: String,
}

impl QueryPlan {
    /// A bare plan with the step/data-source tables attached. The classifier
    /// is the normal producer; this exists for callers that build plans by hand.
    pub fn new(query_type: QueryType, sport: impl Into<String>) -> Self {
        Self {
            query_type,
            primary_entities: Vec::new(),
            secondary_entities: Vec::new(),
            metrics: Vec::new(),
            filters: Filters::new(sport),
            aggregation: None,
            response_format: ResponseFormat::Simple,
            processing_steps: query_type.processing_steps(),
            data_sources: query_type.data_sources(),
            question: String::new(),
        }
    }

    /// The single subject of a one-entity plan: the first player, else the first team.
    pub fn subject(&self) -> Option<&str> {
        self.primary_entities.first().or_else(|| self.secondary_entities.first()).map(String::as_str)
    }

    /// Entities compared by an N-way plan.
    pub fn comparison_entities(&self) -> &[String] {
        if self.query_type.compares_teams() { &self.secondary_entities } else { &self.primary_entities }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_type_has_steps_and_sources() {
        for qt in QueryType::ALL {
            assert!(!qt.processing_steps().is_empty(), "{qt} has no processing steps");
            assert!(!qt.data_sources().is_empty(), "{qt} has no data sources");
        }
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&QueryType::MultiEntityComparison).unwrap();
        assert_eq!(json, "\"multi_entity_comparison\"");
        assert_eq!(QueryType::MultiEntityComparison.to_string(), "multi_entity_comparison");
    }

    #[test]
    fn for_season_keeps_context() {
        let mut filters = Filters::new("nfl");
        filters.seasons = vec![2022, 2023];
        filters.context.week = Some(5);

        let narrowed = filters.for_season(2023);
        assert_eq!(narrowed.seasons, vec![2023]);
        assert_eq!(narrowed.context.week, Some(5));
        assert_eq!(narrowed.sport, "nfl");
    }

    #[test]
    fn comparison_entities_follow_type() {
        let mut plan = QueryPlan::new(QueryType::TeamComparison, "nfl");
        plan.primary_entities = vec!["A".into()];
        plan.secondary_entities = vec!["Cowboys".into(), "Giants".into()];
        assert_eq!(plan.comparison_entities(), ["Cowboys", "Giants"]);

        plan.query_type = QueryType::PairComparison;
        assert_eq!(plan.comparison_entities(), ["A"]);
    }
}
