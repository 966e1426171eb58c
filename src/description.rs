use serde::{Deserialize, Serialize};

/// Structured description of a question, produced upstream by whatever
/// language-understanding step turned free text into entities and metrics.
///
/// The classifier treats this as read-only input. Entity lists are expected in
/// mention order; duplicates are tolerated and collapsed during planning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryDescription {
    /// Sport code, e.g. `"nfl"`.
    pub sport: String,
    /// Primary entities (players), in mention order.
    pub players: Vec<String>,
    /// Secondary entities (teams), in mention order.
    pub teams: Vec<String>,
    /// Season identifiers, e.g. `[2023, 2024]`.
    pub seasons: Vec<i32>,
    /// Requested metric names as the user phrased them.
    pub metrics: Vec<String>,
    /// Position filters forwarded to leaderboard fetches (e.g. `["QB"]`).
    pub positions: Vec<String>,
    /// Explicit strategy override, e.g. `"leaderboard_query"`.
    pub strategy: Option<String>,
    /// Comparison target hint: `"player_comparison"`, `"team_comparison"` or `"season_comparison"`.
    pub comparison_target: Option<String>,
    /// Expected output shape hint; `"comparison"` behaves like a comparison target.
    pub output_expectation: Option<String>,
    /// The original question, used only for keyword cues.
    pub question: String,
}

impl QueryDescription {
    pub fn new(sport: impl Into<String>, question: impl Into<String>) -> Self {
        Self { sport: sport.into(), question: question.into(), ..Self::default() }
    }

    pub fn with_players<I, S>(mut self, players: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.players = players.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_teams<I, S>(mut self, teams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.teams = teams.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_seasons(mut self, seasons: impl IntoIterator<Item = i32>) -> Self {
        self.seasons = seasons.into_iter().collect();
        self
    }

    pub fn with_metrics<I, S>(mut self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metrics = metrics.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    pub fn with_comparison_target(mut self, target: impl Into<String>) -> Self {
        self.comparison_target = Some(target.into());
        self
    }

    /// True when an upstream hint explicitly asked for a comparison.
    pub(crate) fn hints_comparison(&self) -> bool {
        let target = matches!(
            self.comparison_target.as_deref(),
            Some("player_comparison" | "team_comparison" | "season_comparison")
        );
        target || self.output_expectation.as_deref() == Some("comparison")
    }

    pub(crate) fn is_leaderboard_override(&self) -> bool {
        self.strategy.as_deref() == Some("leaderboard_query")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_missing_fields() {
        let desc: QueryDescription =
            serde_json::from_str(r#"{"sport":"nfl","players":["Josh Allen"],"question":"Josh Allen passing yards"}"#)
                .unwrap();

        assert_eq!(desc.players, vec!["Josh Allen"]);
        assert!(desc.teams.is_empty());
        assert!(desc.strategy.is_none());
    }

    #[test]
    fn comparison_hints() {
        let desc = QueryDescription::new("nfl", "x").with_comparison_target("season_comparison");
        assert!(desc.hints_comparison());

        let mut desc = QueryDescription::new("nfl", "x");
        desc.output_expectation = Some("comparison".to_string());
        assert!(desc.hints_comparison());

        let desc = QueryDescription::new("nfl", "x").with_comparison_target("something_else");
        assert!(!desc.hints_comparison());
    }
}
