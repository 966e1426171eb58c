use super::{classify, classify_traced};
use crate::api::Options;
use crate::description::QueryDescription;
use crate::plan::{AggregationType, Comparator, OpponentType, QueryType, ResponseFormat, SortOrder, Threshold, Venue};

struct Case {
    question: &'static str,
    players: &'static [&'static str],
    teams: &'static [&'static str],
    seasons: &'static [i32],
    metrics: &'static [&'static str],
    expected: QueryType,
}

const fn case(question: &'static str, expected: QueryType) -> Case {
    Case { question, players: &[], teams: &[], seasons: &[], metrics: &[], expected }
}

impl Case {
    const fn players(mut self, players: &'static [&'static str]) -> Self {
        self.players = players;
        self
    }

    const fn teams(mut self, teams: &'static [&'static str]) -> Self {
        self.teams = teams;
        self
    }

    const fn seasons(mut self, seasons: &'static [i32]) -> Self {
        self.seasons = seasons;
        self
    }

    const fn metrics(mut self, metrics: &'static [&'static str]) -> Self {
        self.metrics = metrics;
        self
    }

    fn description(&self) -> QueryDescription {
        QueryDescription::new("nfl", self.question)
            .with_players(self.players.iter().copied())
            .with_teams(self.teams.iter().copied())
            .with_seasons(self.seasons.iter().copied())
            .with_metrics(self.metrics.iter().copied())
    }
}

fn run(desc: &QueryDescription) -> crate::plan::QueryPlan {
    classify(desc, &Options::default())
}

#[test]
fn classifies_representative_questions() {
    let cases = [
        case("Josh Allen passing yards", QueryType::SingleEntityStat)
            .players(&["Josh Allen"])
            .metrics(&["passing yards"]),
        case("Compare Josh Allen and Patrick Mahomes passing yards", QueryType::PairComparison)
            .players(&["Josh Allen", "Patrick Mahomes"])
            .metrics(&["passing yards"]),
        case("Compare Allen, Mahomes and Burrow passing yards", QueryType::MultiEntityComparison)
            .players(&["Josh Allen", "Patrick Mahomes", "Joe Burrow"])
            .metrics(&["passing yards"]),
        case("Compare Parsons, Watt, Garrett, Bosa and Crosby in sacks", QueryType::MultiEntityComparison)
            .players(&["Micah Parsons", "T.J. Watt", "Myles Garrett", "Nick Bosa", "Maxx Crosby"])
            .metrics(&["sacks"]),
        case("Who has more sacks, Parsons or Watt?", QueryType::PairComparison)
            .players(&["Micah Parsons", "T.J. Watt"])
            .metrics(&["sacks"]),
        case("Burrow vs Ravens week 5", QueryType::GameSpecificStat).players(&["Joe Burrow"]),
        case("How did Burrow play in week 5?", QueryType::GameSpecificStat).players(&["Joe Burrow"]),
        case("Burrow passing yards week 5", QueryType::SingleEntityStat)
            .players(&["Joe Burrow"])
            .metrics(&["passing yards"]),
        case("Burrow home vs away passing yards", QueryType::ContextualPerformance)
            .players(&["Joe Burrow"])
            .metrics(&["passing yards"]),
        case("Burrow stats in division games", QueryType::ContextualPerformance).players(&["Joe Burrow"]),
        case("What were Burrow's best games this season?", QueryType::GamePerformanceComparison)
            .players(&["Joe Burrow"]),
        case("Who leads the NFL in sacks?", QueryType::LeagueLeaders).metrics(&["sacks"]),
        case("Top 5 passers in passing yards", QueryType::LeagueLeaders).metrics(&["passing yards"]),
        case("Where does Micah Parsons rank in sacks?", QueryType::PlayerRanking)
            .players(&["Micah Parsons"])
            .metrics(&["sacks"]),
        case("Total sacks by the Cowboys defense", QueryType::AggregateStat)
            .teams(&["Dallas Cowboys"])
            .metrics(&["sacks"]),
        case("Average sacks across all teams", QueryType::AggregateStat).metrics(&["sacks"]),
        case("Players with more than 10 sacks", QueryType::ThresholdQuery).metrics(&["sacks"]),
        case("Josh Allen passing yards and rushing yards", QueryType::SingleEntityStat)
            .players(&["Josh Allen"])
            .metrics(&["passing yards", "rushing yards"]),
        case("Chiefs points this season", QueryType::SingleEntityStat).teams(&["Kansas City Chiefs"]),
        case("Cowboys vs Giants sacks", QueryType::TeamComparison).metrics(&["sacks"]),
        case("Compare the Cowboys, Eagles and Giants", QueryType::MultiTeamComparison),
        case("Compare Micah Parsons 2022 and 2023", QueryType::SeasonComparison)
            .players(&["Micah Parsons"])
            .seasons(&[2022, 2023]),
        case("Compare Micah Parsons over three seasons", QueryType::MultiSeasonComparison)
            .players(&["Micah Parsons"])
            .seasons(&[2021, 2022, 2023]),
        case("Who has more than 10 sacks?", QueryType::ThresholdQuery).metrics(&["sacks"]),
        case("Who had more than 4000 passing yards?", QueryType::ThresholdQuery),
        case("Compare these two offenses", QueryType::TeamComparison).teams(&["Kansas City Chiefs", "Buffalo Bills"]),
        case("Compare these offenses", QueryType::MultiTeamComparison)
            .teams(&["Kansas City Chiefs", "Buffalo Bills", "Miami Dolphins"]),
        case("Compare the Cowboys offense", QueryType::TeamComparison),
        case("", QueryType::SingleEntityStat),
    ];

    for c in &cases {
        let plan = run(&c.description());
        assert_eq!(plan.query_type, c.expected, "question: {:?}", c.question);
        assert!(!plan.processing_steps.is_empty(), "question: {:?}", c.question);
        assert!(!plan.data_sources.is_empty(), "question: {:?}", c.question);
        assert_eq!(plan.question, c.question);
    }
}

#[test]
fn explicit_override_beats_everything() {
    let desc = QueryDescription::new("nfl", "Burrow vs Ravens week 5, top 3")
        .with_players(["Joe Burrow", "Lamar Jackson"])
        .with_strategy("leaderboard_query");
    let (plan, details) = classify_traced(&desc, &Options::default());

    assert_eq!(plan.query_type, QueryType::LeagueLeaders);
    assert_eq!(plan.response_format, ResponseFormat::Ranking);
    assert_eq!(plan.aggregation, Some(AggregationType::Rank));
    assert_eq!(plan.filters.limit, Some(3));
    assert_eq!(details.matched_rule, "explicit leaderboard override");
    assert_eq!(details.rules_evaluated, 1);
}

#[test]
fn game_question_carries_week_and_opponent() {
    let desc = QueryDescription::new("nfl", "Burrow vs Ravens week 5").with_players(["Joe Burrow"]);
    let plan = run(&desc);

    assert_eq!(plan.query_type, QueryType::GameSpecificStat);
    assert_eq!(plan.response_format, ResponseFormat::Detailed);
    assert_eq!(plan.filters.context.week, Some(5));
    assert_eq!(plan.filters.context.opponent.as_deref(), Some("Ravens"));
}

#[test]
fn contextual_question_carries_venue_and_opponent_type() {
    let desc = QueryDescription::new("nfl", "Burrow at home in division games").with_players(["Joe Burrow"]);
    let plan = run(&desc);

    assert_eq!(plan.query_type, QueryType::ContextualPerformance);
    assert_eq!(plan.filters.context.venue, Some(Venue::Home));
    assert_eq!(plan.filters.context.opponent_type, Some(OpponentType::Division));
}

#[test]
fn game_ranking_sort_follows_question() {
    let desc = QueryDescription::new("nfl", "Burrow's worst games by passer rating").with_players(["Joe Burrow"]);
    let plan = run(&desc);
    assert_eq!(plan.query_type, QueryType::GamePerformanceComparison);
    assert_eq!(plan.filters.context.sort_order, Some(SortOrder::Asc));
    assert_eq!(plan.filters.context.sort_metric.as_deref(), Some("passer_rating"));

    let desc = QueryDescription::new("nfl", "Burrow's best games").with_players(["Joe Burrow"]);
    let plan = run(&desc);
    assert_eq!(plan.filters.context.sort_order, Some(SortOrder::Desc));
    assert_eq!(plan.filters.context.sort_metric.as_deref(), Some("passing_yards"));
}

#[test]
fn league_cue_turns_ranking_into_leaders() {
    let desc = QueryDescription::new("nfl", "Where does Micah Parsons rank in the league in sacks?")
        .with_players(["Micah Parsons"])
        .with_metrics(["sacks"]);
    assert_eq!(run(&desc).query_type, QueryType::LeagueLeaders);
}

#[test]
fn aggregate_kind_follows_wording() {
    let avg = run(&QueryDescription::new("nfl", "Average sacks across all teams"));
    assert_eq!(avg.aggregation, Some(AggregationType::Average));

    let total = run(&QueryDescription::new("nfl", "Total sacks by the Cowboys").with_teams(["Dallas Cowboys"]));
    assert_eq!(total.aggregation, Some(AggregationType::Sum));
    assert_eq!(total.response_format, ResponseFormat::Detailed);
}

#[test]
fn threshold_is_extracted() {
    let plan = run(&QueryDescription::new("nfl", "Quarterbacks with at least 4000 passing yards"));
    assert_eq!(plan.query_type, QueryType::ThresholdQuery);
    assert_eq!(plan.aggregation, Some(AggregationType::Filter));
    assert_eq!(plan.filters.context.threshold, Some(Threshold { comparator: Comparator::Ge, value: 4000.0 }));
}

#[test]
fn who_has_more_than_a_number_is_a_threshold() {
    let plan = run(&QueryDescription::new("nfl", "Who has more than 10 sacks?").with_metrics(["sacks"]));
    assert_eq!(plan.query_type, QueryType::ThresholdQuery);
    assert_eq!(plan.filters.context.threshold, Some(Threshold { comparator: Comparator::Gt, value: 10.0 }));

    let plan = run(&QueryDescription::new("nfl", "Who had more than 4000 passing yards?"));
    assert_eq!(plan.query_type, QueryType::ThresholdQuery);
    assert_eq!(plan.filters.context.threshold, Some(Threshold { comparator: Comparator::Gt, value: 4000.0 }));

    let plan = run(&QueryDescription::new("nfl", "Who has more sacks, Parsons or Watt?")
        .with_players(["Micah Parsons", "T.J. Watt"]));
    assert_eq!(plan.query_type, QueryType::PairComparison);
}

#[test]
fn described_teams_drive_comparison_when_question_names_none() {
    let plan = run(&QueryDescription::new("nfl", "compare these two offenses")
        .with_teams(["Kansas City Chiefs", "Buffalo Bills"]));
    assert_eq!(plan.query_type, QueryType::TeamComparison);
    assert_eq!(plan.secondary_entities, vec!["Kansas City Chiefs", "Buffalo Bills"]);

    let plan = run(&QueryDescription::new("nfl", "compare these offenses")
        .with_teams(["Kansas City Chiefs", "Buffalo Bills", "Miami Dolphins"]));
    assert_eq!(plan.query_type, QueryType::MultiTeamComparison);
    assert_eq!(plan.comparison_entities().len(), 3);
}

#[test]
fn single_named_team_falls_back_to_team_comparison() {
    let plan = run(&QueryDescription::new("nfl", "Compare the Cowboys offense"));
    assert_eq!(plan.query_type, QueryType::TeamComparison);
    assert_eq!(plan.secondary_entities, vec!["Cowboys"]);
}

#[test]
fn teams_named_in_question_become_comparison_entities() {
    let plan = run(&QueryDescription::new("nfl", "Cowboys vs Giants sacks").with_metrics(["sacks"]));
    assert_eq!(plan.secondary_entities, vec!["Cowboys", "Giants"]);
    assert_eq!(plan.comparison_entities().len(), 2);

    let plan = run(&QueryDescription::new("nfl", "Compare the Dallas Cowboys and the Eagles")
        .with_teams(["Dallas Cowboys", "Philadelphia Eagles"]));
    assert_eq!(plan.query_type, QueryType::TeamComparison);
    assert_eq!(plan.secondary_entities, vec!["Dallas Cowboys", "Philadelphia Eagles"]);
}

#[test]
fn comparison_hint_alone_selects_comparison() {
    let desc = QueryDescription::new("nfl", "Micah Parsons sacks by season")
        .with_players(["Micah Parsons"])
        .with_seasons([2021, 2022, 2023])
        .with_comparison_target("season_comparison");
    assert_eq!(run(&desc).query_type, QueryType::MultiSeasonComparison);
}

#[test]
fn entities_metrics_and_seasons_are_normalized() {
    let desc = QueryDescription::new("nfl", "Compare Josh Allen and Patrick Mahomes")
        .with_players(["Josh Allen", "josh allen", " ", "Patrick Mahomes"])
        .with_seasons([2023, 2023, 2024])
        .with_metrics(["passingYards", "Passing Yards", "sacks"]);
    let plan = run(&desc);

    assert_eq!(plan.query_type, QueryType::PairComparison);
    assert_eq!(plan.primary_entities, vec!["Josh Allen", "Patrick Mahomes"]);
    assert_eq!(plan.metrics, vec!["passing_yards", "sacks"]);
    assert_eq!(plan.filters.seasons, vec![2023, 2024]);
}

#[test]
fn trace_counts_skipped_rules() {
    let desc = QueryDescription::new("nfl", "Josh Allen passing yards").with_players(["Josh Allen"]);
    let (plan, details) = classify_traced(&desc, &Options::default());

    assert_eq!(plan.response_format, ResponseFormat::Simple);
    assert_eq!(details.matched_rule, "default");
    assert_eq!(details.rules_skipped, 9);
    assert_eq!(details.rules_evaluated, 3);
    assert!(details.phrases.is_empty());
}

#[test]
fn classification_is_deterministic() {
    let desc = QueryDescription::new("nfl", "Compare Allen, Mahomes and Burrow passing yards")
        .with_players(["Josh Allen", "Patrick Mahomes", "Joe Burrow"]);
    assert_eq!(run(&desc), run(&desc));
}
