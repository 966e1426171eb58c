//! The ordered classifier rules. First production to return `Some` wins.

use super::extract;
use super::{Classification, CueMask, Rule};
use crate::plan::{AggregationType, QueryType, ResponseFormat};
use crate::rules::keywords;

pub(super) fn get() -> Vec<Rule> {
    vec![
        rule_explicit_override(),
        rule_game_specific(),
        rule_contextual(),
        rule_game_comparison(),
        rule_leaderboard(),
        rule_comparison(),
        rule_ranking(),
        rule_aggregate(),
        rule_threshold(),
        rule_multi_stat(),
        rule_team_stats(),
        rule_default(),
    ]
}

/// `strategy: "leaderboard_query"` beats every keyword and entity count.
fn rule_explicit_override() -> Rule {
    rule! {
        name: "explicit leaderboard override",
        cues: CueMask::OVERRIDE.bits(),
        prod: |signals: &Signals| -> Option<Classification> {
            let mut out = Classification::new(QueryType::LeagueLeaders, ResponseFormat::Ranking)
                .aggregated(AggregationType::Rank);
            out.limit = extract::top_n(&signals.lower);
            Some(out)
        }
    }
}

/// "Burrow vs Ravens week 5", "his stats in the game against Dallas"
fn rule_game_specific() -> Rule {
    rule! {
        name: "game specific",
        cues: CueMask::GAME_SPECIFIC.bits(),
        prod: |signals: &Signals| -> Option<Classification> {
            let mut out = Classification::new(QueryType::GameSpecificStat, ResponseFormat::Detailed);
            out.context.week = signals.trigger.week;
            out.context.opponent = extract::opponent(signals);
            Some(out)
        }
    }
}

/// "Burrow home vs away", "division games"
fn rule_contextual() -> Rule {
    rule! {
        name: "contextual performance",
        cues: CueMask::CONTEXTUAL.bits(),
        prod: |signals: &Signals| -> Option<Classification> {
            let mut out = Classification::new(QueryType::ContextualPerformance, ResponseFormat::ComparisonTable);
            out.context.venue = extract::venue(&signals.lower);
            out.context.opponent_type = extract::opponent_type(&signals.lower);
            Some(out)
        }
    }
}

/// "Burrow's best games this season"
fn rule_game_comparison() -> Rule {
    rule! {
        name: "game performance comparison",
        cues: CueMask::GAME_COMPARISON.bits(),
        prod: |signals: &Signals| -> Option<Classification> {
            let mut out = Classification::new(QueryType::GamePerformanceComparison, ResponseFormat::Ranking);
            out.context.sort_order = Some(extract::sort_order(&signals.lower));
            out.context.sort_metric = Some(extract::sort_metric(signals));
            Some(out)
        }
    }
}

/// "Who leads the NFL in sacks?", "top 5 passers"
fn rule_leaderboard() -> Rule {
    rule! {
        name: "leaderboard keywords",
        cues: CueMask::LEADERBOARD.bits(),
        prod: |signals: &Signals| -> Option<Classification> {
            let mut out = Classification::new(QueryType::LeagueLeaders, ResponseFormat::Ranking)
                .aggregated(AggregationType::Rank);
            out.limit = extract::top_n(&signals.lower);
            Some(out)
        }
    }
}

/// Hinted or keyworded comparisons, sub-classified by entity counts.
fn rule_comparison() -> Rule {
    rule! {
        name: "comparison",
        cues: (CueMask::COMPARISON_HINT | CueMask::COMPARISON | CueMask::VERSUS).bits(),
        prod: |signals: &Signals| -> Option<Classification> {
            let cues = signals.trigger.cues;
            // "vs"/"against" next to game context describe an opponent, not a comparison.
            let versus = cues.contains(CueMask::VERSUS) && !cues.contains(CueMask::GAME_SPECIFIC);
            if !(cues.intersects(CueMask::COMPARISON_HINT | CueMask::COMPARISON) || versus) {
                return None;
            }
            // "Who has more than 10 sacks?" is a threshold question.
            let keyworded = keywords::COMPARISON
                .iter()
                .any(|phrase| !keywords::WHO_HAS_MORE.contains(phrase) && signals.trigger.phrases.contains(phrase));
            if !(versus || keyworded || cues.contains(CueMask::COMPARISON_HINT))
                && extract::threshold(&signals.lower).is_some()
            {
                return None;
            }

            let (query_type, teams) = extract::comparison_shape(signals);
            let mut out = Classification::new(query_type, ResponseFormat::ComparisonTable);
            out.teams = teams;
            Some(out)
        }
    }
}

/// "Where does Parsons rank in sacks?"
fn rule_ranking() -> Rule {
    rule! {
        name: "ranking keywords",
        cues: CueMask::RANKING.bits(),
        prod: |signals: &Signals| -> Option<Classification> {
            let query_type = if signals.trigger.cues.contains(CueMask::LEAGUE) {
                QueryType::LeagueLeaders
            } else {
                QueryType::PlayerRanking
            };
            let mut out = Classification::new(query_type, ResponseFormat::Ranking).aggregated(AggregationType::Rank);
            if query_type == QueryType::LeagueLeaders {
                out.limit = extract::top_n(&signals.lower);
            }
            Some(out)
        }
    }
}

/// "Average sacks per team in the NFC East"
fn rule_aggregate() -> Rule {
    rule! {
        name: "aggregate keywords",
        cues: CueMask::AGGREGATE.bits(),
        prod: |signals: &Signals| -> Option<Classification> {
            let aggregation = if keywords::any(&signals.lower, keywords::AVERAGE) {
                AggregationType::Average
            } else {
                AggregationType::Sum
            };
            Some(Classification::new(QueryType::AggregateStat, ResponseFormat::Detailed).aggregated(aggregation))
        }
    }
}

/// "Players with more than 10 sacks"
fn rule_threshold() -> Rule {
    rule! {
        name: "threshold keywords",
        cues: CueMask::THRESHOLD.bits(),
        prod: |signals: &Signals| -> Option<Classification> {
            let mut out = Classification::new(QueryType::ThresholdQuery, ResponseFormat::Ranking)
                .aggregated(AggregationType::Filter);
            out.context.threshold = extract::threshold(&signals.lower);
            Some(out)
        }
    }
}

/// Several metrics for one player.
fn rule_multi_stat() -> Rule {
    rule! {
        name: "multi stat",
        prod: |signals: &Signals| -> Option<Classification> {
            (signals.metrics.len() > 1 && signals.players.len() == 1)
                .then(|| Classification::new(QueryType::SingleEntityStat, ResponseFormat::MultiStat))
        }
    }
}

/// A team with no players.
fn rule_team_stats() -> Rule {
    rule! {
        name: "team stats",
        prod: |signals: &Signals| -> Option<Classification> {
            (!signals.teams.is_empty() && signals.players.is_empty())
                .then(|| Classification::new(QueryType::SingleEntityStat, ResponseFormat::TeamStats))
        }
    }
}

fn rule_default() -> Rule {
    rule! {
        name: "default",
        prod: |_signals: &Signals| -> Option<Classification> {
            Some(Classification::new(QueryType::SingleEntityStat, ResponseFormat::Simple))
        }
    }
}
