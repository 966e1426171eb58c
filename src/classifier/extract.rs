//! Context extraction from question text.

use super::Signals;
use crate::description::QueryDescription;
use crate::normalize;
use crate::plan::{Comparator, OpponentType, QueryType, SortOrder, Threshold, Venue};
use crate::rules::keywords::{self, find_word};
use crate::rules::teams::NFL_TEAMS;

pub(super) fn week(lower: &str) -> Option<u32> {
    regex!(r"\bweek\s+(\d{1,2})\b").captures(lower).and_then(|caps| caps.get(1)?.as_str().parse().ok())
}

/// "top 5" → 5.
pub(super) fn top_n(lower: &str) -> Option<usize> {
    regex!(r"\btop\s+(\d{1,3})\b").captures(lower).and_then(|caps| caps.get(1)?.as_str().parse().ok())
}

/// Known teams mentioned in the question, ordered by first mention.
///
/// Known teams are the built-in NFL nicknames plus the description's teams. A
/// nickname hit is reported with the description's spelling when one of the
/// description's teams contains it ("Dallas Cowboys" for "cowboys").
pub(super) fn detect_teams(lower: &str, described: &[String]) -> Vec<String> {
    let mut hits: Vec<(usize, String)> = Vec::new();

    for team in described {
        if let Some(pos) = find_word(lower, &team.to_ascii_lowercase()) {
            hits.push((pos, team.clone()));
        }
    }
    for (nickname, display) in NFL_TEAMS {
        if let Some(pos) = find_word(lower, nickname) {
            let spelled = described
                .iter()
                .find(|team| find_word(&team.to_ascii_lowercase(), nickname).is_some())
                .cloned()
                .unwrap_or_else(|| (*display).to_string());
            hits.push((pos, spelled));
        }
    }

    hits.sort_by_key(|(pos, _)| *pos);
    let mut teams: Vec<String> = Vec::with_capacity(hits.len());
    for (_, team) in hits {
        if !teams.iter().any(|seen| seen.eq_ignore_ascii_case(&team)) {
            teams.push(team);
        }
    }
    teams
}

/// The team a question is about when no player was named.
pub(super) fn subject_team(description: &QueryDescription) -> Option<&str> {
    if description.players.is_empty() { description.teams.first().map(String::as_str) } else { None }
}

/// First mentioned team that is not the subject.
pub(super) fn opponent(signals: &Signals<'_>) -> Option<String> {
    let subject = subject_team(signals.description);
    signals.trigger.teams.iter().find(|team| subject.is_none_or(|s| !s.eq_ignore_ascii_case(team))).cloned()
}

pub(super) fn venue(lower: &str) -> Option<Venue> {
    if keywords::any(lower, keywords::HOME) {
        Some(Venue::Home)
    } else if keywords::any(lower, keywords::AWAY) {
        Some(Venue::Away)
    } else {
        None
    }
}

pub(super) fn opponent_type(lower: &str) -> Option<OpponentType> {
    if keywords::matches(lower, "division") {
        Some(OpponentType::Division)
    } else if keywords::matches(lower, "conference") {
        Some(OpponentType::Conference)
    } else {
        None
    }
}

pub(super) fn sort_order(lower: &str) -> SortOrder {
    if keywords::any(lower, keywords::SORT_DESC) {
        SortOrder::Desc
    } else if keywords::any(lower, keywords::SORT_ASC) {
        SortOrder::Asc
    } else {
        SortOrder::Desc
    }
}

/// Per-game sort metric: named in the question, else the first requested
/// metric, else the configured default.
pub(super) fn sort_metric(signals: &Signals<'_>) -> String {
    normalize::game_metric_in_question(&signals.lower)
        .map(str::to_string)
        .or_else(|| signals.metrics.first().cloned())
        .unwrap_or_else(|| signals.options.default_game_metric.clone())
}

pub(super) fn threshold(lower: &str) -> Option<Threshold> {
    let caps = regex!(
        r"\b(more than|greater than|over|above|at least|less than|fewer than|under|below|at most)\s+(\d+(?:\.\d+)?)"
    )
    .captures(lower)?;
    let comparator = match caps.get(1)?.as_str() {
        "at least" => Comparator::Ge,
        "at most" => Comparator::Le,
        "less than" | "fewer than" | "under" | "below" => Comparator::Lt,
        _ => Comparator::Gt,
    };
    let value = caps.get(2)?.as_str().parse().ok()?;
    Some(Threshold { comparator, value })
}

/// Comparison sub-classification by entity counts.
///
/// Returns the comparison type and, when the decision came from teams found
/// in the question text, the teams to compare.
pub(super) fn comparison_shape(signals: &Signals<'_>) -> (QueryType, Option<Vec<String>>) {
    let detected = &signals.trigger.teams;
    let players = signals.players.len();
    let teams = signals.teams.len();
    let seasons = signals.seasons.len();

    match (detected.len(), players, teams, seasons) {
        (d, ..) if d >= 3 => (QueryType::MultiTeamComparison, Some(detected.clone())),
        (2, ..) => (QueryType::TeamComparison, Some(detected.clone())),
        (_, p, ..) if p >= 3 => (QueryType::MultiEntityComparison, None),
        (_, 2, ..) => (QueryType::PairComparison, None),
        (_, _, t, _) if t >= 3 => (QueryType::MultiTeamComparison, None),
        (_, _, 2, _) => (QueryType::TeamComparison, None),
        (_, 1, _, s) if s >= 3 => (QueryType::MultiSeasonComparison, None),
        (_, 1, _, 2) => (QueryType::SeasonComparison, None),
        (d, ..) if d > 0 => (QueryType::TeamComparison, Some(detected.clone())),
        _ => (QueryType::PairComparison, None),
    }
}
