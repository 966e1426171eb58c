//! Metric-name normalization and derived-metric evaluation.
//!
//! Names are standardized here; values are read lazily at execution time via
//! [`metric_value`], which is also where derived metrics are computed.

use crate::rules::keywords;
use crate::rules::metric_names::{self, BY_KEY, GAME_METRIC_FALLBACKS, QUESTION_PHRASES};
use crate::source::StatLine;
use std::collections::HashSet;

const TOTAL_TOUCHDOWNS: &str = "total_touchdowns";
const TOTAL_OFFENSIVE_YARDS: &str = "total_offensive_yards";
const PASSING_YARDS_PER_GAME: &str = "passing_yards_per_game";

/// Canonical identifier for one user-facing metric name.
///
/// Unknown names are returned unchanged.
///
/// ```
/// assert_eq!(boxscore::canonical_name("Passing Yards"), "passing_yards");
/// assert_eq!(boxscore::canonical_name("passingYards"), "passing_yards");
/// assert_eq!(boxscore::canonical_name("hurries"), "hurries");
/// ```
pub fn canonical_name(name: &str) -> String {
    match BY_KEY.get(&metric_names::lookup_key(name)) {
        Some(canonical) => (*canonical).to_string(),
        None => name.to_string(),
    }
}

/// Map every name to its canonical identifier and drop duplicates, keeping the
/// first occurrence. Blank names are skipped.
pub fn canonicalize<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let name = name.as_ref();
        if name.trim().is_empty() {
            continue;
        }
        let canonical = canonical_name(name);
        if seen.insert(canonical.clone()) {
            out.push(canonical);
        }
    }
    out
}

/// Whether `metric` is computed from other stored metrics.
pub fn is_derived(metric: &str) -> bool {
    matches!(metric, TOTAL_TOUCHDOWNS | TOTAL_OFFENSIVE_YARDS | PASSING_YARDS_PER_GAME)
}

/// Read a canonical metric from one stat line.
///
/// Derived metrics are computed from their inputs when at least one input is
/// present (absent inputs count as zero); otherwise a directly stored value
/// under the derived name is used, if any.
pub fn metric_value(stats: &StatLine, metric: &str) -> Option<f64> {
    let derived = match metric {
        TOTAL_TOUCHDOWNS => sum_present(stats, &["passing_touchdowns", "rushing_touchdowns", "receiving_touchdowns"]),
        TOTAL_OFFENSIVE_YARDS => sum_present(stats, &["passing_yards", "rushing_yards", "receiving_yards"]),
        PASSING_YARDS_PER_GAME => match (stats.get("passing_yards"), stats.get("games_played")) {
            (Some(yards), Some(games)) if *games > 0.0 => Some(yards / games),
            _ => None,
        },
        _ => None,
    };
    derived.or_else(|| stats.get(metric).copied())
}

fn sum_present(stats: &StatLine, inputs: &[&str]) -> Option<f64> {
    let values: Vec<f64> = inputs.iter().filter_map(|name| stats.get(*name).copied()).collect();
    if values.is_empty() { None } else { Some(values.iter().sum()) }
}

/// Project a stat line onto the requested metrics. An empty request keeps
/// every stored metric. Metrics with no value are left out.
pub(crate) fn extract(stats: &StatLine, metrics: &[String]) -> StatLine {
    if metrics.is_empty() {
        return stats.clone();
    }
    metrics.iter().filter_map(|metric| metric_value(stats, metric).map(|value| (metric.clone(), value))).collect()
}

/// The metric named earliest in a lower-cased question; on equal positions the
/// longer phrase wins.
pub(crate) fn metric_in_question(lower: &str) -> Option<&'static str> {
    let mut best: Option<(usize, &'static str)> = None;
    for (phrase, canonical) in QUESTION_PHRASES.iter() {
        if let Some(pos) = keywords::find_word(lower, phrase) {
            // Phrases are sorted longest first, so strict `<` keeps the longer one on ties.
            if best.is_none_or(|(best_pos, _)| pos < best_pos) {
                best = Some((pos, canonical));
            }
        }
    }
    best.map(|(_, canonical)| canonical)
}

/// Sort metric for per-game questions: a named metric, else a generic word
/// ("yards", "touchdown", "rating").
pub(crate) fn game_metric_in_question(lower: &str) -> Option<&'static str> {
    metric_in_question(lower).or_else(|| {
        GAME_METRIC_FALLBACKS.iter().find(|(word, _)| lower.contains(word)).map(|(_, canonical)| *canonical)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line(pairs: &[(&str, f64)]) -> StatLine {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn maps_both_spelling_families() {
        let cases = [
            ("passing yards", "passing_yards"),
            ("passingYards", "passing_yards"),
            ("Passing Touchdowns", "passing_touchdowns"),
            ("fieldGoalsMade", "field_goals_made"),
            ("touchdowns", "total_touchdowns"),
            ("offensive yards", "total_offensive_yards"),
            ("yards per game", "passing_yards_per_game"),
            ("sacks", "sacks"),
        ];
        for (input, expected) in cases {
            assert_eq!(canonical_name(input), expected, "input: {input}");
        }
    }

    #[test]
    fn unknown_names_pass_through() {
        assert_eq!(canonical_name("pressure rate"), "pressure rate");
    }

    #[test]
    fn canonicalize_dedups_in_order() {
        let out = canonicalize(&["sacks", "passing yards", "passingYards", "Sacks", "", "hurries"]);
        assert_eq!(out, vec!["sacks", "passing_yards", "hurries"]);
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let inputs: Vec<Vec<&str>> = vec![
            vec!["passing yards", "passingYards", "touchdowns"],
            vec!["Total Touchdowns", "tds", "total_touchdowns"],
            vec!["qb hits", "unknown metric", "Unknown Metric"],
            vec!["  ", "games started", "gamesStarted"],
            vec![],
        ];
        for input in inputs {
            let once = canonicalize(&input);
            assert_eq!(canonicalize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn total_touchdowns_sums_present_components() {
        let stats = line(&[("passing_touchdowns", 30.0), ("rushing_touchdowns", 4.0)]);
        assert_eq!(metric_value(&stats, "total_touchdowns"), Some(34.0));
    }

    #[test]
    fn derived_metric_missing_without_inputs() {
        let stats = line(&[("sacks", 12.0)]);
        assert_eq!(metric_value(&stats, "total_touchdowns"), None);
        assert_eq!(metric_value(&stats, "total_offensive_yards"), None);

        let stored = line(&[("total_touchdowns", 7.0)]);
        assert_eq!(metric_value(&stored, "total_touchdowns"), Some(7.0));
    }

    #[test]
    fn per_game_requires_games_played() {
        let stats = line(&[("passing_yards", 4000.0), ("games_played", 16.0)]);
        assert_relative_eq!(metric_value(&stats, "passing_yards_per_game").unwrap(), 250.0);

        let zero = line(&[("passing_yards", 4000.0), ("games_played", 0.0)]);
        assert_eq!(metric_value(&zero, "passing_yards_per_game"), None);
    }

    #[test]
    fn extract_keeps_everything_without_request() {
        let stats = line(&[("sacks", 12.0), ("tackles", 60.0)]);
        assert_eq!(extract(&stats, &[]), stats);

        let only = extract(&stats, &["sacks".to_string(), "interceptions".to_string()]);
        assert_eq!(only, line(&[("sacks", 12.0)]));
    }

    #[test]
    fn question_lookup_prefers_earliest_then_longest() {
        assert_eq!(metric_in_question("who leads the nfl in passing touchdowns"), Some("passing_touchdowns"));
        assert_eq!(metric_in_question("most sacks and tackles"), Some("sacks"));
        assert_eq!(metric_in_question("passing yards per game leaders"), Some("passing_yards_per_game"));
        assert_eq!(metric_in_question("who is the best"), None);
    }

    #[test]
    fn game_lookup_falls_back_to_generic_words() {
        assert_eq!(game_metric_in_question("his best games by yards"), Some("passing_yards"));
        assert_eq!(game_metric_in_question("worst rating this season"), Some("passer_rating"));
        assert_eq!(game_metric_in_question("best games"), None);
    }
}
