use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Canonical metric identifiers and the lower-case, space-separated phrases
/// users write for them.
///
/// Camel-case spellings (`passingYards`) and the canonical identifiers
/// themselves are covered by key normalization, see [`lookup_key`].
pub(crate) const METRICS: &[(&str, &[&str])] = &[
    ("passing_yards", &["passing yards", "pass yards", "passing yds"]),
    ("passing_touchdowns", &["passing touchdowns", "passing tds", "touchdown passes"]),
    ("rushing_yards", &["rushing yards", "rush yards"]),
    ("rushing_touchdowns", &["rushing touchdowns", "rushing tds"]),
    ("receiving_yards", &["receiving yards"]),
    ("receiving_touchdowns", &["receiving touchdowns", "receiving tds"]),
    ("receptions", &["receptions", "catches"]),
    ("completions", &["completions"]),
    ("total_touchdowns", &["touchdowns", "total touchdowns", "tds"]),
    ("total_offensive_yards", &["offensive yards", "total offensive yards", "total yards"]),
    ("passing_yards_per_game", &["passing yards per game", "yards per game"]),
    ("passer_rating", &["passer rating", "qb rating", "quarterback rating"]),
    ("sacks", &["sacks"]),
    ("tackles", &["tackles"]),
    ("qb_hits", &["qb hits", "quarterback hits"]),
    ("interceptions", &["interceptions", "ints", "picks"]),
    ("forced_fumbles", &["forced fumbles"]),
    ("field_goals_made", &["field goals made", "field goals"]),
    ("field_goals_attempted", &["field goals attempted"]),
    ("extra_points_made", &["extra points made", "extra points"]),
    ("games_played", &["games played"]),
    ("games_started", &["games started"]),
];

/// Generic words that name a per-game sort metric when nothing more specific
/// was found.
pub(crate) const GAME_METRIC_FALLBACKS: &[(&str, &str)] =
    &[("yards", "passing_yards"), ("touchdown", "passing_touchdowns"), ("rating", "passer_rating")];

/// Normalize a metric spelling into a lookup key: lower-case, alphanumerics only.
///
/// `"Passing Yards"`, `"passingYards"` and `"passing_yards"` all share the key
/// `"passingyards"`.
pub(crate) fn lookup_key(name: &str) -> String {
    name.chars().filter(|c| c.is_alphanumeric()).flat_map(char::to_lowercase).collect()
}

/// Key → canonical identifier. Every canonical identifier maps to itself.
pub(crate) static BY_KEY: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for (canonical, phrases) in METRICS {
        map.insert(lookup_key(canonical), *canonical);
        for phrase in *phrases {
            map.insert(lookup_key(phrase), *canonical);
        }
    }
    map
});

/// (phrase, canonical) pairs for scanning free text, longest phrase first.
pub(crate) static QUESTION_PHRASES: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    let mut phrases: Vec<(&'static str, &'static str)> =
        METRICS.iter().flat_map(|(canonical, phrases)| phrases.iter().map(move |p| (*p, *canonical))).collect();
    phrases.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    phrases
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_map_to_themselves() {
        for (canonical, _) in METRICS {
            assert_eq!(BY_KEY.get(&lookup_key(canonical)), Some(canonical));
        }
    }

    #[test]
    fn phrase_keys_do_not_collide_across_metrics() {
        let mut seen: HashMap<String, &str> = HashMap::new();
        for (canonical, phrases) in METRICS {
            for key in std::iter::once(lookup_key(canonical)).chain(phrases.iter().map(|p| lookup_key(p))) {
                if let Some(prev) = seen.insert(key.clone(), canonical) {
                    assert_eq!(prev, *canonical, "key {key} claimed by {prev} and {canonical}");
                }
            }
        }
    }
}
