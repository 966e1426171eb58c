//! Keyword lists behind the classifier cues.
//!
//! Single words match whole words of the question (surrounding punctuation
//! ignored). Entries containing a space match as substrings of the lower-cased
//! question.

pub(crate) const LEADERBOARD: &[&str] = &[
    "who has the most",
    "who leads",
    "who has most",
    "who had most",
    "most",
    "leads in",
    "leading in",
    "top",
    "best",
    "highest",
];

/// Comparison words that stay comparison cues even next to game context.
pub(crate) const COMPARISON: &[&str] =
    &["compare", "compared to", "comparison", "better than", "between", "who has more", "who had more"];

/// Comparison openers that also start a threshold question ("who has more than 10 sacks").
pub(crate) const WHO_HAS_MORE: &[&str] = &["who has more", "who had more"];

/// Comparison words that double as opponent cues in game questions.
pub(crate) const VERSUS: &[&str] = &["vs", "versus", "against"];

pub(crate) const RANKING: &[&str] =
    &["rank", "ranks", "ranked", "ranking", "position", "where does", "top", "best", "worst", "leaders"];

pub(crate) const AGGREGATE: &[&str] = &["total", "average", "mean", "sum", "combined", "league", "all teams"];

pub(crate) const AVERAGE: &[&str] = &["average", "mean", "per team", "per game"];

pub(crate) const THRESHOLD: &[&str] =
    &["more than", "less than", "fewer than", "at least", "at most", "over", "under", "above", "below"];

/// Game phrases that classify as game-specific on their own. A bare "week" is
/// not one of them; it needs a week number and an opponent cue.
pub(crate) const GAME_SPECIFIC: &[&str] =
    &["in week", "game against", "performance against", "in the game", "that game", "game stats", "game log"];

pub(crate) const CONTEXTUAL: &[&str] = &[
    "home",
    "away",
    "road",
    "at home",
    "on the road",
    "home games",
    "away games",
    "division",
    "division games",
    "conference",
    "conference games",
    "home vs away",
];

pub(crate) const HOME: &[&str] = &["home", "at home"];
pub(crate) const AWAY: &[&str] = &["away", "road", "on the road"];

pub(crate) const GAME_COMPARISON: &[&str] = &[
    "best game",
    "best games",
    "worst game",
    "worst games",
    "top games",
    "best performance",
    "best performances",
    "worst performance",
    "game by game",
];

pub(crate) const SORT_DESC: &[&str] = &["best", "highest", "most", "top"];
pub(crate) const SORT_ASC: &[&str] = &["worst", "lowest", "least", "fewest"];

/// Whole-word tokens of an already lower-cased question.
pub(crate) fn words(lower: &str) -> impl Iterator<Item = &str> {
    lower.split_whitespace().map(|w| w.trim_matches(|c: char| !c.is_alphanumeric())).filter(|w| !w.is_empty())
}

/// Whether `phrase` occurs in `lower` under the keyword matching rules.
pub(crate) fn matches(lower: &str, phrase: &str) -> bool {
    if phrase.contains(' ') { lower.contains(phrase) } else { words(lower).any(|w| w == phrase) }
}

pub(crate) fn any(lower: &str, list: &[&str]) -> bool {
    list.iter().any(|phrase| matches(lower, phrase))
}

/// Byte offset of the first occurrence of `needle` in `hay` that sits on word
/// boundaries at both ends.
pub(crate) fn find_word(hay: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    hay.match_indices(needle).map(|(idx, _)| idx).find(|&idx| {
        let before = hay[..idx].chars().next_back();
        let after = hay[idx + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_words_match_whole_words_only() {
        assert!(matches("who has the most sacks?", "most"));
        assert!(!matches("almost 10 sacks", "most"));
        assert!(matches("mahomes vs. allen", "vs"));
    }

    #[test]
    fn phrases_match_as_substrings() {
        assert!(matches("how did he do in week 5", "in week"));
        assert!(!matches("weekly totals", "in week"));
    }

    #[test]
    fn find_word_respects_boundaries() {
        assert_eq!(find_word("the bears and the bear", "bear"), Some(18));
        assert_eq!(find_word("ravens vs bills", "bills"), Some(10));
        assert_eq!(find_word("ravens", ""), None);
    }
}
