//! Trigger scanning (question pre-classification).
//!
//! This module inspects the question text, plus the hints carried on the
//! [`QueryDescription`], and produces coarse cues that let the classifier skip
//! rules that cannot match.
//!
//! The scan produces:
//!
//! - **Cues** (`CueMask`): cheap booleans such as "mentions a week number" or
//!   "contains a leaderboard keyword". Each rule declares the cues it needs.
//! - **Phrases** (`TriggerInfo::phrases`): every keyword that matched, for the
//!   debug report.
//! - **Teams**: known team names found in the question, in mention order.
//!
//! ## Design notes
//!
//! - This is a *heuristic* scan. A cue firing only makes a rule eligible; the
//!   rule's production can still decline.
//! - Lowercasing is ASCII-only because every keyword list is English.

use super::extract;
use crate::description::QueryDescription;
use crate::rules::keywords;
use std::collections::BTreeSet;

bitflags::bitflags! {
    /// Coarse cues detected in a question.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CueMask: u32 {
        /// `strategy == "leaderboard_query"` on the description.
        const OVERRIDE         = 1 << 0;
        /// A comparison target or output expectation hint on the description.
        const COMPARISON_HINT  = 1 << 1;
        const WEEK_NUMBER      = 1 << 2;
        /// "vs", "against", or a team other than the subject.
        const OPPONENT         = 1 << 3;
        const GAME_SPECIFIC    = 1 << 4;
        const CONTEXTUAL       = 1 << 5;
        const GAME_COMPARISON  = 1 << 6;
        const LEADERBOARD      = 1 << 7;
        const COMPARISON       = 1 << 8;
        const VERSUS           = 1 << 9;
        const RANKING          = 1 << 10;
        const AGGREGATE        = 1 << 11;
        const THRESHOLD        = 1 << 12;
        /// "league" or the sport's own name.
        const LEAGUE           = 1 << 13;
        const TEAM_MENTION     = 1 << 14;
    }
}

/// Question characteristics detected before rule evaluation.
#[derive(Debug, Clone, Default)]
pub(crate) struct TriggerInfo {
    pub cues: CueMask,
    pub phrases: BTreeSet<&'static str>,
    /// Teams named in the question, in mention order.
    pub teams: Vec<String>,
    /// First integer following "week".
    pub week: Option<u32>,
}

impl TriggerInfo {
    /// Scan the description's question (already lower-cased as `lower`).
    pub fn scan(description: &QueryDescription, lower: &str) -> Self {
        let mut info = TriggerInfo::default();

        if description.is_leaderboard_override() {
            info.cues |= CueMask::OVERRIDE;
        }
        if description.hints_comparison() {
            info.cues |= CueMask::COMPARISON_HINT;
        }

        const LISTS: &[(CueMask, &[&str])] = &[
            (CueMask::GAME_SPECIFIC, keywords::GAME_SPECIFIC),
            (CueMask::CONTEXTUAL, keywords::CONTEXTUAL),
            (CueMask::GAME_COMPARISON, keywords::GAME_COMPARISON),
            (CueMask::LEADERBOARD, keywords::LEADERBOARD),
            (CueMask::COMPARISON, keywords::COMPARISON),
            (CueMask::VERSUS, keywords::VERSUS),
            (CueMask::RANKING, keywords::RANKING),
            (CueMask::AGGREGATE, keywords::AGGREGATE),
            (CueMask::THRESHOLD, keywords::THRESHOLD),
        ];
        for (cue, list) in LISTS {
            for phrase in *list {
                if keywords::matches(lower, phrase) {
                    info.cues |= *cue;
                    info.phrases.insert(*phrase);
                }
            }
        }

        let sport = description.sport.to_ascii_lowercase();
        if keywords::matches(lower, "league") || (!sport.is_empty() && keywords::matches(lower, &sport)) {
            info.cues |= CueMask::LEAGUE;
        }

        info.week = extract::week(lower);
        if info.week.is_some() {
            info.cues |= CueMask::WEEK_NUMBER;
        }

        info.teams = extract::detect_teams(lower, &description.teams);
        if !info.teams.is_empty() {
            info.cues |= CueMask::TEAM_MENTION;
        }

        let subject = extract::subject_team(description);
        let names_opponent = info.teams.iter().any(|team| subject.is_none_or(|s| !s.eq_ignore_ascii_case(team)));
        if info.cues.contains(CueMask::VERSUS) || names_opponent {
            info.cues |= CueMask::OPPONENT;
        }

        // A week number only makes a game question when something names the opponent.
        if info.cues.contains(CueMask::WEEK_NUMBER | CueMask::OPPONENT) {
            info.cues |= CueMask::GAME_SPECIFIC;
        }

        info
    }

    /// Whether a rule declaring `cues` may run. An empty declaration always may.
    pub fn admits(&self, cues: u32) -> bool {
        cues == 0 || self.cues.bits() & cues != 0
    }
}
