//! Classification trace.
//!
//! Returned by `classify_verbose_with`; the plain entry points drop it.

use super::trigger::CueMask;
use std::time::Duration;

/// What the classifier saw and which rule decided.
#[derive(Debug, Clone)]
pub struct ClassificationDetails {
    /// Name of the rule whose production accepted the question.
    pub matched_rule: &'static str,
    /// Cues raised by the trigger scan.
    pub cues: CueMask,
    /// Keywords that matched, sorted.
    pub phrases: Vec<&'static str>,
    /// Known teams found in the question, in mention order.
    pub teams_detected: Vec<String>,
    pub week: Option<u32>,
    /// Rules whose production ran, including the matching one.
    pub rules_evaluated: usize,
    /// Rules skipped because none of their cues fired.
    pub rules_skipped: usize,
    pub elapsed: Duration,
}
