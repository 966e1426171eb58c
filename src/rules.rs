//! Immutable lookup tables shared by the classifier and the metric normalizer.

pub(crate) mod keywords;
pub(crate) mod metric_names;
pub(crate) mod teams;
