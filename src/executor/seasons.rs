use super::{QueryExecutor, metrics_or_all, no_data, record, split_results};
use crate::error::{ErrorRecord, QueryError};
use crate::normalize::{self, metric_value};
use crate::plan::{QueryPlan, QueryType};
use crate::ranking;
use crate::result::{
    MetricTrend, Payload, ProgressionStep, ResultRecord, SeasonComparison, SeasonMetricSummary, TrendDirection,
};
use crate::source::StatLine;
use futures::future::join_all;
use std::collections::BTreeMap;

impl QueryExecutor<'_> {
    /// One entity across seasons: best/worst per metric, first-to-last trend,
    /// and for three or more seasons the season-by-season progression plus an
    /// overall season ranking.
    pub(super) async fn season_comparison(&self, plan: &QueryPlan) -> Result<ResultRecord, ErrorRecord> {
        let entity = self.subject(plan)?.to_string();
        let requested = &plan.filters.seasons;
        if requested.len() < 2 {
            let error = QueryError::InsufficientEntities { required: 2, found: requested.len() };
            return Err(ErrorRecord::new(plan.query_type, error).with_attempted(vec![entity]));
        }

        let fetches = requested.iter().map(|&season| {
            let filters = plan.filters.for_season(season);
            let entity = entity.as_str();
            async move {
                let result = self.guarded(entity, self.source.fetch_entity_stats(entity, &filters)).await;
                (season, result)
            }
        });
        let (mut fetched, errors) = split_results(join_all(fetches).await);
        if fetched.is_empty() {
            let attempted = requested.iter().map(i32::to_string).collect();
            return Err(no_data(plan, errors, attempted));
        }
        fetched.sort_by_key(|(season, _)| *season);

        let metrics = metrics_or_all(plan, fetched.iter().map(|(_, line)| line));
        let multi = plan.query_type == QueryType::MultiSeasonComparison;
        let by_metric: Vec<SeasonMetricSummary> =
            metrics.iter().filter_map(|metric| summarize(&fetched, metric, multi)).collect();

        let comparison = multi.then(|| {
            let labelled: Vec<(String, StatLine)> =
                fetched.iter().map(|(season, line)| (season.to_string(), line.clone())).collect();
            ranking::compare(&labelled, &metrics)
        });

        let result = SeasonComparison {
            entity: entity.clone(),
            seasons: fetched.iter().map(|(season, _)| *season).collect(),
            stats: fetched.into_iter().map(|(season, line)| (season, normalize::extract(&line, &plan.metrics))).collect(),
            by_metric,
            comparison,
        };
        Ok(record(plan, vec![entity], Payload::Seasons(result), errors))
    }
}

/// Summary of one metric over chronologically sorted season lines.
fn summarize(lines: &[(i32, StatLine)], metric: &str, progression: bool) -> Option<SeasonMetricSummary> {
    let values: Vec<(i32, f64)> =
        lines.iter().filter_map(|(season, line)| metric_value(line, metric).map(|v| (*season, v))).collect();

    let labels: Vec<(String, f64)> = values.iter().map(|(season, v)| (season.to_string(), *v)).collect();
    let ranked = ranking::rank_descending(labels.iter().map(|(label, v)| (label.as_str(), *v)));
    let (best, worst) = (ranked.first()?, ranked.last()?);
    let best_season: i32 = best.entity.parse().ok()?;
    let worst_season: i32 = worst.entity.parse().ok()?;

    let trend = match (values.first(), values.last()) {
        (Some(&(from_season, first)), Some(&(to_season, last))) if values.len() >= 2 => {
            let change = last - first;
            Some(MetricTrend {
                from_season,
                to_season,
                change,
                percentage_change: (first != 0.0).then(|| change / first * 100.0),
                direction: TrendDirection::of(change),
            })
        }
        _ => None,
    };

    let steps = if progression {
        values
            .windows(2)
            .map(|pair| {
                let change = pair[1].1 - pair[0].1;
                ProgressionStep {
                    from_season: pair[0].0,
                    to_season: pair[1].0,
                    change,
                    trend: TrendDirection::of(change),
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    Some(SeasonMetricSummary {
        metric: metric.to_string(),
        best_season,
        best_value: best.value,
        worst_season,
        worst_value: worst.value,
        improvement: best.value - worst.value,
        all_values: values.iter().copied().collect::<BTreeMap<_, _>>(),
        trend,
        progression: steps,
    })
}

#[cfg(test)]
mod tests {
    use crate::api::Options;
    use crate::executor::QueryExecutor;
    use crate::plan::{QueryPlan, QueryType};
    use crate::result::{Payload, TrendDirection};
    use crate::source::MemorySource;
    use approx::assert_relative_eq;

    fn plan(query_type: QueryType, seasons: &[i32]) -> QueryPlan {
        let mut plan = QueryPlan::new(query_type, "nfl");
        plan.primary_entities = vec!["Micah Parsons".into()];
        plan.metrics = vec!["sacks".into()];
        plan.filters.seasons = seasons.to_vec();
        plan
    }

    fn source() -> MemorySource {
        MemorySource::new()
            .with_player("Micah Parsons", 2022, &[("sacks", 10.0)])
            .with_player("Micah Parsons", 2023, &[("sacks", 15.0)])
            .with_player("Micah Parsons", 2024, &[("sacks", 12.0)])
    }

    #[tokio::test]
    async fn progression_signs_follow_changes() {
        let source = source();
        let opts = Options::default();
        // Out-of-order seasons still progress chronologically.
        let record = QueryExecutor::new(&source, &opts)
            .execute(&plan(QueryType::MultiSeasonComparison, &[2024, 2022, 2023]))
            .await
            .unwrap();

        let Payload::Seasons(seasons) = &record.payload else { panic!("unexpected payload: {:?}", record.payload) };
        assert_eq!(seasons.seasons, vec![2022, 2023, 2024]);

        let sacks = seasons.metric("sacks").unwrap();
        let steps: Vec<(i32, i32, f64, TrendDirection)> =
            sacks.progression.iter().map(|s| (s.from_season, s.to_season, s.change, s.trend)).collect();
        assert_eq!(
            steps,
            vec![(2022, 2023, 5.0, TrendDirection::Improved), (2023, 2024, -3.0, TrendDirection::Declined)]
        );
        assert_eq!((sacks.best_season, sacks.worst_season), (2023, 2022));
        assert_relative_eq!(sacks.improvement, 5.0);

        let overall = seasons.overall().unwrap();
        assert_eq!(overall[0].entity, "2023");
    }

    #[tokio::test]
    async fn two_seasons_report_trend_without_progression() {
        let source = source();
        let opts = Options::default();
        let record = QueryExecutor::new(&source, &opts)
            .execute(&plan(QueryType::SeasonComparison, &[2022, 2024]))
            .await
            .unwrap();

        let Payload::Seasons(seasons) = &record.payload else { panic!("unexpected payload: {:?}", record.payload) };
        let sacks = seasons.metric("sacks").unwrap();
        let trend = sacks.trend.as_ref().unwrap();
        assert_eq!(trend.direction, TrendDirection::Improved);
        assert_relative_eq!(trend.change, 2.0);
        assert_relative_eq!(trend.percentage_change.unwrap(), 20.0);
        assert!(sacks.progression.is_empty());
        assert!(seasons.comparison.is_none());
    }

    #[tokio::test]
    async fn missing_season_is_a_partial_failure() {
        let source = source();
        let opts = Options::default();
        let record = QueryExecutor::new(&source, &opts)
            .execute(&plan(QueryType::MultiSeasonComparison, &[2021, 2022, 2023]))
            .await
            .unwrap();

        assert!(record.errors.contains_key("2021"));
        let Payload::Seasons(seasons) = &record.payload else { panic!("unexpected payload: {:?}", record.payload) };
        assert_eq!(seasons.seasons, vec![2022, 2023]);
    }

    #[tokio::test]
    async fn zero_first_value_has_no_percentage() {
        let source = MemorySource::new()
            .with_player("Rookie", 2023, &[("sacks", 0.0)])
            .with_player("Rookie", 2024, &[("sacks", 6.0)]);
        let opts = Options::default();
        let mut plan = plan(QueryType::SeasonComparison, &[2023, 2024]);
        plan.primary_entities = vec!["Rookie".into()];

        let record = QueryExecutor::new(&source, &opts).execute(&plan).await.unwrap();
        let Payload::Seasons(seasons) = &record.payload else { panic!("unexpected payload: {:?}", record.payload) };
        assert_eq!(seasons.metric("sacks").unwrap().trend.as_ref().unwrap().percentage_change, None);
    }
}
