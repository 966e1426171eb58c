use super::{ErrorMap, QueryExecutor, metrics_or_all, no_data, record, split_results};
use crate::error::{ErrorRecord, FetchError, QueryError};
use crate::normalize::metric_value;
use crate::plan::{AggregationType, QueryPlan};
use crate::result::{
    AggregateResult, LeaderRow, LeaderboardResult, MetricAggregate, Payload, PlayerRankResult, ResultRecord,
    ThresholdResult,
};
use crate::source::{LeagueLeaders, StatLine};
use futures::future::join_all;

impl QueryExecutor<'_> {
    async fn leaderboard(&self, plan: &QueryPlan, metric: &str, limit: usize) -> Result<LeagueLeaders, FetchError> {
        let fetch = self.source.fetch_league_leaders(&plan.filters.sport, metric, &plan.filters, limit);
        self.guarded(metric, fetch).await
    }

    /// Leaderboards for several metrics at once, keyed by metric in input order.
    async fn leaderboards(&self, plan: &QueryPlan, metrics: &[String]) -> (Vec<(String, LeagueLeaders)>, ErrorMap) {
        let limit = self.options.ranking_pool_size;
        let fetches = metrics.iter().map(|metric| async move {
            (metric.clone(), self.leaderboard(plan, metric, limit).await)
        });
        split_results(join_all(fetches).await)
    }

    /// Requested metrics, falling back to the one named in the question.
    fn metrics_or_question(&self, plan: &QueryPlan) -> Result<Vec<String>, ErrorRecord> {
        if plan.metrics.is_empty() {
            return self.single_metric(plan).map(|metric| vec![metric]);
        }
        Ok(plan.metrics.clone())
    }

    pub(super) async fn league_leaders(&self, plan: &QueryPlan) -> Result<ResultRecord, ErrorRecord> {
        let metric = self.single_metric(plan)?;
        let limit = plan.filters.limit.unwrap_or(self.options.leaderboard_limit);
        let board = self.leaderboard(plan, &metric, limit).await.map_err(|err| {
            tracing::warn!(metric = %metric, error = %err, "leaderboard fetch failed");
            ErrorRecord::new(plan.query_type, QueryError::Leaderboard(err)).with_attempted(vec![metric.clone()])
        })?;

        let leaders = leader_rows(&board);
        let top_above_average_pct = match (leaders.first(), board.league_average) {
            (Some(top), Some(avg)) if avg > 0.0 => Some((top.value - avg) / avg * 100.0),
            _ => None,
        };
        let subjects = leaders.iter().map(|row| row.entity.clone()).collect();
        let result = LeaderboardResult {
            sport: plan.filters.sport.clone(),
            metric,
            leaders,
            league_average: board.league_average,
            total_entities: board.total_entities,
            top_above_average_pct,
        };
        Ok(record(plan, subjects, Payload::Leaders(result), ErrorMap::new()))
    }

    /// Where the subject stands league-wide in each metric.
    pub(super) async fn player_ranking(&self, plan: &QueryPlan) -> Result<ResultRecord, ErrorRecord> {
        let entity = self.subject(plan)?.to_string();
        let metrics = self.metrics_or_question(plan)?;

        let (mut fetched, mut errors) = self.fetch_entities(std::slice::from_ref(&entity), &plan.filters).await;
        let Some((entity, stats)) = fetched.pop() else {
            return Err(no_data(plan, errors, vec![entity]));
        };

        let mut valued = Vec::new();
        let mut missing = Vec::new();
        for metric in &metrics {
            match metric_value(&stats, metric) {
                Some(value) => valued.push((metric.clone(), value)),
                None => missing.push(metric.as_str()),
            }
        }
        if !missing.is_empty() {
            errors.insert(entity.clone(), format!("no value for {}", missing.join(", ")));
        }

        let names: Vec<String> = valued.iter().map(|(metric, _)| metric.clone()).collect();
        let (boards, board_errors) = self.leaderboards(plan, &names).await;
        errors.extend(board_errors);

        let ranks: Vec<PlayerRankResult> = boards
            .iter()
            .filter_map(|(metric, board)| {
                let value = valued.iter().find(|(m, _)| m == metric).map(|(_, v)| *v)?;
                Some(PlayerRankResult {
                    metric: metric.clone(),
                    value,
                    rank: place(&entity, value, board),
                    total_entities: board.total_entities,
                    league_average: board.league_average,
                })
            })
            .collect();

        if ranks.is_empty() {
            return Err(no_data(plan, errors, vec![entity]));
        }
        tracing::debug!(entity = %entity, ranked = ranks.len(), "player ranked");
        Ok(record(plan, vec![entity.clone()], Payload::Ranking { entity, ranks }, errors))
    }

    /// Sums or averages across the named entities, or league-wide when none
    /// are named.
    pub(super) async fn aggregate(&self, plan: &QueryPlan) -> Result<ResultRecord, ErrorRecord> {
        let aggregation = plan.aggregation.unwrap_or(AggregationType::Sum);
        let entities =
            if plan.primary_entities.is_empty() { &plan.secondary_entities } else { &plan.primary_entities };

        if entities.is_empty() {
            return self.league_aggregate(plan, aggregation).await;
        }

        let (fetched, errors) = self.fetch_entities(entities, &plan.filters).await;
        if fetched.is_empty() {
            return Err(no_data(plan, errors, entities.to_vec()));
        }

        let metrics = metrics_or_all(plan, fetched.iter().map(|(_, line)| line));
        let lines: Vec<&StatLine> = fetched.iter().map(|(_, line)| line).collect();
        let aggregates: Vec<MetricAggregate> =
            metrics.iter().filter_map(|metric| summarize(metric, &lines, aggregation)).collect();
        if aggregates.is_empty() {
            return Err(no_data(plan, errors, entities.to_vec()));
        }

        let subjects = fetched.into_iter().map(|(name, _)| name).collect();
        let result = AggregateResult { aggregation, league_wide: false, metrics: aggregates };
        Ok(record(plan, subjects, Payload::Aggregate(result), errors))
    }

    async fn league_aggregate(
        &self,
        plan: &QueryPlan,
        aggregation: AggregationType,
    ) -> Result<ResultRecord, ErrorRecord> {
        let metrics = self.metrics_or_question(plan)?;
        let (boards, mut errors) = self.leaderboards(plan, &metrics).await;

        let mut aggregates = Vec::with_capacity(boards.len());
        for (metric, board) in boards {
            let Some(average) = board.league_average else {
                errors.insert(metric, "source reported no league average".to_string());
                continue;
            };
            let sum = average * board.total_entities as f64;
            aggregates.push(MetricAggregate {
                value: if aggregation == AggregationType::Average { average } else { sum },
                sum,
                average,
                max: board.leaders.first().map(|entry| entry.value),
                min: board.is_complete().then(|| board.leaders.last().map(|entry| entry.value)).flatten(),
                count: board.total_entities,
                metric,
            });
        }

        if aggregates.is_empty() {
            return Err(no_data(plan, errors, metrics));
        }
        let result = AggregateResult { aggregation, league_wide: true, metrics: aggregates };
        Ok(record(plan, Vec::new(), Payload::Aggregate(result), errors))
    }

    /// Entities on the leaderboard whose value satisfies the question's comparator.
    pub(super) async fn threshold(&self, plan: &QueryPlan) -> Result<ResultRecord, ErrorRecord> {
        let metric = self.single_metric(plan)?;
        let Some(threshold) = plan.filters.context.threshold else {
            let error = QueryError::NoThreshold { question: plan.question.clone() };
            return Err(ErrorRecord::new(plan.query_type, error));
        };

        let board = self.leaderboard(plan, &metric, self.options.ranking_pool_size).await.map_err(|err| {
            ErrorRecord::new(plan.query_type, QueryError::Leaderboard(err)).with_attempted(vec![metric.clone()])
        })?;

        let matches: Vec<LeaderRow> = leader_rows(&board)
            .into_iter()
            .filter(|row| threshold.comparator.holds(row.value, threshold.value))
            .collect();
        tracing::debug!(metric = %metric, matched = matches.len(), complete = board.is_complete(), "threshold applied");

        let subjects = matches.iter().map(|row| row.entity.clone()).collect();
        let result = ThresholdResult {
            metric,
            comparator: threshold.comparator,
            threshold: threshold.value,
            matches,
            complete: board.is_complete(),
            total_entities: board.total_entities,
        };
        Ok(record(plan, subjects, Payload::Threshold(result), ErrorMap::new()))
    }
}

fn leader_rows(board: &LeagueLeaders) -> Vec<LeaderRow> {
    board
        .leaders
        .iter()
        .enumerate()
        .map(|(i, entry)| LeaderRow { rank: i + 1, entity: entry.entity.clone(), team: entry.team.clone(), value: entry.value })
        .collect()
}

/// Rank of `entity` on `board`: its listed position, else one past every
/// strictly greater value when the board is deep enough to tell.
fn place(entity: &str, value: f64, board: &LeagueLeaders) -> Option<usize> {
    if let Some(pos) = board.leaders.iter().position(|entry| entry.entity.eq_ignore_ascii_case(entity)) {
        return Some(pos + 1);
    }
    let covered = board.is_complete() || board.leaders.last().is_some_and(|last| value >= last.value);
    covered.then(|| 1 + board.leaders.iter().filter(|entry| entry.value > value).count())
}

fn summarize(metric: &str, lines: &[&StatLine], aggregation: AggregationType) -> Option<MetricAggregate> {
    let values: Vec<f64> = lines.iter().filter_map(|line| metric_value(line, metric)).collect();
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().sum();
    let average = sum / values.len() as f64;
    Some(MetricAggregate {
        metric: metric.to_string(),
        value: if aggregation == AggregationType::Average { average } else { sum },
        sum,
        average,
        min: values.iter().copied().reduce(f64::min),
        max: values.iter().copied().reduce(f64::max),
        count: values.len(),
    })
}

#[cfg(test)]
mod tests {
    use crate::api::Options;
    use crate::error::{FetchError, QueryError};
    use crate::executor::QueryExecutor;
    use crate::plan::{AggregationType, Comparator, QueryPlan, QueryType, Threshold};
    use crate::result::Payload;
    use crate::source::MemorySource;
    use approx::assert_relative_eq;

    fn source() -> MemorySource {
        MemorySource::new()
            .with_player("A", 2024, &[("sacks", 4.0), ("tackles", 80.0)])
            .with_player("B", 2024, &[("sacks", 16.0), ("tackles", 60.0)])
            .with_player("C", 2024, &[("sacks", 12.0), ("tackles", 90.0)])
            .with_player("D", 2024, &[("sacks", 8.0), ("tackles", 70.0)])
            .with_roster("B", "Steelers", "LB")
    }

    fn plan(query_type: QueryType, metrics: &[&str]) -> QueryPlan {
        let mut plan = QueryPlan::new(query_type, "nfl");
        plan.metrics = metrics.iter().map(|m| m.to_string()).collect();
        plan
    }

    #[tokio::test]
    async fn leaders_honor_limit_and_report_average_gap() {
        let source = source();
        let opts = Options::default();
        let mut plan = plan(QueryType::LeagueLeaders, &["sacks"]);
        plan.filters.limit = Some(2);

        let record = QueryExecutor::new(&source, &opts).execute(&plan).await.unwrap();
        let Payload::Leaders(board) = &record.payload else { panic!("unexpected payload: {:?}", record.payload) };
        let rows: Vec<(usize, &str)> = board.leaders.iter().map(|r| (r.rank, r.entity.as_str())).collect();
        assert_eq!(rows, vec![(1, "B"), (2, "C")]);
        assert_eq!(board.leaders[0].team.as_deref(), Some("Steelers"));
        assert_eq!(board.total_entities, 4);
        // average 10, top 16
        assert_relative_eq!(board.top_above_average_pct.unwrap(), 60.0);
        assert_eq!(record.subjects, vec!["B", "C"]);
    }

    #[tokio::test]
    async fn leaders_take_metric_from_question() {
        let source = source();
        let opts = Options::default();
        let mut plan = plan(QueryType::LeagueLeaders, &[]);
        plan.question = "Who leads the league in tackles?".into();

        let record = QueryExecutor::new(&source, &opts).execute(&plan).await.unwrap();
        let Payload::Leaders(board) = &record.payload else { panic!("unexpected payload: {:?}", record.payload) };
        assert_eq!(board.metric, "tackles");
        assert_eq!(board.leaders[0].entity, "C");
    }

    #[tokio::test]
    async fn leaders_without_metric_fail() {
        let source = source();
        let opts = Options::default();
        let mut plan = plan(QueryType::LeagueLeaders, &[]);
        plan.question = "Who is the best?".into();

        let err = QueryExecutor::new(&source, &opts).execute(&plan).await.unwrap_err();
        assert_eq!(err.error, QueryError::NoMetric { question: "Who is the best?".into() });
    }

    #[tokio::test]
    async fn leaderboard_failure_is_wrapped() {
        let source = source();
        let opts = Options::default();
        let err = QueryExecutor::new(&source, &opts)
            .execute(&plan(QueryType::LeagueLeaders, &["punts"]))
            .await
            .unwrap_err();
        assert_eq!(err.error, QueryError::Leaderboard(FetchError::Unsupported { metric: "punts".into() }));
    }

    #[tokio::test]
    async fn player_rank_counts_strictly_better_entities() {
        let source = source();
        let opts = Options::default();
        let mut plan = plan(QueryType::PlayerRanking, &["sacks", "tackles"]);
        plan.primary_entities = vec!["D".into()];

        let record = QueryExecutor::new(&source, &opts).execute(&plan).await.unwrap();
        let Payload::Ranking { entity, ranks } = &record.payload else {
            panic!("unexpected payload: {:?}", record.payload)
        };
        assert_eq!(entity, "D");
        let placed: Vec<(&str, Option<usize>)> = ranks.iter().map(|r| (r.metric.as_str(), r.rank)).collect();
        assert_eq!(placed, vec![("sacks", Some(3)), ("tackles", Some(3))]);
        assert_eq!(ranks[0].total_entities, 4);
    }

    #[tokio::test]
    async fn missing_metric_is_reported_under_the_entity() {
        let source = source();
        let opts = Options::default();
        let mut plan = plan(QueryType::PlayerRanking, &["sacks", "interceptions", "punts"]);
        plan.primary_entities = vec!["D".into()];

        let record = QueryExecutor::new(&source, &opts).execute(&plan).await.unwrap();
        let Payload::Ranking { ranks, .. } = &record.payload else { panic!("unexpected payload: {:?}", record.payload) };
        assert_eq!(ranks.len(), 1);
        assert_eq!(ranks[0].metric, "sacks");
        assert_eq!(record.errors.len(), 1);
        assert_eq!(record.errors.get("D").map(String::as_str), Some("no value for interceptions, punts"));
    }

    #[tokio::test]
    async fn shallow_pool_leaves_rank_unknown() {
        let source = source();
        let opts = Options { ranking_pool_size: 1, ..Options::default() };
        let mut plan = plan(QueryType::PlayerRanking, &["sacks"]);
        plan.primary_entities = vec!["A".into()];

        let record = QueryExecutor::new(&source, &opts).execute(&plan).await.unwrap();
        let Payload::Ranking { ranks, .. } = &record.payload else { panic!("unexpected payload: {:?}", record.payload) };
        assert_eq!(ranks[0].rank, None);
        assert_relative_eq!(ranks[0].value, 4.0);
    }

    #[tokio::test]
    async fn unranked_subject_is_no_data() {
        let source = source();
        let opts = Options::default();
        let mut plan = plan(QueryType::PlayerRanking, &["sacks"]);
        plan.primary_entities = vec!["Nobody".into()];

        let err = QueryExecutor::new(&source, &opts).execute(&plan).await.unwrap_err();
        assert_eq!(err.error, QueryError::NoData);
        assert_eq!(err.errors.get("Nobody").map(String::as_str), Some("no data found for Nobody"));
    }

    #[tokio::test]
    async fn aggregate_over_named_players() {
        let source = source();
        let opts = Options::default();
        let mut plan = plan(QueryType::AggregateStat, &["sacks"]);
        plan.primary_entities = vec!["A".into(), "B".into(), "C".into()];
        plan.aggregation = Some(AggregationType::Average);

        let record = QueryExecutor::new(&source, &opts).execute(&plan).await.unwrap();
        let Payload::Aggregate(agg) = &record.payload else { panic!("unexpected payload: {:?}", record.payload) };
        assert!(!agg.league_wide);
        let sacks = &agg.metrics[0];
        assert_relative_eq!(sacks.sum, 32.0);
        assert_relative_eq!(sacks.value, 32.0 / 3.0);
        assert_eq!((sacks.min, sacks.max, sacks.count), (Some(4.0), Some(16.0), 3));
    }

    #[tokio::test]
    async fn aggregate_without_entities_is_league_wide() {
        let source = source();
        let opts = Options::default();
        let mut plan = plan(QueryType::AggregateStat, &["sacks"]);
        plan.aggregation = Some(AggregationType::Sum);

        let record = QueryExecutor::new(&source, &opts).execute(&plan).await.unwrap();
        let Payload::Aggregate(agg) = &record.payload else { panic!("unexpected payload: {:?}", record.payload) };
        assert!(agg.league_wide);
        let sacks = &agg.metrics[0];
        assert_relative_eq!(sacks.value, 40.0);
        assert_relative_eq!(sacks.average, 10.0);
        assert_eq!((sacks.max, sacks.min), (Some(16.0), Some(4.0)));
    }

    #[tokio::test]
    async fn threshold_keeps_leaderboard_ranks() {
        let source = source();
        let opts = Options::default();
        let mut plan = plan(QueryType::ThresholdQuery, &["sacks"]);
        plan.filters.context.threshold = Some(Threshold { comparator: Comparator::Ge, value: 8.0 });

        let record = QueryExecutor::new(&source, &opts).execute(&plan).await.unwrap();
        let Payload::Threshold(result) = &record.payload else { panic!("unexpected payload: {:?}", record.payload) };
        let rows: Vec<(usize, &str)> = result.matches.iter().map(|r| (r.rank, r.entity.as_str())).collect();
        assert_eq!(rows, vec![(1, "B"), (2, "C"), (3, "D")]);
        assert!(result.complete);
    }

    #[tokio::test]
    async fn threshold_needs_a_value() {
        let source = source();
        let opts = Options::default();
        let mut plan = plan(QueryType::ThresholdQuery, &["sacks"]);
        plan.question = "Who has more than a few sacks?".into();

        let err = QueryExecutor::new(&source, &opts).execute(&plan).await.unwrap_err();
        assert!(matches!(err.error, QueryError::NoThreshold { .. }));
    }
}
