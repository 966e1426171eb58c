use super::{ErrorMap, QueryExecutor, metrics_or_all, no_data, record};
use crate::error::{ErrorRecord, QueryError};
use crate::normalize::{self, metric_value};
use crate::plan::{OpponentType, QueryPlan, SortOrder};
use crate::ranking;
use crate::result::{
    ContextBucket, ContextualBreakdown, GameRank, GameRankingResult, GameSummary, Payload, ResultRecord,
};
use crate::source::{GameOutcome, GameRecord, StatLine};

impl QueryExecutor<'_> {
    /// The subject and its game log, or a no-data record naming the failure.
    async fn game_log(&self, plan: &QueryPlan) -> Result<(String, Vec<GameRecord>), ErrorRecord> {
        let entity = self.subject(plan)?.to_string();
        match self.guarded(&entity, self.source.fetch_game_log(&entity, &plan.filters)).await {
            Ok(games) => Ok((entity, games)),
            Err(err) => {
                tracing::warn!(entity = %entity, error = %err, "game log fetch failed");
                let errors = ErrorMap::from([(entity.clone(), err.to_string())]);
                Err(no_data(plan, errors, vec![entity]))
            }
        }
    }

    /// Games matching the requested week and opponent.
    pub(super) async fn game_specific(&self, plan: &QueryPlan) -> Result<ResultRecord, ErrorRecord> {
        let (entity, log) = self.game_log(plan).await?;
        let context = &plan.filters.context;

        let games: Vec<GameSummary> = log
            .iter()
            .filter(|game| context.week.is_none_or(|week| game.week == Some(week)))
            .filter(|game| context.opponent.as_deref().is_none_or(|want| same_opponent(&game.opponent, want)))
            .map(|game| GameSummary::from_record(game, normalize::extract(&game.stats, &plan.metrics)))
            .collect();

        if games.is_empty() {
            return Err(ErrorRecord::new(plan.query_type, QueryError::NoMatchingGames).with_attempted(vec![entity]));
        }
        tracing::debug!(entity = %entity, matched = games.len(), scanned = log.len(), "games selected");
        Ok(record(plan, vec![entity.clone()], Payload::Games { entity, games }, ErrorMap::new()))
    }

    /// Per-context splits of the game log: every game, then home/away when a
    /// venue was asked about, then division or conference games.
    pub(super) async fn contextual(&self, plan: &QueryPlan) -> Result<ResultRecord, ErrorRecord> {
        let (entity, log) = self.game_log(plan).await?;
        if log.is_empty() {
            return Err(ErrorRecord::new(plan.query_type, QueryError::NoMatchingGames).with_attempted(vec![entity]));
        }

        let context = &plan.filters.context;
        let metrics = metrics_or_all(plan, log.iter().map(|game| &game.stats));
        let all: Vec<&GameRecord> = log.iter().collect();

        let mut buckets = vec![bucket("all_games", &all, &metrics)];
        if context.venue.is_some() {
            let (home, away): (Vec<&GameRecord>, Vec<&GameRecord>) = all.iter().copied().partition(|game| game.home);
            buckets.push(bucket("home", &home, &metrics));
            buckets.push(bucket("away", &away, &metrics));
        }
        match context.opponent_type {
            Some(OpponentType::Division) => {
                let games: Vec<&GameRecord> = all.iter().copied().filter(|game| game.division_game).collect();
                buckets.push(bucket("division", &games, &metrics));
            }
            Some(OpponentType::Conference) => {
                let games: Vec<&GameRecord> = all.iter().copied().filter(|game| game.conference_game).collect();
                buckets.push(bucket("conference", &games, &metrics));
            }
            None => {}
        }

        let result = ContextualBreakdown { entity: entity.clone(), buckets };
        Ok(record(plan, vec![entity], Payload::Contextual(result), ErrorMap::new()))
    }

    /// Rank the subject's games by one per-game metric.
    pub(super) async fn game_ranking(&self, plan: &QueryPlan) -> Result<ResultRecord, ErrorRecord> {
        let (entity, log) = self.game_log(plan).await?;
        let context = &plan.filters.context;
        let metric = context
            .sort_metric
            .clone()
            .or_else(|| plan.metrics.first().cloned())
            .unwrap_or_else(|| self.options.default_game_metric.clone());
        let sort_order = context.sort_order.unwrap_or_default();

        let mut errors = ErrorMap::new();
        let mut candidates: Vec<(&GameRecord, f64)> = Vec::with_capacity(log.len());
        for game in &log {
            match metric_value(&game.stats, &metric) {
                Some(value) if !value.is_nan() => candidates.push((game, value)),
                _ => {
                    errors.insert(game.game_id.clone(), format!("no {metric} recorded"));
                }
            }
        }
        if candidates.is_empty() {
            let error = ErrorRecord::new(plan.query_type, QueryError::NoMatchingGames);
            return Err(error.with_errors(errors).with_attempted(vec![entity]));
        }

        match sort_order {
            SortOrder::Desc => candidates.sort_by(|a, b| b.1.total_cmp(&a.1)),
            SortOrder::Asc => candidates.sort_by(|a, b| a.1.total_cmp(&b.1)),
        }
        let values: Vec<f64> = candidates.iter().map(|(_, value)| *value).collect();
        let games: Vec<GameRank> = candidates
            .iter()
            .zip(ranking::dense_ranks(&values))
            .map(|((game, value), rank)| GameRank {
                rank,
                game_id: game.game_id.clone(),
                week: game.week,
                date: game.date,
                opponent: game.opponent.clone(),
                result: game.result,
                score: game.score.clone(),
                value: *value,
            })
            .collect();

        let average = values.iter().sum::<f64>() / values.len() as f64;
        let (best, worst) =
            extremes(&games).ok_or_else(|| ErrorRecord::new(plan.query_type, QueryError::NoMatchingGames))?;
        let result = GameRankingResult { entity: entity.clone(), metric, sort_order, games, average, best, worst };
        Ok(record(plan, vec![entity], Payload::GameRanking(result), errors))
    }
}

fn same_opponent(opponent: &str, wanted: &str) -> bool {
    let (opponent, wanted) = (opponent.to_lowercase(), wanted.to_lowercase());
    opponent.contains(&wanted) || wanted.contains(&opponent)
}

fn bucket(context: &str, games: &[&GameRecord], metrics: &[String]) -> ContextBucket {
    let mut out = ContextBucket { context: context.to_string(), games: games.len(), ..ContextBucket::default() };
    for game in games {
        match game.result {
            Some(GameOutcome::Win) => out.wins += 1,
            Some(GameOutcome::Loss) => out.losses += 1,
            Some(GameOutcome::Tie) => out.ties += 1,
            None => {}
        }
    }

    let mut counts = StatLine::new();
    for metric in metrics {
        for value in games.iter().filter_map(|game| metric_value(&game.stats, metric)) {
            *out.totals.entry(metric.clone()).or_insert(0.0) += value;
            *counts.entry(metric.clone()).or_insert(0.0) += 1.0;
        }
    }
    out.averages = out.totals.iter().map(|(metric, total)| (metric.clone(), total / counts[metric])).collect();
    out
}

/// Highest and lowest valued games; the earlier-listed game wins ties.
fn extremes(games: &[GameRank]) -> Option<(GameRank, GameRank)> {
    let best = games.iter().reduce(|a, b| if b.value > a.value { b } else { a })?;
    let worst = games.iter().reduce(|a, b| if b.value < a.value { b } else { a })?;
    Some((best.clone(), worst.clone()))
}
