use super::{QueryExecutor, no_data, record};
use crate::error::{ErrorRecord, QueryError};
use crate::normalize;
use crate::plan::QueryPlan;
use crate::ranking;
use crate::result::{EntityLine, Payload, ResultRecord};

impl QueryExecutor<'_> {
    /// Direct lookup: the subject's canonical-metric map, unranked.
    pub(super) async fn single_entity(&self, plan: &QueryPlan) -> Result<ResultRecord, ErrorRecord> {
        let entity = self.subject(plan)?.to_string();
        let (mut ok, errors) = self.fetch_entities(std::slice::from_ref(&entity), &plan.filters).await;
        let Some((entity, stats)) = ok.pop() else {
            return Err(no_data(plan, errors, vec![entity]));
        };

        let stats = normalize::extract(&stats, &plan.metrics);
        let payload = Payload::EntityStats(EntityLine { entity: entity.clone(), stats });
        Ok(record(plan, vec![entity], payload, errors))
    }

    /// Players or teams, two or more: per-metric rankings and the overall ranking.
    pub(super) async fn entity_comparison(&self, plan: &QueryPlan) -> Result<ResultRecord, ErrorRecord> {
        let entities = plan.comparison_entities();
        if entities.len() < 2 {
            let error = QueryError::InsufficientEntities { required: 2, found: entities.len() };
            return Err(ErrorRecord::new(plan.query_type, error).with_attempted(entities.to_vec()));
        }

        let (fetched, errors) = self.fetch_entities(entities, &plan.filters).await;
        if fetched.is_empty() {
            return Err(no_data(plan, errors, entities.to_vec()));
        }

        let comparison = ranking::compare(&fetched, &plan.metrics);
        tracing::debug!(
            ranked_metrics = comparison.by_metric.len(),
            succeeded = fetched.len(),
            failed = errors.len(),
            "comparison ranked"
        );

        let subjects = fetched.iter().map(|(name, _)| name.clone()).collect();
        let lines = fetched
            .into_iter()
            .map(|(entity, stats)| EntityLine { entity, stats: normalize::extract(&stats, &plan.metrics) })
            .collect();
        Ok(record(plan, subjects, Payload::Comparison { entities: lines, comparison }, errors))
    }
}
