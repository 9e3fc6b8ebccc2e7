//! The executor that strings stages together into a single request/response
//! cycle: query hydration, sourcing, hydration, filtering, scoring, selection,
//! post-selection hydration/filtering, and detached side effects.

use std::sync::Arc;

use futures::future::join_all;

use crate::stages::{Filter, Hydrator, QueryHydrator, Scorer, Selector, SideEffect, Source};
use crate::types::{Candidate, FilterResult, PipelineResult, Query};

/// Assembles a fixed set of stage implementations and runs them in the
/// declared order on every call to [`CandidatePipeline::execute`]. Stage
/// lists are `Vec<Box<dyn Trait>>` so a concrete pipeline (e.g. a for-you
/// timeline) can mix hydrators/filters/scorers from different modules.
///
/// Side effects are held behind an `Arc` so they can be moved into a
/// detached task without the executor itself needing to be `'static`.
pub struct CandidatePipeline {
    pub query_hydrators: Vec<Box<dyn QueryHydrator>>,
    pub sources: Vec<Box<dyn Source>>,
    pub hydrators: Vec<Box<dyn Hydrator>>,
    pub filters: Vec<Box<dyn Filter>>,
    pub scorers: Vec<Box<dyn Scorer>>,
    pub selector: Box<dyn Selector>,
    pub post_selection_hydrators: Vec<Box<dyn Hydrator>>,
    pub post_selection_filters: Vec<Box<dyn Filter>>,
    pub side_effects: Arc<Vec<Box<dyn SideEffect>>>,

    /// Cap on the number of candidates returned; 0 means unbounded.
    pub result_size: usize,
}

impl CandidatePipeline {
    pub async fn execute(&self, query: &Query) -> PipelineResult {
        let hydrated_query = self.hydrate_query(query).await;

        let retrieved_candidates = self.fetch_candidates(&hydrated_query).await;

        let hydrated_candidates = self
            .run_hydrators(&hydrated_query, retrieved_candidates, &self.hydrators, "Hydrator")
            .await;

        let (kept, mut filtered_candidates) = self
            .run_filters(&hydrated_query, hydrated_candidates.clone(), &self.filters, "Filter")
            .await;

        let scored_candidates = self.score_candidates(&hydrated_query, kept).await;

        let selected_candidates = self.select_candidates(&hydrated_query, scored_candidates);

        let post_hydrated = self
            .run_hydrators(
                &hydrated_query,
                selected_candidates,
                &self.post_selection_hydrators,
                "PostSelectionHydrator",
            )
            .await;

        let (mut final_candidates, post_filtered) = self
            .run_filters(
                &hydrated_query,
                post_hydrated,
                &self.post_selection_filters,
                "PostSelectionFilter",
            )
            .await;
        filtered_candidates.extend(post_filtered);

        if self.result_size > 0 && final_candidates.len() > self.result_size {
            final_candidates.truncate(self.result_size);
        }

        self.spawn_side_effects(hydrated_query.clone(), final_candidates.clone());

        PipelineResult {
            retrieved_candidates: hydrated_candidates,
            filtered_candidates,
            selected_candidates: final_candidates,
            query: hydrated_query,
        }
    }

    async fn hydrate_query(&self, query: &Query) -> Query {
        let mut hydrated = query.clone();

        let enabled: Vec<&Box<dyn QueryHydrator>> = self
            .query_hydrators
            .iter()
            .filter(|h| h.enabled(query))
            .collect();

        if enabled.is_empty() {
            return hydrated;
        }

        let results = join_all(enabled.iter().map(|h| h.hydrate(query))).await;

        for (hydrator, result) in enabled.iter().zip(results) {
            match result {
                Ok(partial) => hydrator.update(&mut hydrated, &partial),
                Err(err) => log::warn!(
                    "request_id={} stage=QueryHydrator component={} failed: {err}",
                    query.request_id,
                    hydrator.name()
                ),
            }
        }

        hydrated
    }

    async fn fetch_candidates(&self, query: &Query) -> Vec<Candidate> {
        let enabled: Vec<&Box<dyn Source>> =
            self.sources.iter().filter(|s| s.enabled(query)).collect();

        if enabled.is_empty() {
            return Vec::new();
        }

        let results = join_all(enabled.iter().map(|s| s.get_candidates(query))).await;

        let mut collected = Vec::new();
        for (source, result) in enabled.iter().zip(results) {
            match result {
                Ok(candidates) => {
                    log::debug!(
                        "request_id={} stage=Source component={} fetched {} candidates",
                        query.request_id,
                        source.name(),
                        candidates.len()
                    );
                    collected.extend(candidates);
                }
                Err(err) => log::warn!(
                    "request_id={} stage=Source component={} failed: {err}",
                    query.request_id,
                    source.name()
                ),
            }
        }

        collected
    }

    async fn run_hydrators(
        &self,
        query: &Query,
        mut candidates: Vec<Candidate>,
        hydrators: &[Box<dyn Hydrator>],
        stage_name: &str,
    ) -> Vec<Candidate> {
        let enabled: Vec<&Box<dyn Hydrator>> =
            hydrators.iter().filter(|h| h.enabled(query)).collect();

        if enabled.is_empty() {
            return candidates;
        }

        let expected_len = candidates.len();
        let results = join_all(enabled.iter().map(|h| h.hydrate(query, &candidates))).await;

        for (hydrator, result) in enabled.iter().zip(results) {
            match result {
                Ok(hydrated) if hydrated.len() == expected_len => {
                    hydrator.update_all(&mut candidates, &hydrated);
                }
                Ok(hydrated) => log::warn!(
                    "request_id={} stage={stage_name} component={} skipped: length_mismatch expected={expected_len} got={}",
                    query.request_id,
                    hydrator.name(),
                    hydrated.len()
                ),
                Err(err) => log::warn!(
                    "request_id={} stage={stage_name} component={} failed: {err}",
                    query.request_id,
                    hydrator.name()
                ),
            }
        }

        candidates
    }

    async fn run_filters(
        &self,
        query: &Query,
        candidates: Vec<Candidate>,
        filters: &[Box<dyn Filter>],
        stage_name: &str,
    ) -> (Vec<Candidate>, Vec<Candidate>) {
        let mut kept = candidates;
        let mut removed = Vec::new();

        for filter in filters {
            if !filter.enabled(query) {
                continue;
            }

            let backup = kept.clone();

            match filter.filter(query, &kept).await {
                Ok(FilterResult {
                    kept: new_kept,
                    removed: new_removed,
                }) => {
                    kept = new_kept;
                    removed.extend(new_removed);
                }
                Err(err) => {
                    log::warn!(
                        "request_id={} stage={stage_name} component={} failed: {err}",
                        query.request_id,
                        filter.name()
                    );
                    kept = backup;
                }
            }
        }

        log::debug!(
            "request_id={} stage={stage_name} kept={} removed={}",
            query.request_id,
            kept.len(),
            removed.len()
        );

        (kept, removed)
    }

    async fn score_candidates(&self, query: &Query, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        let expected_len = candidates.len();

        for scorer in &self.scorers {
            if !scorer.enabled(query) {
                continue;
            }

            match scorer.score(query, &candidates).await {
                Ok(scored) if scored.len() == expected_len => {
                    scorer.update_all(&mut candidates, &scored);
                }
                Ok(scored) => log::warn!(
                    "request_id={} stage=Scorer component={} skipped: length_mismatch expected={expected_len} got={}",
                    query.request_id,
                    scorer.name(),
                    scored.len()
                ),
                Err(err) => log::warn!(
                    "request_id={} stage=Scorer component={} failed: {err}",
                    query.request_id,
                    scorer.name()
                ),
            }
        }

        candidates
    }

    fn select_candidates(&self, query: &Query, candidates: Vec<Candidate>) -> Vec<Candidate> {
        if !self.selector.enabled(query) {
            return candidates;
        }
        self.selector.select(query, candidates)
    }

    /// Runs side effects on a detached task so a slow cache write or log
    /// flush never adds latency to the caller, and never fails the request
    /// that triggered it.
    fn spawn_side_effects(&self, query: Query, candidates: Vec<Candidate>) {
        if self.side_effects.is_empty() {
            return;
        }

        let side_effects = self.side_effects.clone();
        tokio::spawn(async move {
            for side_effect in side_effects.iter() {
                if !side_effect.enabled(&query) {
                    continue;
                }
                if let Err(err) = side_effect.run(&query, &candidates).await {
                    log::warn!(
                        "request_id={} stage=SideEffect component={} failed: {err}",
                        query.request_id,
                        side_effect.name()
                    );
                }
            }
        });
    }
}
