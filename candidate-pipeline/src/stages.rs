//! The seven stage traits a [`crate::CandidatePipeline`] orchestrates. Each
//! stage is `dyn`-safe so a pipeline can hold a heterogeneous `Vec<Box<dyn
//! Trait>>` of concrete implementations assembled at startup.

use async_trait::async_trait;
use std::fmt;

use crate::types::{Candidate, FilterResult, Query};

/// Shared by every stage: a human-readable name for logs/metrics and a
/// per-query enable check. Defaulted to always-on; stages override `enabled`
/// to implement conditional execution.
pub trait Stage: fmt::Debug {
    fn name(&self) -> &str;

    fn enabled(&self, _query: &Query) -> bool {
        true
    }
}

/// Enriches the query before candidate retrieval. Runs in parallel with
/// other query hydrators; each one's `update` is responsible for copying
/// only the fields it owns into the merged query.
#[async_trait]
pub trait QueryHydrator: Stage + Send + Sync {
    async fn hydrate(&self, query: &Query) -> anyhow::Result<Query>;

    /// Copy this hydrator's fields from `hydrated` into `query`.
    fn update(&self, query: &mut Query, hydrated: &Query);
}

/// Retrieves candidates from one data source. Runs in parallel with other
/// sources; failures are isolated per source and logged rather than failing
/// the whole fetch stage.
#[async_trait]
pub trait Source: Stage + Send + Sync {
    async fn get_candidates(&self, query: &Query) -> anyhow::Result<Vec<Candidate>>;
}

/// Enriches the candidate list. Runs in parallel with other hydrators. The
/// returned vec must be the same length and order as the input; hydrators
/// must never drop candidates (that is a filter's job).
#[async_trait]
pub trait Hydrator: Stage + Send + Sync {
    async fn hydrate(
        &self,
        query: &Query,
        candidates: &[Candidate],
    ) -> anyhow::Result<Vec<Candidate>>;

    /// Copy this hydrator's fields from `hydrated` into `candidate`.
    fn update(&self, candidate: &mut Candidate, hydrated: &Candidate);

    /// Batch form of [`Hydrator::update`]; the default loops pairwise and is
    /// a no-op if the lengths disagree (the executor already discards
    /// mismatched results before calling this).
    fn update_all(&self, candidates: &mut [Candidate], hydrated: &[Candidate]) {
        default_update_all(self, candidates, hydrated);
    }
}

pub fn default_update_all<H: Hydrator + ?Sized>(
    hydrator: &H,
    candidates: &mut [Candidate],
    hydrated: &[Candidate],
) {
    if candidates.len() != hydrated.len() {
        return;
    }
    for (candidate, hydrated) in candidates.iter_mut().zip(hydrated) {
        hydrator.update(candidate, hydrated);
    }
}

/// Evaluates and drops candidates. Filters run sequentially, each seeing the
/// previous filter's kept set; the executor snapshots the input before each
/// filter and restores it if the filter errors.
#[async_trait]
pub trait Filter: Stage + Send + Sync {
    async fn filter(&self, query: &Query, candidates: &[Candidate]) -> anyhow::Result<FilterResult>;
}

/// Scores candidates. Scorers run sequentially, each building on the
/// previous scorer's output. The returned vec must match the input length;
/// a scorer must never drop candidates.
#[async_trait]
pub trait Scorer: Stage + Send + Sync {
    async fn score(&self, query: &Query, candidates: &[Candidate]) -> anyhow::Result<Vec<Candidate>>;

    /// Copy this scorer's fields from `scored` into `candidate`.
    fn update(&self, candidate: &mut Candidate, scored: &Candidate);

    fn update_all(&self, candidates: &mut [Candidate], scored: &[Candidate]) {
        default_scorer_update_all(self, candidates, scored);
    }
}

pub fn default_scorer_update_all<S: Scorer + ?Sized>(
    scorer: &S,
    candidates: &mut [Candidate],
    scored: &[Candidate],
) {
    if candidates.len() != scored.len() {
        return;
    }
    for (candidate, scored) in candidates.iter_mut().zip(scored) {
        scorer.update(candidate, scored);
    }
}

/// Chooses and orders the final candidate set after scoring.
pub trait Selector: Stage + Send + Sync {
    fn select(&self, query: &Query, candidates: Vec<Candidate>) -> Vec<Candidate>;

    /// Extract the sort key for a candidate; missing scores sort last.
    fn score(&self, candidate: &Candidate) -> f64;

    fn sort(&self, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates.sort_by(|a, b| {
            self.score(b)
                .partial_cmp(&self.score(a))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates
    }

    /// Cap on the number of candidates to keep; `None` means unbounded.
    fn size(&self) -> Option<usize> {
        None
    }
}

/// A detached, best-effort action run after selection (cache warms, logging,
/// impression recording). Runs asynchronously and never blocks or affects
/// the main response.
#[async_trait]
pub trait SideEffect: Stage + Send + Sync {
    async fn run(&self, query: &Query, candidates: &[Candidate]) -> anyhow::Result<()>;
}
