//! Final pass: discounts out-of-network candidates slightly relative to
//! in-network ones, since they've already skipped the social graph.

use async_trait::async_trait;
use candidate_pipeline::stages::{Scorer, Stage};
use candidate_pipeline::types::{Candidate, Query};

use crate::params as p;

#[derive(Debug, Default)]
pub struct OonScorer;

impl OonScorer {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for OonScorer {
    fn name(&self) -> &str {
        "OonScorer"
    }
}

#[async_trait]
impl Scorer for OonScorer {
    async fn score(&self, _query: &Query, candidates: &[Candidate]) -> anyhow::Result<Vec<Candidate>> {
        Ok(candidates
            .iter()
            .map(|c| {
                let score = match (c.score, c.in_network) {
                    (Some(score), Some(false)) => Some(score * p::OON_WEIGHT_FACTOR),
                    (score, _) => score,
                };
                Candidate { score, ..Default::default() }
            })
            .collect())
    }

    fn update(&self, candidate: &mut Candidate, scored: &Candidate) {
        candidate.score = scored.score;
    }
}
