//! Sorts by final score and truncates to the requested result size.

use candidate_pipeline::stages::{Selector, Stage};
use candidate_pipeline::types::{Candidate, Query};

#[derive(Debug, Clone, Copy)]
pub struct TopKScoreSelector {
    k: usize,
}

impl TopKScoreSelector {
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

impl Stage for TopKScoreSelector {
    fn name(&self) -> &str {
        "TopKScoreSelector"
    }
}

impl Selector for TopKScoreSelector {
    fn select(&self, _query: &Query, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let mut sorted = self.sort(candidates);
        if self.k > 0 {
            sorted.truncate(self.k);
        }
        sorted
    }

    fn score(&self, candidate: &Candidate) -> f64 {
        candidate.score.unwrap_or(f64::NEG_INFINITY)
    }

    fn size(&self) -> Option<usize> {
        if self.k > 0 {
            Some(self.k)
        } else {
            None
        }
    }
}
