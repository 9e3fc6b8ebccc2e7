//! Demotes later posts from an author already well represented in the
//! ranked list, so one prolific author can't fill the whole feed.

use async_trait::async_trait;
use candidate_pipeline::stages::{Scorer, Stage};
use candidate_pipeline::types::{Candidate, Query};

use crate::params;

#[derive(Debug, Clone, Copy)]
pub struct AuthorDiversityScorer {
    decay_factor: f64,
    floor: f64,
}

impl AuthorDiversityScorer {
    pub fn new() -> Self {
        Self {
            decay_factor: params::AUTHOR_DIVERSITY_DECAY,
            floor: params::AUTHOR_DIVERSITY_FLOOR,
        }
    }

    pub fn with_params(decay_factor: f64, floor: f64) -> Self {
        Self { decay_factor, floor }
    }

    fn multiplier(&self, position_for_author: u32) -> f64 {
        (1.0 - self.floor) * self.decay_factor.powi(position_for_author as i32) + self.floor
    }
}

impl Default for AuthorDiversityScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for AuthorDiversityScorer {
    fn name(&self) -> &str {
        "AuthorDiversityScorer"
    }
}

#[async_trait]
impl Scorer for AuthorDiversityScorer {
    async fn score(&self, _query: &Query, candidates: &[Candidate]) -> anyhow::Result<Vec<Candidate>> {
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by(|&a, &b| {
            let score_a = candidates[a].weighted_score.unwrap_or(0.0);
            let score_b = candidates[b].weighted_score.unwrap_or(0.0);
            score_b.total_cmp(&score_a)
        });

        let mut author_counts: std::collections::HashMap<u64, u32> = std::collections::HashMap::new();
        let mut adjusted = vec![Candidate::default(); candidates.len()];

        for idx in order {
            let candidate = &candidates[idx];
            let position = author_counts.entry(candidate.author_id).or_insert(0);
            let multiplier = self.multiplier(*position);
            *position += 1;

            adjusted[idx] = Candidate {
                score: Some(candidate.weighted_score.unwrap_or(0.0) * multiplier),
                ..Default::default()
            };
        }

        Ok(adjusted)
    }

    fn update(&self, candidate: &mut Candidate, scored: &Candidate) {
        candidate.score = scored.score;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn demotes_repeat_authors_in_score_order() {
        let scorer = AuthorDiversityScorer::new();
        let candidates = vec![
            Candidate { tweet_id: 1, author_id: 10, weighted_score: Some(1.0), ..Default::default() },
            Candidate { tweet_id: 2, author_id: 10, weighted_score: Some(0.9), ..Default::default() },
            Candidate { tweet_id: 3, author_id: 20, weighted_score: Some(0.8), ..Default::default() },
        ];
        let scored = scorer.score(&Query::default(), &candidates).await.unwrap();
        assert_eq!(scored[0].score, Some(1.0));
        assert!(scored[1].score.unwrap() < 0.9);
        assert_eq!(scored[2].score, Some(0.8));
    }

    #[test]
    fn multiplier_approaches_the_floor() {
        let scorer = AuthorDiversityScorer::new();
        assert_eq!(scorer.multiplier(0), 1.0);
        assert!(scorer.multiplier(50) - scorer.floor < 1e-6);
    }
}
