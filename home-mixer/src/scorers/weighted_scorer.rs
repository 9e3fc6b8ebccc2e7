//! Combines the ranking model's 19 action-probability predictions into a
//! single weighted score, normalized with `log1p` compression.

use async_trait::async_trait;
use candidate_pipeline::stages::{Scorer, Stage};
use candidate_pipeline::types::{Candidate, PhoenixScores, Query};

use crate::params as p;
use crate::util::score_normalizer::normalize_score;

#[derive(Debug, Default)]
pub struct WeightedScorer;

impl WeightedScorer {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for WeightedScorer {
    fn name(&self) -> &str {
        "WeightedScorer"
    }
}

#[async_trait]
impl Scorer for WeightedScorer {
    async fn score(&self, _query: &Query, candidates: &[Candidate]) -> anyhow::Result<Vec<Candidate>> {
        Ok(candidates
            .iter()
            .map(|c| {
                let combined = Self::compute_weighted_score(c);
                let normalized = normalize_score(c, combined);
                Candidate {
                    weighted_score: Some(normalized),
                    ..Default::default()
                }
            })
            .collect())
    }

    fn update(&self, candidate: &mut Candidate, scored: &Candidate) {
        candidate.weighted_score = scored.weighted_score;
    }
}

impl WeightedScorer {
    #[inline]
    fn apply(score: Option<f64>, weight: f64) -> f64 {
        score.unwrap_or(0.0) * weight
    }

    fn compute_weighted_score(candidate: &Candidate) -> f64 {
        let s: &PhoenixScores = match &candidate.phoenix_scores {
            Some(scores) => scores,
            None => return 0.0,
        };

        let combined = Self::apply(s.favorite_score, p::FAVORITE_WEIGHT)
            + Self::apply(s.reply_score, p::REPLY_WEIGHT)
            + Self::apply(s.retweet_score, p::RETWEET_WEIGHT)
            + Self::apply(s.photo_expand_score, p::PHOTO_EXPAND_WEIGHT)
            + Self::apply(s.click_score, p::CLICK_WEIGHT)
            + Self::apply(s.profile_click_score, p::PROFILE_CLICK_WEIGHT)
            + Self::apply(s.vqv_score, Self::vqv_weight_eligibility(candidate))
            + Self::apply(s.share_score, p::SHARE_WEIGHT)
            + Self::apply(s.share_via_dm_score, p::SHARE_VIA_DM_WEIGHT)
            + Self::apply(s.share_via_copy_link_score, p::SHARE_VIA_COPY_LINK_WEIGHT)
            + Self::apply(s.dwell_score, p::DWELL_WEIGHT)
            + Self::apply(s.quote_score, p::QUOTE_WEIGHT)
            + Self::apply(s.quoted_click_score, p::QUOTED_CLICK_WEIGHT)
            + Self::apply(s.dwell_time, p::CONT_DWELL_TIME_WEIGHT)
            + Self::apply(s.follow_author_score, p::FOLLOW_AUTHOR_WEIGHT)
            + Self::apply(s.not_interested_score, p::NOT_INTERESTED_WEIGHT)
            + Self::apply(s.block_author_score, p::BLOCK_AUTHOR_WEIGHT)
            + Self::apply(s.mute_author_score, p::MUTE_AUTHOR_WEIGHT)
            + Self::apply(s.report_score, p::REPORT_WEIGHT);

        Self::offset_score(combined)
    }

    #[inline]
    fn vqv_weight_eligibility(candidate: &Candidate) -> f64 {
        if candidate.video_duration_ms.is_some_and(|ms| ms > p::MIN_VIDEO_DURATION_MS) {
            p::VQV_WEIGHT
        } else {
            0.0
        }
    }

    #[inline]
    fn offset_score(combined_score: f64) -> f64 {
        if p::WEIGHTS_SUM == 0.0 {
            combined_score.max(0.0)
        } else if combined_score < 0.0 {
            (combined_score + p::NEGATIVE_WEIGHTS_SUM) / p::WEIGHTS_SUM * p::NEGATIVE_SCORES_OFFSET
        } else {
            combined_score + p::NEGATIVE_SCORES_OFFSET
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate_with(scores: PhoenixScores) -> Candidate {
        Candidate {
            phoenix_scores: Some(scores),
            ..Default::default()
        }
    }

    #[test]
    fn no_phoenix_scores_means_zero() {
        assert_eq!(WeightedScorer::compute_weighted_score(&Candidate::default()), 0.0);
    }

    #[test]
    fn combines_multiple_action_scores() {
        let candidate = candidate_with(PhoenixScores {
            favorite_score: Some(0.8),
            reply_score: Some(0.6),
            ..Default::default()
        });
        assert!(WeightedScorer::compute_weighted_score(&candidate) > 0.0);
    }

    #[test]
    fn vqv_weight_only_applies_above_the_minimum_duration() {
        let mut candidate = Candidate::default();
        assert_eq!(WeightedScorer::vqv_weight_eligibility(&candidate), 0.0);

        candidate.video_duration_ms = Some(p::MIN_VIDEO_DURATION_MS + 1);
        assert_eq!(WeightedScorer::vqv_weight_eligibility(&candidate), p::VQV_WEIGHT);
    }

    #[tokio::test]
    async fn score_writes_only_weighted_score() {
        let scorer = WeightedScorer::new();
        let candidates = vec![candidate_with(PhoenixScores {
            favorite_score: Some(0.5),
            ..Default::default()
        })];
        let scored = scorer.score(&Query::default(), &candidates).await.unwrap();
        assert!(scored[0].weighted_score.is_some());
        assert!(scored[0].score.is_none());
    }
}
