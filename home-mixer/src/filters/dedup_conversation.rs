//! Post-selection: keeps only the highest-scored candidate per conversation,
//! so a thread doesn't occupy multiple slots in the final feed. Conversation
//! id is the minimum ancestor id, or the tweet's own id if it has none.

use async_trait::async_trait;
use candidate_pipeline::stages::{Filter, Stage};
use candidate_pipeline::types::{Candidate, FilterResult, Query};

#[derive(Debug, Default)]
pub struct DedupConversationFilter;

impl DedupConversationFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for DedupConversationFilter {
    fn name(&self) -> &str {
        "DedupConversationFilter"
    }
}

fn conversation_id(candidate: &Candidate) -> u64 {
    candidate.ancestors.iter().copied().min().unwrap_or(candidate.tweet_id as u64)
}

#[async_trait]
impl Filter for DedupConversationFilter {
    async fn filter(&self, _query: &Query, candidates: &[Candidate]) -> anyhow::Result<FilterResult> {
        let mut best: std::collections::HashMap<u64, usize> = std::collections::HashMap::new();
        let mut removed = Vec::new();
        let mut kept_indices: Vec<usize> = Vec::new();

        for (i, candidate) in candidates.iter().enumerate() {
            let conv_id = conversation_id(candidate);
            match best.get(&conv_id).copied() {
                None => {
                    best.insert(conv_id, i);
                    kept_indices.push(i);
                }
                Some(existing_idx) => {
                    let existing = &candidates[existing_idx];
                    let existing_score = existing.score.unwrap_or(0.0);
                    let candidate_score = candidate.score.unwrap_or(0.0);
                    // Higher score wins; on an exact tie, lower tweet_id wins
                    // (the stable tie-break this module's open question calls for).
                    let candidate_wins = candidate_score > existing_score
                        || (candidate_score == existing_score && candidate.tweet_id < existing.tweet_id);
                    if candidate_wins {
                        removed.push(existing.clone());
                        best.insert(conv_id, i);
                        kept_indices.retain(|&idx| idx != existing_idx);
                        kept_indices.push(i);
                    } else {
                        removed.push(candidate.clone());
                    }
                }
            }
        }

        kept_indices.sort_unstable();
        let kept = kept_indices.into_iter().map(|i| candidates[i].clone()).collect();

        Ok(FilterResult { kept, removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keeps_the_higher_scored_candidate_in_a_conversation() {
        let filter = DedupConversationFilter::new();
        let candidates = vec![
            Candidate { tweet_id: 1, ancestors: vec![100], score: Some(0.2), ..Default::default() },
            Candidate { tweet_id: 2, ancestors: vec![100], score: Some(0.8), ..Default::default() },
        ];
        let result = filter.filter(&Query::default(), &candidates).await.unwrap();
        assert_eq!(result.kept.len(), 1);
        assert_eq!(result.kept[0].tweet_id, 2);
        assert_eq!(result.removed.len(), 1);
        assert_eq!(result.removed[0].tweet_id, 1);
    }

    #[tokio::test]
    async fn exact_score_ties_keep_the_lower_tweet_id() {
        let filter = DedupConversationFilter::new();
        let candidates = vec![
            Candidate { tweet_id: 9, ancestors: vec![100], score: Some(0.5), ..Default::default() },
            Candidate { tweet_id: 3, ancestors: vec![100], score: Some(0.5), ..Default::default() },
        ];
        let result = filter.filter(&Query::default(), &candidates).await.unwrap();
        assert_eq!(result.kept.len(), 1);
        assert_eq!(result.kept[0].tweet_id, 3);
    }

    #[tokio::test]
    async fn unrelated_conversations_both_survive() {
        let filter = DedupConversationFilter::new();
        let candidates = vec![
            Candidate { tweet_id: 1, ..Default::default() },
            Candidate { tweet_id: 2, ..Default::default() },
        ];
        let result = filter.filter(&Query::default(), &candidates).await.unwrap();
        assert_eq!(result.kept.len(), 2);
    }
}
