//! Fetches action-probability predictions from the ranking model, batching
//! retweets of the same original tweet under a single prediction key so the
//! model only ever sees the original post's text.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use candidate_pipeline::stages::{Scorer, Stage};
use candidate_pipeline::types::{Candidate, PhoenixScores, Query};

use crate::clients::RankingClient;

#[derive(Debug)]
pub struct RankingScorer {
    client: Arc<dyn RankingClient>,
}

impl RankingScorer {
    pub fn new(client: Arc<dyn RankingClient>) -> Self {
        Self { client }
    }

    fn prediction_key(candidate: &Candidate) -> i64 {
        candidate.retweeted_tweet_id.map(|id| id as i64).unwrap_or(candidate.tweet_id)
    }
}

impl Stage for RankingScorer {
    fn name(&self) -> &str {
        "RankingScorer"
    }
}

#[async_trait]
impl Scorer for RankingScorer {
    async fn score(&self, query: &Query, candidates: &[Candidate]) -> anyhow::Result<Vec<Candidate>> {
        if query.user_action_sequence.is_none() || candidates.is_empty() {
            return Ok(candidates.iter().map(|_| Candidate::default()).collect());
        }

        let keys: Vec<i64> = {
            let mut seen = std::collections::HashSet::new();
            candidates
                .iter()
                .map(Self::prediction_key)
                .filter(|id| seen.insert(*id))
                .collect()
        };

        let (predictions, request_id): (HashMap<i64, PhoenixScores>, u64) =
            self.client.predict(query.user_id, &keys).await?;

        Ok(candidates
            .iter()
            .map(|candidate| {
                let key = Self::prediction_key(candidate);
                Candidate {
                    phoenix_scores: predictions.get(&key).cloned(),
                    prediction_request_id: Some(request_id),
                    last_scored_at_ms: Some(chrono::Utc::now().timestamp_millis() as u64),
                    ..Default::default()
                }
            })
            .collect())
    }

    fn update(&self, candidate: &mut Candidate, scored: &Candidate) {
        candidate.phoenix_scores = scored.phoenix_scores.clone();
        candidate.prediction_request_id = scored.prediction_request_id;
        candidate.last_scored_at_ms = scored.last_scored_at_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MockRankingClient;
    use candidate_pipeline::types::UserActionSequence;

    fn query_with_sequence() -> Query {
        Query {
            user_action_sequence: Some(UserActionSequence::default()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn skips_prediction_without_a_user_action_sequence() {
        let scorer = RankingScorer::new(Arc::new(MockRankingClient::default()));
        let candidates = vec![Candidate { tweet_id: 1, ..Default::default() }];
        let scored = scorer.score(&Query::default(), &candidates).await.unwrap();
        assert!(scored[0].phoenix_scores.is_none());
    }

    #[tokio::test]
    async fn retweets_share_the_original_tweets_prediction_key() {
        let scorer = RankingScorer::new(Arc::new(MockRankingClient::default()));
        let candidates = vec![
            Candidate { tweet_id: 1, ..Default::default() },
            Candidate { tweet_id: 2, retweeted_tweet_id: Some(1), ..Default::default() },
        ];
        let scored = scorer.score(&query_with_sequence(), &candidates).await.unwrap();
        assert_eq!(
            scored[0].phoenix_scores.as_ref().and_then(|s| s.favorite_score),
            scored[1].phoenix_scores.as_ref().and_then(|s| s.favorite_score),
        );
    }
}
