//! Fetches video duration, consulted by the weighted scorer's
//! view-quality-view weight eligibility check.

use std::sync::Arc;

use async_trait::async_trait;
use candidate_pipeline::stages::{Hydrator, Stage};
use candidate_pipeline::types::{Candidate, Query};

use crate::clients::TweetEntityClient;

#[derive(Debug)]
pub struct VideoDurationCandidateHydrator {
    client: Arc<dyn TweetEntityClient>,
}

impl VideoDurationCandidateHydrator {
    pub fn new(client: Arc<dyn TweetEntityClient>) -> Self {
        Self { client }
    }
}

impl Stage for VideoDurationCandidateHydrator {
    fn name(&self) -> &str {
        "VideoDurationCandidateHydrator"
    }
}

#[async_trait]
impl Hydrator for VideoDurationCandidateHydrator {
    async fn hydrate(&self, _query: &Query, candidates: &[Candidate]) -> anyhow::Result<Vec<Candidate>> {
        let tweet_ids: Vec<i64> = candidates.iter().map(|c| c.tweet_id).collect();
        let durations = self.client.get_tweet_media_entities(&tweet_ids).await?;

        Ok(candidates
            .iter()
            .map(|c| Candidate {
                video_duration_ms: durations.get(&c.tweet_id).copied(),
                ..Default::default()
            })
            .collect())
    }

    fn update(&self, candidate: &mut Candidate, hydrated: &Candidate) {
        candidate.video_duration_ms = hydrated.video_duration_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MockTweetEntityClient;

    #[tokio::test]
    async fn hydrates_duration_from_first_video() {
        let client = Arc::new(MockTweetEntityClient::new());
        client.set_video_duration_ms(1, 5000);
        let hydrator = VideoDurationCandidateHydrator::new(client);
        let candidates = vec![Candidate { tweet_id: 1, ..Default::default() }];

        let hydrated = hydrator.hydrate(&Query::default(), &candidates).await.unwrap();
        let mut merged = candidates;
        hydrator.update(&mut merged[0], &hydrated[0]);
        assert_eq!(merged[0].video_duration_ms, Some(5000));
    }
}
