//! Fetches tweet text and reply/retweet lineage. Notably does not overwrite
//! `author_id`: sources already set it, and for retweets the source's
//! author is what downstream stages need, not the original tweet's author.

use std::sync::Arc;

use async_trait::async_trait;
use candidate_pipeline::stages::{Hydrator, Stage};
use candidate_pipeline::types::{Candidate, Query};

use crate::clients::TweetEntityClient;

#[derive(Debug)]
pub struct CoreDataCandidateHydrator {
    client: Arc<dyn TweetEntityClient>,
}

impl CoreDataCandidateHydrator {
    pub fn new(client: Arc<dyn TweetEntityClient>) -> Self {
        Self { client }
    }
}

impl Stage for CoreDataCandidateHydrator {
    fn name(&self) -> &str {
        "CoreDataCandidateHydrator"
    }
}

#[async_trait]
impl Hydrator for CoreDataCandidateHydrator {
    async fn hydrate(&self, _query: &Query, candidates: &[Candidate]) -> anyhow::Result<Vec<Candidate>> {
        let tweet_ids: Vec<i64> = candidates.iter().map(|c| c.tweet_id).collect();
        let core_data = self.client.get_tweet_core_datas(&tweet_ids).await?;

        Ok(candidates
            .iter()
            .map(|c| match core_data.get(&c.tweet_id) {
                Some(data) => Candidate {
                    tweet_text: data.text.clone(),
                    retweeted_tweet_id: data.source_tweet_id,
                    retweeted_user_id: data.source_user_id,
                    in_reply_to_tweet_id: data.in_reply_to_tweet_id,
                    ..Default::default()
                },
                None => Candidate::default(),
            })
            .collect())
    }

    fn update(&self, candidate: &mut Candidate, hydrated: &Candidate) {
        candidate.tweet_text = hydrated.tweet_text.clone();
        candidate.retweeted_tweet_id = hydrated.retweeted_tweet_id;
        candidate.retweeted_user_id = hydrated.retweeted_user_id;
        candidate.in_reply_to_tweet_id = hydrated.in_reply_to_tweet_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{MockTweetEntityClient, TweetCoreData};

    #[tokio::test]
    async fn hydrate_does_not_touch_author_id() {
        let client = Arc::new(MockTweetEntityClient::new());
        client.set_core_data(
            1,
            TweetCoreData {
                text: "hello".into(),
                author_id: 999,
                ..Default::default()
            },
        );
        let hydrator = CoreDataCandidateHydrator::new(client);
        let candidates = vec![Candidate {
            tweet_id: 1,
            author_id: 5,
            ..Default::default()
        }];

        let hydrated = hydrator.hydrate(&Query::default(), &candidates).await.unwrap();
        let mut merged = candidates;
        hydrator.update(&mut merged[0], &hydrated[0]);

        assert_eq!(merged[0].tweet_text, "hello");
        assert_eq!(merged[0].author_id, 5);
    }
}
