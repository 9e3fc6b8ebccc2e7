//! Out-of-network candidates surfaced by the Phoenix retrieval service.
//! Disabled entirely for in-network-only requests, and requires the viewer's
//! action sequence to already be hydrated.

use std::sync::Arc;

use async_trait::async_trait;
use candidate_pipeline::stages::{Source, Stage};
use candidate_pipeline::types::{Candidate, Query, ServedType};

use crate::clients::PhoenixRetrievalClient;

#[derive(Debug)]
pub struct OutOfNetworkSource {
    client: Arc<dyn PhoenixRetrievalClient>,
}

impl OutOfNetworkSource {
    pub fn new(client: Arc<dyn PhoenixRetrievalClient>) -> Self {
        Self { client }
    }
}

impl Stage for OutOfNetworkSource {
    fn name(&self) -> &str {
        "OutOfNetworkSource"
    }

    fn enabled(&self, query: &Query) -> bool {
        !query.in_network_only
    }
}

#[async_trait]
impl Source for OutOfNetworkSource {
    async fn get_candidates(&self, query: &Query) -> anyhow::Result<Vec<Candidate>> {
        if query.user_action_sequence.is_none() {
            anyhow::bail!("out-of-network retrieval requires a hydrated user action sequence");
        }

        let candidates = self.client.get_candidates(query.user_id).await?;

        Ok(candidates
            .into_iter()
            .map(|info| Candidate {
                tweet_id: info.tweet_id,
                author_id: info.author_id,
                in_reply_to_tweet_id: info.in_reply_to_tweet_id.map(|id| id as u64),
                served_type: Some(ServedType::ForYouPhoenixRetrieval as i32),
                ..Default::default()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{MockPhoenixRetrievalClient, TweetInfo};
    use candidate_pipeline::stages::Source as _;
    use candidate_pipeline::types::UserActionSequence;

    #[tokio::test]
    async fn errors_without_a_hydrated_action_sequence() {
        let client = Arc::new(MockPhoenixRetrievalClient::new());
        let source = OutOfNetworkSource::new(client);
        let query = Query::default();
        assert!(source.get_candidates(&query).await.is_err());
    }

    #[tokio::test]
    async fn disabled_for_in_network_only_requests() {
        let client = Arc::new(MockPhoenixRetrievalClient::new());
        let source = OutOfNetworkSource::new(client);
        let query = Query {
            in_network_only: true,
            ..Default::default()
        };
        assert!(!source.enabled(&query));
    }

    #[tokio::test]
    async fn maps_candidates_with_the_phoenix_served_type() {
        let client = Arc::new(MockPhoenixRetrievalClient::new());
        client.set_candidates(
            1,
            vec![TweetInfo {
                tweet_id: 10,
                author_id: 20,
                in_reply_to_tweet_id: None,
            }],
        );
        let source = OutOfNetworkSource::new(client);
        let query = Query {
            user_id: 1,
            user_action_sequence: Some(UserActionSequence::default()),
            ..Default::default()
        };

        let candidates = source.get_candidates(&query).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].served_type,
            Some(ServedType::ForYouPhoenixRetrieval as i32)
        );
    }
}
