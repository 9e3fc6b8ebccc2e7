//! In-network candidates: posts from accounts the viewer follows, fanned in
//! by Thunder.

use std::sync::Arc;

use async_trait::async_trait;
use candidate_pipeline::stages::{Source, Stage};
use candidate_pipeline::types::{Candidate, Query, ServedType};

use crate::clients::ThunderClient;

#[derive(Debug)]
pub struct InNetworkSource {
    client: Arc<dyn ThunderClient>,
}

impl InNetworkSource {
    pub fn new(client: Arc<dyn ThunderClient>) -> Self {
        Self { client }
    }
}

impl Stage for InNetworkSource {
    fn name(&self) -> &str {
        "InNetworkSource"
    }
}

#[async_trait]
impl Source for InNetworkSource {
    async fn get_candidates(&self, query: &Query) -> anyhow::Result<Vec<Candidate>> {
        let followed = &query.user_features.followed_user_ids;
        if followed.is_empty() {
            return Ok(Vec::new());
        }

        let posts = self
            .client
            .get_in_network_posts(query.user_id as u64, followed)
            .await?;

        Ok(posts
            .into_iter()
            .map(|post| {
                let mut ancestors = Vec::new();
                if let Some(reply_to) = post.in_reply_to_tweet_id {
                    ancestors.push(reply_to as u64);
                }
                if let Some(conversation_id) = post.conversation_id {
                    if Some(conversation_id) != post.in_reply_to_tweet_id {
                        ancestors.push(conversation_id as u64);
                    }
                }

                Candidate {
                    tweet_id: post.tweet_id,
                    author_id: post.author_id,
                    in_reply_to_tweet_id: post.in_reply_to_tweet_id.map(|id| id as u64),
                    retweeted_tweet_id: post.source_tweet_id.map(|id| id as u64),
                    retweeted_user_id: post.source_user_id,
                    ancestors,
                    served_type: Some(ServedType::ForYouInNetwork as i32),
                    ..Default::default()
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{MockThunderClient, ThunderPost};
    use candidate_pipeline::types::UserFeatures;

    #[tokio::test]
    async fn empty_following_list_short_circuits() {
        let client = Arc::new(MockThunderClient::new());
        let source = InNetworkSource::new(client);
        let query = Query::default();
        let candidates = source.get_candidates(&query).await.unwrap();
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn derives_ancestors_from_reply_and_conversation_ids() {
        let client = Arc::new(MockThunderClient::new());
        client.set_posts(
            1,
            vec![ThunderPost {
                tweet_id: 100,
                author_id: 5,
                in_reply_to_tweet_id: Some(99),
                conversation_id: Some(50),
                ..Default::default()
            }],
        );
        let source = InNetworkSource::new(client);
        let query = Query {
            user_id: 1,
            user_features: UserFeatures {
                followed_user_ids: vec![5],
                ..Default::default()
            },
            ..Default::default()
        };

        let candidates = source.get_candidates(&query).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].ancestors, vec![99, 50]);
        assert_eq!(
            candidates[0].served_type,
            Some(ServedType::ForYouInNetwork as i32)
        );
    }
}
