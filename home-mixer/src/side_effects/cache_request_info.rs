//! Records which posts were served so a later request can filter them out
//! via `PreviouslyServedPostsFilter`. Detached: the response never waits on
//! this, and a cache failure never fails the request.

use std::sync::Arc;

use async_trait::async_trait;
use candidate_pipeline::stages::{SideEffect, Stage};
use candidate_pipeline::types::{Candidate, Query};
use log::warn;

use crate::clients::RequestInfoCacheClient;

#[derive(Debug)]
pub struct CacheRequestInfoSideEffect {
    client: Arc<dyn RequestInfoCacheClient>,
}

impl CacheRequestInfoSideEffect {
    pub fn new(client: Arc<dyn RequestInfoCacheClient>) -> Self {
        Self { client }
    }
}

impl Stage for CacheRequestInfoSideEffect {
    fn name(&self) -> &str {
        "CacheRequestInfoSideEffect"
    }

    fn enabled(&self, query: &Query) -> bool {
        !query.in_network_only
    }
}

#[async_trait]
impl SideEffect for CacheRequestInfoSideEffect {
    async fn run(&self, query: &Query, candidates: &[Candidate]) -> anyhow::Result<()> {
        let tweet_ids: Vec<i64> = candidates.iter().map(|c| c.tweet_id).collect();
        if let Err(err) = self.client.store_request_info(query.user_id, &tweet_ids).await {
            warn!("failed to cache request info for user {}: {err}", query.user_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MockRequestInfoCacheClient;

    #[tokio::test]
    async fn stores_served_tweet_ids() {
        let client = Arc::new(MockRequestInfoCacheClient::new());
        let side_effect = CacheRequestInfoSideEffect::new(client.clone());
        let query = Query { user_id: 7, ..Default::default() };
        let candidates = vec![Candidate { tweet_id: 1, ..Default::default() }, Candidate { tweet_id: 2, ..Default::default() }];
        side_effect.run(&query, &candidates).await.unwrap();
        assert_eq!(client.stored_for(7), vec![1, 2]);
    }

    #[test]
    fn disabled_for_in_network_only_requests() {
        let client = Arc::new(MockRequestInfoCacheClient::new());
        let side_effect = CacheRequestInfoSideEffect::new(client);
        let query = Query { in_network_only: true, ..Default::default() };
        assert!(!side_effect.enabled(&query));
    }
}
