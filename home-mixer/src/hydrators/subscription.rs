//! Resolves the paid-subscription author tier a tweet belongs to, consulted
//! by [`crate::filters::ineligible_subscription`].

use std::sync::Arc;

use async_trait::async_trait;
use candidate_pipeline::stages::{Hydrator, Stage};
use candidate_pipeline::types::{Candidate, Query};

use crate::clients::SubscriptionClient;

#[derive(Debug)]
pub struct SubscriptionHydrator {
    client: Arc<dyn SubscriptionClient>,
}

impl SubscriptionHydrator {
    pub fn new(client: Arc<dyn SubscriptionClient>) -> Self {
        Self { client }
    }
}

impl Stage for SubscriptionHydrator {
    fn name(&self) -> &str {
        "SubscriptionHydrator"
    }
}

#[async_trait]
impl Hydrator for SubscriptionHydrator {
    async fn hydrate(&self, _query: &Query, candidates: &[Candidate]) -> anyhow::Result<Vec<Candidate>> {
        let tweet_ids: Vec<i64> = candidates.iter().map(|c| c.tweet_id).collect();
        let subscriptions = self.client.get_subscription_author_ids(&tweet_ids).await?;

        Ok(candidates
            .iter()
            .map(|c| Candidate {
                subscription_author_id: subscriptions.get(&c.tweet_id).copied(),
                ..Default::default()
            })
            .collect())
    }

    fn update(&self, candidate: &mut Candidate, hydrated: &Candidate) {
        candidate.subscription_author_id = hydrated.subscription_author_id;
    }
}
