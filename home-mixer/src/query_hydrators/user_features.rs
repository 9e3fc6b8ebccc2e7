//! Fetches the viewer's mute/block/follow/subscription lists, consulted by
//! nearly every pre-scoring filter.

use std::sync::Arc;

use async_trait::async_trait;
use candidate_pipeline::stages::{QueryHydrator, Stage};
use candidate_pipeline::types::Query;

use crate::clients::UserFeaturesClient;

#[derive(Debug)]
pub struct UserFeaturesQueryHydrator {
    client: Arc<dyn UserFeaturesClient>,
}

impl UserFeaturesQueryHydrator {
    pub fn new(client: Arc<dyn UserFeaturesClient>) -> Self {
        Self { client }
    }
}

impl Stage for UserFeaturesQueryHydrator {
    fn name(&self) -> &str {
        "UserFeaturesQueryHydrator"
    }
}

#[async_trait]
impl QueryHydrator for UserFeaturesQueryHydrator {
    async fn hydrate(&self, query: &Query) -> anyhow::Result<Query> {
        let user_features = self.client.get_user_features(query.user_id as u64).await?;
        Ok(Query {
            user_features,
            ..Query::default()
        })
    }

    fn update(&self, query: &mut Query, hydrated: &Query) {
        query.user_features = hydrated.user_features.clone();
    }
}
