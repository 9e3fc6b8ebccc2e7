//! Fetches the viewer's recent action-sequence embedding, consumed later by
//! the ranking scorer.

use std::sync::Arc;

use async_trait::async_trait;
use candidate_pipeline::stages::{QueryHydrator, Stage};
use candidate_pipeline::types::Query;

use crate::clients::UserActionSequenceFetcher;

#[derive(Debug)]
pub struct UserActionSeqQueryHydrator {
    fetcher: Arc<dyn UserActionSequenceFetcher>,
}

impl UserActionSeqQueryHydrator {
    pub fn new(fetcher: Arc<dyn UserActionSequenceFetcher>) -> Self {
        Self { fetcher }
    }
}

impl Stage for UserActionSeqQueryHydrator {
    fn name(&self) -> &str {
        "UserActionSeqQueryHydrator"
    }
}

#[async_trait]
impl QueryHydrator for UserActionSeqQueryHydrator {
    async fn hydrate(&self, query: &Query) -> anyhow::Result<Query> {
        let sequence = self.fetcher.get_by_user_id(query.user_id as u64).await?;
        Ok(Query {
            user_action_sequence: sequence,
            ..Query::default()
        })
    }

    fn update(&self, query: &mut Query, hydrated: &Query) {
        if hydrated.user_action_sequence.is_some() {
            query.user_action_sequence = hydrated.user_action_sequence.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MockUserActionSequenceFetcher;
    use candidate_pipeline::types::UserActionSequence;

    #[tokio::test]
    async fn hydrate_copies_only_the_sequence_field() {
        let fetcher = Arc::new(MockUserActionSequenceFetcher::new());
        fetcher.set_sequence(
            7,
            UserActionSequence {
                user_id: 7,
                ..Default::default()
            },
        );
        let hydrator = UserActionSeqQueryHydrator::new(fetcher);
        let query = Query {
            user_id: 7,
            ..Default::default()
        };

        let partial = hydrator.hydrate(&query).await.unwrap();
        assert!(partial.user_action_sequence.is_some());

        let mut merged = query.clone();
        hydrator.update(&mut merged, &partial);
        assert_eq!(merged.user_action_sequence.unwrap().user_id, 7);
    }

    #[tokio::test]
    async fn update_is_a_noop_when_nothing_was_found() {
        let fetcher = Arc::new(MockUserActionSequenceFetcher::new());
        let hydrator = UserActionSeqQueryHydrator::new(fetcher);
        let query = Query::default();

        let partial = hydrator.hydrate(&query).await.unwrap();
        let mut merged = query.clone();
        hydrator.update(&mut merged, &partial);
        assert!(merged.user_action_sequence.is_none());
    }
}
