//! Post-selection visibility filtering: splits the already-selected
//! candidates into in-network and out-of-network id lists and issues both
//! visibility lookups concurrently, since they hit independent backends.

use std::sync::Arc;

use async_trait::async_trait;
use candidate_pipeline::stages::{Hydrator, Stage};
use candidate_pipeline::types::{Candidate, Query};

use crate::clients::VisibilityClient;

#[derive(Debug)]
pub struct VFCandidateHydrator {
    client: Arc<dyn VisibilityClient>,
}

impl VFCandidateHydrator {
    pub fn new(client: Arc<dyn VisibilityClient>) -> Self {
        Self { client }
    }
}

impl Stage for VFCandidateHydrator {
    fn name(&self) -> &str {
        "VFCandidateHydrator"
    }
}

#[async_trait]
impl Hydrator for VFCandidateHydrator {
    async fn hydrate(&self, _query: &Query, candidates: &[Candidate]) -> anyhow::Result<Vec<Candidate>> {
        let in_network_ids: Vec<i64> = candidates
            .iter()
            .filter(|c| c.in_network == Some(true))
            .map(|c| c.tweet_id)
            .collect();
        let oon_ids: Vec<i64> = candidates
            .iter()
            .filter(|c| c.in_network != Some(true))
            .map(|c| c.tweet_id)
            .collect();

        let (in_network_reasons, oon_reasons) = tokio::join!(
            self.client.get_visibility_results(&in_network_ids),
            self.client.get_visibility_results(&oon_ids),
        );
        let in_network_reasons = in_network_reasons?;
        let oon_reasons = oon_reasons?;

        Ok(candidates
            .iter()
            .map(|c| {
                let reason = in_network_reasons
                    .get(&c.tweet_id)
                    .or_else(|| oon_reasons.get(&c.tweet_id))
                    .cloned();
                Candidate {
                    visibility_reason: reason,
                    ..Default::default()
                }
            })
            .collect())
    }

    fn update(&self, candidate: &mut Candidate, hydrated: &Candidate) {
        candidate.visibility_reason = hydrated.visibility_reason.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MockVisibilityClient;

    #[tokio::test]
    async fn merges_in_network_and_oon_lookups() {
        let client = Arc::new(MockVisibilityClient::new());
        client.set_reason(1, "spam");
        client.set_reason(2, "ok");
        let hydrator = VFCandidateHydrator::new(client);
        let candidates = vec![
            Candidate { tweet_id: 1, in_network: Some(true), ..Default::default() },
            Candidate { tweet_id: 2, in_network: Some(false), ..Default::default() },
        ];

        let hydrated = hydrator.hydrate(&Query::default(), &candidates).await.unwrap();
        assert_eq!(hydrated[0].visibility_reason.as_deref(), Some("spam"));
        assert_eq!(hydrated[1].visibility_reason.as_deref(), Some("ok"));
    }
}
