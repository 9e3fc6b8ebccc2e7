//! Marks whether each candidate's author is the viewer themselves or someone
//! the viewer follows. Runs in the main hydration stage so the flag is
//! already set by the time the post-selection visibility hydrator and the
//! OON scorer read it.

use std::collections::HashSet;

use async_trait::async_trait;
use candidate_pipeline::stages::{Hydrator, Stage};
use candidate_pipeline::types::{Candidate, Query};

#[derive(Debug, Default)]
pub struct InNetworkCandidateHydrator;

impl InNetworkCandidateHydrator {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for InNetworkCandidateHydrator {
    fn name(&self) -> &str {
        "InNetworkCandidateHydrator"
    }
}

#[async_trait]
impl Hydrator for InNetworkCandidateHydrator {
    async fn hydrate(&self, query: &Query, candidates: &[Candidate]) -> anyhow::Result<Vec<Candidate>> {
        let viewer_id = query.user_id as u64;
        let followed: HashSet<u64> = query
            .user_features
            .followed_user_ids
            .iter()
            .map(|&id| id as u64)
            .collect();

        Ok(candidates
            .iter()
            .map(|c| Candidate {
                in_network: Some(c.author_id == viewer_id || followed.contains(&c.author_id)),
                ..Default::default()
            })
            .collect())
    }

    fn update(&self, candidate: &mut Candidate, hydrated: &Candidate) {
        candidate.in_network = hydrated.in_network;
    }
}
