//! Fetches author (and, for retweets, retweeted-author) screen names and
//! follower counts from the user-profile service.

use std::sync::Arc;

use async_trait::async_trait;
use candidate_pipeline::stages::{Hydrator, Stage};
use candidate_pipeline::types::{Candidate, Query};

use crate::clients::GizmoduckClient;

#[derive(Debug)]
pub struct GizmoduckCandidateHydrator {
    client: Arc<dyn GizmoduckClient>,
}

impl GizmoduckCandidateHydrator {
    pub fn new(client: Arc<dyn GizmoduckClient>) -> Self {
        Self { client }
    }
}

impl Stage for GizmoduckCandidateHydrator {
    fn name(&self) -> &str {
        "GizmoduckCandidateHydrator"
    }
}

#[async_trait]
impl Hydrator for GizmoduckCandidateHydrator {
    async fn hydrate(&self, _query: &Query, candidates: &[Candidate]) -> anyhow::Result<Vec<Candidate>> {
        let mut user_ids: Vec<u64> = candidates.iter().map(|c| c.author_id).collect();
        user_ids.extend(candidates.iter().filter_map(|c| c.retweeted_user_id));
        user_ids.sort_unstable();
        user_ids.dedup();

        let users = self.client.get_users(&user_ids).await?;

        Ok(candidates
            .iter()
            .map(|c| Candidate {
                author_screen_name: users.get(&c.author_id).map(|u| u.screen_name.clone()),
                author_followers_count: users.get(&c.author_id).map(|u| u.followers_count),
                retweeted_screen_name: c
                    .retweeted_user_id
                    .and_then(|id| users.get(&id))
                    .map(|u| u.screen_name.clone()),
                ..Default::default()
            })
            .collect())
    }

    fn update(&self, candidate: &mut Candidate, hydrated: &Candidate) {
        candidate.author_screen_name = hydrated.author_screen_name.clone();
        candidate.author_followers_count = hydrated.author_followers_count;
        candidate.retweeted_screen_name = hydrated.retweeted_screen_name.clone();
    }
}
