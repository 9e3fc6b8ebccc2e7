//! Drops subscriber-only posts the viewer isn't subscribed to. Posts with no
//! subscription author attached (the common case) always pass.

use async_trait::async_trait;
use candidate_pipeline::stages::{Filter, Stage};
use candidate_pipeline::types::{Candidate, FilterResult, Query};

#[derive(Debug, Default)]
pub struct IneligibleSubscriptionFilter;

impl IneligibleSubscriptionFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for IneligibleSubscriptionFilter {
    fn name(&self) -> &str {
        "IneligibleSubscriptionFilter"
    }
}

#[async_trait]
impl Filter for IneligibleSubscriptionFilter {
    async fn filter(&self, query: &Query, candidates: &[Candidate]) -> anyhow::Result<FilterResult> {
        let subscribed: std::collections::HashSet<i64> =
            query.user_features.subscribed_user_ids.iter().copied().collect();

        let (kept, removed): (Vec<_>, Vec<_>) = candidates.iter().cloned().partition(|c| {
            match c.subscription_author_id {
                None => true,
                Some(author_id) => subscribed.contains(&(author_id as i64)),
            }
        });

        Ok(FilterResult { kept, removed })
    }
}
