//! Drops the viewer's own posts from out-of-network retrieval (in-network
//! already excludes them at the source).

use async_trait::async_trait;
use candidate_pipeline::stages::{Filter, Stage};
use candidate_pipeline::types::{Candidate, FilterResult, Query};

#[derive(Debug, Default)]
pub struct SelfTweetFilter;

impl SelfTweetFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for SelfTweetFilter {
    fn name(&self) -> &str {
        "SelfTweetFilter"
    }
}

#[async_trait]
impl Filter for SelfTweetFilter {
    async fn filter(&self, query: &Query, candidates: &[Candidate]) -> anyhow::Result<FilterResult> {
        let viewer_id = query.user_id as u64;
        let (kept, removed): (Vec<_>, Vec<_>) =
            candidates.iter().cloned().partition(|c| c.author_id != viewer_id);
        Ok(FilterResult { kept, removed })
    }
}
