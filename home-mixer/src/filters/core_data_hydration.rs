//! Drops candidates that core-data hydration couldn't resolve: a missing
//! author or empty tweet text means the post is gone or the hydrator
//! call failed for that id.

use async_trait::async_trait;
use candidate_pipeline::stages::{Filter, Stage};
use candidate_pipeline::types::{Candidate, FilterResult, Query};

#[derive(Debug, Default)]
pub struct CoreDataHydrationFilter;

impl CoreDataHydrationFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for CoreDataHydrationFilter {
    fn name(&self) -> &str {
        "CoreDataHydrationFilter"
    }
}

#[async_trait]
impl Filter for CoreDataHydrationFilter {
    async fn filter(&self, _query: &Query, candidates: &[Candidate]) -> anyhow::Result<FilterResult> {
        let (kept, removed): (Vec<_>, Vec<_>) = candidates.iter().cloned().partition(|c| {
            c.author_id != 0 && !c.tweet_text.trim().is_empty()
        });
        Ok(FilterResult { kept, removed })
    }
}
