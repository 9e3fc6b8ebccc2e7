//! Drops posts already served in a previous response this session. Only
//! relevant to bottom-of-timeline pagination requests; a fresh top-of-feed
//! request has nothing to dedupe against yet.

use async_trait::async_trait;
use candidate_pipeline::stages::{Filter, Stage};
use candidate_pipeline::types::{Candidate, FilterResult, Query};

#[derive(Debug, Default)]
pub struct PreviouslyServedPostsFilter;

impl PreviouslyServedPostsFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for PreviouslyServedPostsFilter {
    fn name(&self) -> &str {
        "PreviouslyServedPostsFilter"
    }

    fn enabled(&self, query: &Query) -> bool {
        query.is_bottom_request
    }
}

fn related_post_ids(candidate: &Candidate) -> Vec<i64> {
    let mut ids = vec![candidate.tweet_id];
    if let Some(id) = candidate.retweeted_tweet_id {
        ids.push(id as i64);
    }
    if let Some(id) = candidate.in_reply_to_tweet_id {
        ids.push(id as i64);
    }
    ids
}

#[async_trait]
impl Filter for PreviouslyServedPostsFilter {
    async fn filter(&self, query: &Query, candidates: &[Candidate]) -> anyhow::Result<FilterResult> {
        let served_ids: std::collections::HashSet<i64> = query.served_ids.iter().copied().collect();
        let (kept, removed): (Vec<_>, Vec<_>) = candidates
            .iter()
            .cloned()
            .partition(|c| !related_post_ids(c).iter().any(|id| served_ids.contains(id)));
        Ok(FilterResult { kept, removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn only_enabled_for_bottom_requests() {
        let filter = PreviouslyServedPostsFilter::new();
        assert!(!filter.enabled(&Query::default()));
        assert!(filter.enabled(&Query { is_bottom_request: true, ..Default::default() }));
    }

    #[tokio::test]
    async fn drops_already_served_posts() {
        let filter = PreviouslyServedPostsFilter::new();
        let query = Query { served_ids: vec![1], is_bottom_request: true, ..Default::default() };
        let candidates = vec![
            Candidate { tweet_id: 1, ..Default::default() },
            Candidate { tweet_id: 2, ..Default::default() },
        ];
        let result = filter.filter(&query, &candidates).await.unwrap();
        assert_eq!(result.kept.len(), 1);
        assert_eq!(result.kept[0].tweet_id, 2);
    }
}
