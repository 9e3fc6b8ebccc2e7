//! Drops posts the viewer already saw, either by exact id or by membership
//! in one of the request's impression bloom filters. Checks the post's own
//! id plus its retweet/reply lineage, since seeing a retweet counts as
//! having seen its original too.

use async_trait::async_trait;
use candidate_pipeline::stages::{Filter, Stage};
use candidate_pipeline::types::{Candidate, FilterResult, Query};

use crate::util::bloom_filter::BloomFilter;

#[derive(Debug, Default)]
pub struct PreviouslySeenPostsFilter;

impl PreviouslySeenPostsFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for PreviouslySeenPostsFilter {
    fn name(&self) -> &str {
        "PreviouslySeenPostsFilter"
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
impl Filter for PreviouslySeenPostsFilter {
    async fn filter(&self, query: &Query, candidates: &[Candidate]) -> anyhow::Result<FilterResult> {
        let seen_ids: std::collections::HashSet<i64> = query.seen_ids.iter().copied().collect();
        let filters: Vec<BloomFilter> = query
            .bloom_filter_entries
            .iter()
            .filter_map(|entry| BloomFilter::from_entry(&entry.data))
            .collect();

        let (kept, removed): (Vec<_>, Vec<_>) = candidates.iter().cloned().partition(|c| {
            !related_post_ids(c).iter().any(|id| {
                seen_ids.contains(id) || filters.iter().any(|f| f.may_contain(*id))
            })
        });

        Ok(FilterResult { kept, removed })
    }
}
