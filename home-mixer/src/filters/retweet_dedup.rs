//! Drops later duplicates of the same underlying post: a retweet after its
//! own original, a retweet after another retweet of the same original, or
//! an original after a retweet of itself already seen.

use std::collections::HashSet;

use async_trait::async_trait;
use candidate_pipeline::stages::{Filter, Stage};
use candidate_pipeline::types::{Candidate, FilterResult, Query};

#[derive(Debug, Default)]
pub struct RetweetDeduplicationFilter;

impl RetweetDeduplicationFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for RetweetDeduplicationFilter {
    fn name(&self) -> &str {
        "RetweetDeduplicationFilter"
    }
}

#[async_trait]
impl Filter for RetweetDeduplicationFilter {
    async fn filter(&self, _query: &Query, candidates: &[Candidate]) -> anyhow::Result<FilterResult> {
        let mut seen_tweet_ids: HashSet<u64> = HashSet::new();
        let mut kept = Vec::new();
        let mut removed = Vec::new();

        for candidate in candidates {
            let underlying_id = candidate.retweeted_tweet_id.unwrap_or(candidate.tweet_id as u64);
            if seen_tweet_ids.insert(underlying_id) {
                kept.push(candidate.clone());
            } else {
                removed.push(candidate.clone());
            }
        }

        Ok(FilterResult { kept, removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drops_later_retweet_of_an_already_seen_original() {
        let filter = RetweetDeduplicationFilter::new();
        let candidates = vec![
            Candidate { tweet_id: 1, ..Default::default() },
            Candidate { tweet_id: 2, retweeted_tweet_id: Some(1), ..Default::default() },
        ];
        let result = filter.filter(&Query::default(), &candidates).await.unwrap();
        assert_eq!(result.kept.len(), 1);
        assert_eq!(result.kept[0].tweet_id, 1);
    }

    #[tokio::test]
    async fn drops_second_retweet_of_the_same_original() {
        let filter = RetweetDeduplicationFilter::new();
        let candidates = vec![
            Candidate { tweet_id: 2, retweeted_tweet_id: Some(1), ..Default::default() },
            Candidate { tweet_id: 3, retweeted_tweet_id: Some(1), ..Default::default() },
        ];
        let result = filter.filter(&Query::default(), &candidates).await.unwrap();
        assert_eq!(result.kept.len(), 1);
        assert_eq!(result.kept[0].tweet_id, 2);
    }
}
