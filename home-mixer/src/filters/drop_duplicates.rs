//! Drops repeated candidates by tweet id, keeping the first occurrence
//! (sources can legitimately surface the same post twice).

use std::collections::HashSet;

use async_trait::async_trait;
use candidate_pipeline::stages::{Filter, Stage};
use candidate_pipeline::types::{Candidate, FilterResult, Query};

#[derive(Debug, Default)]
pub struct DropDuplicatesFilter;

impl DropDuplicatesFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for DropDuplicatesFilter {
    fn name(&self) -> &str {
        "DropDuplicatesFilter"
    }
}

#[async_trait]
impl Filter for DropDuplicatesFilter {
    async fn filter(&self, _query: &Query, candidates: &[Candidate]) -> anyhow::Result<FilterResult> {
        let mut seen = HashSet::new();
        let mut kept = Vec::new();
        let mut removed = Vec::new();
        for candidate in candidates {
            if seen.insert(candidate.tweet_id) {
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
    async fn keeps_first_occurrence_of_each_tweet_id() {
        let filter = DropDuplicatesFilter::new();
        let candidates = vec![
            Candidate { tweet_id: 1, ..Default::default() },
            Candidate { tweet_id: 2, ..Default::default() },
            Candidate { tweet_id: 1, ..Default::default() },
        ];
        let result = filter.filter(&Query::default(), &candidates).await.unwrap();
        assert_eq!(result.kept.len(), 2);
        assert_eq!(result.removed.len(), 1);
    }
}
