//! Drops posts older than the configured max age, decoded straight from the
//! snowflake id. Decode results are memoized since the same tweet id is
//! often re-checked across nearby requests.

use std::time::Duration;

use async_trait::async_trait;
use candidate_pipeline::stages::{Filter, Stage};
use candidate_pipeline::types::{Candidate, FilterResult, Query};
use moka::sync::Cache;

use crate::util::snowflake;

pub struct AgeFilter {
    max_age: Duration,
    within_age_cache: Cache<i64, bool>,
}

impl AgeFilter {
    pub fn new(max_age: Duration) -> Self {
        Self {
            max_age,
            within_age_cache: Cache::builder()
                .max_capacity(100_000)
                .time_to_live(Duration::from_secs(3600))
                .build(),
        }
    }

    fn is_within_age(&self, tweet_id: i64) -> bool {
        if let Some(cached) = self.within_age_cache.get(&tweet_id) {
            return cached;
        }
        let within_age = match snowflake::duration_since_creation_opt(tweet_id) {
            Some(age) => age <= self.max_age,
            None => true,
        };
        self.within_age_cache.insert(tweet_id, within_age);
        within_age
    }
}

impl std::fmt::Debug for AgeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgeFilter").field("max_age", &self.max_age).finish()
    }
}

impl Stage for AgeFilter {
    fn name(&self) -> &str {
        "AgeFilter"
    }
}

#[async_trait]
impl Filter for AgeFilter {
    async fn filter(&self, _query: &Query, candidates: &[Candidate]) -> anyhow::Result<FilterResult> {
        let (kept, removed): (Vec<_>, Vec<_>) = candidates
            .iter()
            .cloned()
            .partition(|c| self.is_within_age(c.tweet_id));
        Ok(FilterResult { kept, removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::snowflake::from_timestamp;

    #[tokio::test]
    async fn drops_posts_older_than_max_age() {
        let filter = AgeFilter::new(Duration::from_secs(3600));
        let now_ms = chrono::Utc::now().timestamp_millis();
        let fresh = from_timestamp(now_ms - 1_000);
        let stale = from_timestamp(now_ms - 7_200_000);

        let candidates = vec![
            Candidate { tweet_id: fresh, ..Default::default() },
            Candidate { tweet_id: stale, ..Default::default() },
        ];
        let result = filter.filter(&Query::default(), &candidates).await.unwrap();
        assert_eq!(result.kept.len(), 1);
        assert_eq!(result.removed.len(), 1);
    }

    #[tokio::test]
    async fn repeated_lookups_hit_the_cache() {
        let filter = AgeFilter::new(Duration::from_secs(3600));
        let tweet_id = from_timestamp(chrono::Utc::now().timestamp_millis());
        assert!(filter.is_within_age(tweet_id));
        assert!(filter.is_within_age(tweet_id));
        assert_eq!(filter.within_age_cache.entry_count(), 1);
    }
}
