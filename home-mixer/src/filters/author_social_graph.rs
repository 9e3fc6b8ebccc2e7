//! Drops posts from blocked or muted authors. Skips straight through when
//! the viewer has neither list, which is the common case.

use async_trait::async_trait;
use candidate_pipeline::stages::{Filter, Stage};
use candidate_pipeline::types::{Candidate, FilterResult, Query};

#[derive(Debug, Default)]
pub struct AuthorSocialgraphFilter;

impl AuthorSocialgraphFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for AuthorSocialgraphFilter {
    fn name(&self) -> &str {
        "AuthorSocialgraphFilter"
    }
}

#[async_trait]
impl Filter for AuthorSocialgraphFilter {
    async fn filter(&self, query: &Query, candidates: &[Candidate]) -> anyhow::Result<FilterResult> {
        if query.user_features.blocked_user_ids.is_empty() && query.user_features.muted_user_ids.is_empty() {
            return Ok(FilterResult {
                kept: candidates.to_vec(),
                removed: Vec::new(),
            });
        }

        let blocked: std::collections::HashSet<i64> = query.user_features.blocked_user_ids.iter().copied().collect();
        let muted: std::collections::HashSet<i64> = query.user_features.muted_user_ids.iter().copied().collect();

        let (kept, removed): (Vec<_>, Vec<_>) = candidates.iter().cloned().partition(|c| {
            let author_id = c.author_id as i64;
            !blocked.contains(&author_id) && !muted.contains(&author_id)
        });

        Ok(FilterResult { kept, removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candidate_pipeline::types::UserFeatures;

    #[tokio::test]
    async fn passes_everything_when_no_lists_are_set() {
        let filter = AuthorSocialgraphFilter::new();
        let candidates = vec![Candidate { author_id: 1, ..Default::default() }];
        let result = filter.filter(&Query::default(), &candidates).await.unwrap();
        assert_eq!(result.kept.len(), 1);
    }

    #[tokio::test]
    async fn drops_blocked_and_muted_authors() {
        let filter = AuthorSocialgraphFilter::new();
        let query = Query {
            user_features: UserFeatures {
                blocked_user_ids: vec![1],
                muted_user_ids: vec![2],
                ..Default::default()
            },
            ..Default::default()
        };
        let candidates = vec![
            Candidate { author_id: 1, ..Default::default() },
            Candidate { author_id: 2, ..Default::default() },
            Candidate { author_id: 3, ..Default::default() },
        ];
        let result = filter.filter(&query, &candidates).await.unwrap();
        assert_eq!(result.kept.len(), 1);
        assert_eq!(result.kept[0].author_id, 3);
    }
}
