//! Drops posts whose text contains one of the viewer's muted keywords,
//! matched as a contiguous token subsequence rather than a raw substring so
//! "news" doesn't match "newsletter".

use async_trait::async_trait;
use candidate_pipeline::stages::{Filter, Stage};
use candidate_pipeline::types::{Candidate, FilterResult, Query};

use crate::util::tokenizer::{self, UserMutes};

#[derive(Debug, Default)]
pub struct MutedKeywordFilter;

impl MutedKeywordFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for MutedKeywordFilter {
    fn name(&self) -> &str {
        "MutedKeywordFilter"
    }

    fn enabled(&self, query: &Query) -> bool {
        !query.user_features.muted_keywords.is_empty()
    }
}

#[async_trait]
impl Filter for MutedKeywordFilter {
    async fn filter(&self, query: &Query, candidates: &[Candidate]) -> anyhow::Result<FilterResult> {
        let mutes = UserMutes::new(&query.user_features.muted_keywords);
        if mutes.is_empty() {
            return Ok(FilterResult {
                kept: candidates.to_vec(),
                removed: Vec::new(),
            });
        }

        let (kept, removed): (Vec<_>, Vec<_>) = candidates.iter().cloned().partition(|c| {
            let tokens = tokenizer::tokenize(&c.tweet_text, true);
            !mutes.matches(&tokens)
        });

        Ok(FilterResult { kept, removed })
    }
}
