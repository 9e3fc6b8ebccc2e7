//! Post-selection: drops candidates the visibility-filtering hydrator
//! flagged as unsafe to serve.

use async_trait::async_trait;
use candidate_pipeline::stages::{Filter, Stage};
use candidate_pipeline::types::{Candidate, FilterResult, Query};

const DROP_MARKERS: [&str; 7] = ["drop", "deleted", "spam", "violence", "gore", "blocked", "filtered"];

fn should_drop(reason: &str) -> bool {
    let lower = reason.to_lowercase();
    DROP_MARKERS.iter().any(|marker| lower.contains(marker))
}

#[derive(Debug, Default)]
pub struct VFFilter;

impl VFFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for VFFilter {
    fn name(&self) -> &str {
        "VFFilter"
    }
}

#[async_trait]
impl Filter for VFFilter {
    async fn filter(&self, _query: &Query, candidates: &[Candidate]) -> anyhow::Result<FilterResult> {
        let (kept, removed): (Vec<_>, Vec<_>) = candidates.iter().cloned().partition(|c| {
            !c.visibility_reason.as_deref().is_some_and(should_drop)
        });
        Ok(FilterResult { kept, removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drops_candidates_with_a_drop_reason() {
        let filter = VFFilter::new();
        let candidates = vec![
            Candidate { visibility_reason: Some("Spam Detected".into()), ..Default::default() },
            Candidate { visibility_reason: Some("ok".into()), ..Default::default() },
            Candidate { visibility_reason: None, ..Default::default() },
        ];
        let result = filter.filter(&Query::default(), &candidates).await.unwrap();
        assert_eq!(result.kept.len(), 2);
        assert_eq!(result.removed.len(), 1);
    }
}
