//! Assembles the for-you timeline's [`CandidatePipeline`]: sources, hydrators,
//! filters, scorers, selector and side effects, wired in the fixed order the
//! pipeline executor runs them in.

use std::sync::Arc;

use candidate_pipeline::CandidatePipeline;

use crate::clients::{
    GizmoduckClient, MockGizmoduckClient, MockPhoenixRetrievalClient, MockRankingClient,
    MockRequestInfoCacheClient, MockSubscriptionClient, MockThunderClient, MockTweetEntityClient,
    MockUserActionSequenceFetcher, MockUserFeaturesClient, MockVisibilityClient,
    PhoenixRetrievalClient, RankingClient, RequestInfoCacheClient, SubscriptionClient,
    ThunderClient, TweetEntityClient, UserActionSequenceFetcher, UserFeaturesClient,
    VisibilityClient,
};
use crate::filters::age::AgeFilter;
use crate::filters::author_social_graph::AuthorSocialgraphFilter;
use crate::filters::core_data_hydration::CoreDataHydrationFilter;
use crate::filters::dedup_conversation::DedupConversationFilter;
use crate::filters::drop_duplicates::DropDuplicatesFilter;
use crate::filters::ineligible_subscription::IneligibleSubscriptionFilter;
use crate::filters::muted_keyword::MutedKeywordFilter;
use crate::filters::previously_seen::PreviouslySeenPostsFilter;
use crate::filters::previously_served::PreviouslyServedPostsFilter;
use crate::filters::retweet_dedup::RetweetDeduplicationFilter;
use crate::filters::self_tweet::SelfTweetFilter;
use crate::filters::visibility::VFFilter;
use crate::hydrators::core_data::CoreDataCandidateHydrator;
use crate::hydrators::gizmoduck::GizmoduckCandidateHydrator;
use crate::hydrators::in_network::InNetworkCandidateHydrator;
use crate::hydrators::subscription::SubscriptionHydrator;
use crate::hydrators::video_duration::VideoDurationCandidateHydrator;
use crate::hydrators::visibility::VFCandidateHydrator;
use crate::query_hydrators::user_action_sequence::UserActionSeqQueryHydrator;
use crate::query_hydrators::user_features::UserFeaturesQueryHydrator;
use crate::scorers::author_diversity::AuthorDiversityScorer;
use crate::scorers::oon::OonScorer;
use crate::scorers::ranking::RankingScorer;
use crate::scorers::weighted_scorer::WeightedScorer;
use crate::selectors::top_k::TopKScoreSelector;
use crate::side_effects::cache_request_info::CacheRequestInfoSideEffect;
use crate::sources::in_network::InNetworkSource;
use crate::sources::out_of_network::OutOfNetworkSource;

/// The full set of collaborator clients the pipeline's stages depend on.
/// Bundled together so `build` and `build_mock` only have one argument each.
pub struct Clients {
    pub thunder: Arc<dyn ThunderClient>,
    pub phoenix_retrieval: Arc<dyn PhoenixRetrievalClient>,
    pub user_action_sequence: Arc<dyn UserActionSequenceFetcher>,
    pub user_features: Arc<dyn UserFeaturesClient>,
    pub tweet_entity: Arc<dyn TweetEntityClient>,
    pub gizmoduck: Arc<dyn GizmoduckClient>,
    pub subscription: Arc<dyn SubscriptionClient>,
    pub visibility: Arc<dyn VisibilityClient>,
    pub ranking: Arc<dyn RankingClient>,
    pub request_info_cache: Arc<dyn RequestInfoCacheClient>,
}

impl Clients {
    /// Mock clients backed by in-memory maps, useful for local runs and
    /// integration tests without any real backends.
    pub fn mock() -> Self {
        Self {
            thunder: Arc::new(MockThunderClient::new()),
            phoenix_retrieval: Arc::new(MockPhoenixRetrievalClient::new()),
            user_action_sequence: Arc::new(MockUserActionSequenceFetcher::new()),
            user_features: Arc::new(MockUserFeaturesClient::new()),
            tweet_entity: Arc::new(MockTweetEntityClient::new()),
            gizmoduck: Arc::new(MockGizmoduckClient::new()),
            subscription: Arc::new(MockSubscriptionClient::new()),
            visibility: Arc::new(MockVisibilityClient::new()),
            ranking: Arc::new(MockRankingClient::new()),
            request_info_cache: Arc::new(MockRequestInfoCacheClient::new()),
        }
    }
}

/// Builds the for-you timeline pipeline: out-of-network retrieval first,
/// then in-network, so the scorers/selector see both streams before ranking.
pub fn build(clients: Clients, result_size: usize) -> CandidatePipeline {
    CandidatePipeline {
        query_hydrators: vec![
            Box::new(UserActionSeqQueryHydrator::new(clients.user_action_sequence.clone())),
            Box::new(UserFeaturesQueryHydrator::new(clients.user_features.clone())),
        ],
        sources: vec![
            Box::new(OutOfNetworkSource::new(clients.phoenix_retrieval.clone())),
            Box::new(InNetworkSource::new(clients.thunder.clone())),
        ],
        hydrators: vec![
            Box::new(InNetworkCandidateHydrator::new()),
            Box::new(CoreDataCandidateHydrator::new(clients.tweet_entity.clone())),
            Box::new(VideoDurationCandidateHydrator::new(clients.tweet_entity.clone())),
            Box::new(SubscriptionHydrator::new(clients.subscription.clone())),
            Box::new(GizmoduckCandidateHydrator::new(clients.gizmoduck.clone())),
        ],
        filters: vec![
            Box::new(DropDuplicatesFilter::new()),
            Box::new(CoreDataHydrationFilter::new()),
            Box::new(AgeFilter::new(std::time::Duration::from_secs(crate::params::MAX_POST_AGE))),
            Box::new(SelfTweetFilter::new()),
            Box::new(RetweetDeduplicationFilter::new()),
            Box::new(IneligibleSubscriptionFilter::new()),
            Box::new(PreviouslySeenPostsFilter::new()),
            Box::new(PreviouslyServedPostsFilter::new()),
            Box::new(MutedKeywordFilter::new()),
            Box::new(AuthorSocialgraphFilter::new()),
        ],
        scorers: vec![
            Box::new(RankingScorer::new(clients.ranking.clone())),
            Box::new(WeightedScorer::new()),
            Box::new(AuthorDiversityScorer::new()),
            Box::new(OonScorer::new()),
        ],
        selector: Box::new(TopKScoreSelector::new(result_size)),
        post_selection_hydrators: vec![Box::new(VFCandidateHydrator::new(clients.visibility.clone()))],
        post_selection_filters: vec![Box::new(VFFilter::new()), Box::new(DedupConversationFilter::new())],
        side_effects: Arc::new(vec![Box::new(CacheRequestInfoSideEffect::new(
            clients.request_info_cache.clone(),
        ))]),
        result_size,
    }
}

/// Convenience constructor wired with all-mock clients, for tests and local
/// bring-up without any real backends configured.
pub fn build_mock(result_size: usize) -> CandidatePipeline {
    build(Clients::mock(), result_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candidate_pipeline::types::Query;

    #[tokio::test]
    async fn empty_mock_pipeline_returns_no_candidates() {
        let pipeline = build_mock(crate::params::RESULT_SIZE);
        let query = Query { user_id: 1, ..Default::default() };
        let result = pipeline.execute(&query).await;
        assert!(result.selected_candidates.is_empty());
    }
}
