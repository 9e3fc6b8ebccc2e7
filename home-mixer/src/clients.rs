//! Abstract collaborator clients the pipeline stages depend on, and the
//! in-memory mocks used for tests and local wiring. Mirrors
//! [`thunder::query_service::FollowingListClient`]'s pattern: a trait at the
//! collaborator boundary plus a `dashmap`-backed mock, since the real
//! backends (Strato, Gizmoduck, TweetEntityService, Thunder, Phoenix) are out
//! of scope here.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;

use candidate_pipeline::types::{PhoenixScores, UserActionSequence, UserFeatures};

/// A post as returned by Thunder's in-network fan-in query.
#[derive(Clone, Debug, Default)]
pub struct ThunderPost {
    pub tweet_id: i64,
    pub author_id: u64,
    pub in_reply_to_tweet_id: Option<i64>,
    pub conversation_id: Option<i64>,
    pub is_retweet: bool,
    pub source_tweet_id: Option<i64>,
    pub source_user_id: Option<u64>,
}

/// In-network candidate retrieval, backed by the Thunder fan-in service.
#[async_trait]
pub trait ThunderClient: Send + Sync {
    async fn get_in_network_posts(
        &self,
        viewer_id: u64,
        following_user_ids: &[i64],
    ) -> anyhow::Result<Vec<ThunderPost>>;
}

#[derive(Debug, Default)]
pub struct MockThunderClient {
    posts: DashMap<u64, Vec<ThunderPost>>,
}

impl MockThunderClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_posts(&self, viewer_id: u64, posts: Vec<ThunderPost>) {
        self.posts.insert(viewer_id, posts);
    }
}

#[async_trait]
impl ThunderClient for MockThunderClient {
    async fn get_in_network_posts(
        &self,
        viewer_id: u64,
        _following_user_ids: &[i64],
    ) -> anyhow::Result<Vec<ThunderPost>> {
        Ok(self.posts.get(&viewer_id).map(|r| r.clone()).unwrap_or_default())
    }
}

/// A single out-of-network candidate surfaced by the Phoenix retrieval
/// service.
#[derive(Clone, Debug, Default)]
pub struct TweetInfo {
    pub tweet_id: i64,
    pub author_id: u64,
    pub in_reply_to_tweet_id: Option<i64>,
}

/// Out-of-network candidate retrieval.
#[async_trait]
pub trait PhoenixRetrievalClient: Send + Sync {
    async fn get_candidates(&self, user_id: i64) -> anyhow::Result<Vec<TweetInfo>>;
}

#[derive(Debug, Default)]
pub struct MockPhoenixRetrievalClient {
    candidates: DashMap<i64, Vec<TweetInfo>>,
}

impl MockPhoenixRetrievalClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_candidates(&self, user_id: i64, candidates: Vec<TweetInfo>) {
        self.candidates.insert(user_id, candidates);
    }
}

#[async_trait]
impl PhoenixRetrievalClient for MockPhoenixRetrievalClient {
    async fn get_candidates(&self, user_id: i64) -> anyhow::Result<Vec<TweetInfo>> {
        Ok(self.candidates.get(&user_id).map(|r| r.clone()).unwrap_or_default())
    }
}

/// Fetches the viewer's recent action-sequence embedding for ranking.
#[async_trait]
pub trait UserActionSequenceFetcher: Send + Sync {
    async fn get_by_user_id(&self, user_id: u64) -> anyhow::Result<Option<UserActionSequence>>;
}

#[derive(Debug, Default)]
pub struct MockUserActionSequenceFetcher {
    sequences: DashMap<u64, UserActionSequence>,
}

impl MockUserActionSequenceFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_sequence(&self, user_id: u64, sequence: UserActionSequence) {
        self.sequences.insert(user_id, sequence);
    }
}

#[async_trait]
impl UserActionSequenceFetcher for MockUserActionSequenceFetcher {
    async fn get_by_user_id(&self, user_id: u64) -> anyhow::Result<Option<UserActionSequence>> {
        Ok(self.sequences.get(&user_id).map(|r| r.clone()))
    }
}

/// Fetches viewer-level mute/block/follow/subscription lists.
#[async_trait]
pub trait UserFeaturesClient: Send + Sync {
    async fn get_user_features(&self, user_id: u64) -> anyhow::Result<UserFeatures>;
}

#[derive(Debug, Default)]
pub struct MockUserFeaturesClient {
    features: DashMap<u64, UserFeatures>,
}

impl MockUserFeaturesClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_features(&self, user_id: u64, features: UserFeatures) {
        self.features.insert(user_id, features);
    }
}

#[async_trait]
impl UserFeaturesClient for MockUserFeaturesClient {
    async fn get_user_features(&self, user_id: u64) -> anyhow::Result<UserFeatures> {
        Ok(self.features.get(&user_id).map(|r| r.clone()).unwrap_or_default())
    }
}

/// Core tweet data: text, author, and reply/retweet lineage.
#[derive(Clone, Debug, Default)]
pub struct TweetCoreData {
    pub text: String,
    pub author_id: u64,
    pub source_tweet_id: Option<u64>,
    pub source_user_id: Option<u64>,
    pub in_reply_to_tweet_id: Option<u64>,
}

/// Batch fetch of core tweet data, keyed by tweet id.
#[async_trait]
pub trait TweetEntityClient: Send + Sync {
    async fn get_tweet_core_datas(
        &self,
        tweet_ids: &[i64],
    ) -> anyhow::Result<HashMap<i64, TweetCoreData>>;

    /// First video's duration in milliseconds, if the tweet has media.
    async fn get_tweet_media_entities(
        &self,
        tweet_ids: &[i64],
    ) -> anyhow::Result<HashMap<i64, i32>>;
}

#[derive(Debug, Default)]
pub struct MockTweetEntityClient {
    core_data: DashMap<i64, TweetCoreData>,
    media: DashMap<i64, i32>,
}

impl MockTweetEntityClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_core_data(&self, tweet_id: i64, data: TweetCoreData) {
        self.core_data.insert(tweet_id, data);
    }

    pub fn set_video_duration_ms(&self, tweet_id: i64, duration_ms: i32) {
        self.media.insert(tweet_id, duration_ms);
    }
}

#[async_trait]
impl TweetEntityClient for MockTweetEntityClient {
    async fn get_tweet_core_datas(
        &self,
        tweet_ids: &[i64],
    ) -> anyhow::Result<HashMap<i64, TweetCoreData>> {
        Ok(tweet_ids
            .iter()
            .filter_map(|id| self.core_data.get(id).map(|r| (*id, r.clone())))
            .collect())
    }

    async fn get_tweet_media_entities(
        &self,
        tweet_ids: &[i64],
    ) -> anyhow::Result<HashMap<i64, i32>> {
        Ok(tweet_ids
            .iter()
            .filter_map(|id| self.media.get(id).map(|r| (*id, *r)))
            .collect())
    }
}

/// Author profile lookups (screen name, follower count).
#[derive(Clone, Debug, Default)]
pub struct UserInfo {
    pub screen_name: String,
    pub followers_count: i32,
}

#[async_trait]
pub trait GizmoduckClient: Send + Sync {
    async fn get_users(&self, user_ids: &[u64]) -> anyhow::Result<HashMap<u64, UserInfo>>;
}

#[derive(Debug, Default)]
pub struct MockGizmoduckClient {
    users: DashMap<u64, UserInfo>,
}

impl MockGizmoduckClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_user(&self, user_id: u64, info: UserInfo) {
        self.users.insert(user_id, info);
    }
}

#[async_trait]
impl GizmoduckClient for MockGizmoduckClient {
    async fn get_users(&self, user_ids: &[u64]) -> anyhow::Result<HashMap<u64, UserInfo>> {
        Ok(user_ids
            .iter()
            .filter_map(|id| self.users.get(id).map(|r| (*id, r.clone())))
            .collect())
    }
}

/// Resolves paid-subscription authorship (for `IneligibleSubscriptionFilter`).
#[async_trait]
pub trait SubscriptionClient: Send + Sync {
    async fn get_subscription_author_ids(
        &self,
        tweet_ids: &[i64],
    ) -> anyhow::Result<HashMap<i64, u64>>;
}

#[derive(Debug, Default)]
pub struct MockSubscriptionClient {
    subscriptions: DashMap<i64, u64>,
}

impl MockSubscriptionClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_subscription_author(&self, tweet_id: i64, author_id: u64) {
        self.subscriptions.insert(tweet_id, author_id);
    }
}

#[async_trait]
impl SubscriptionClient for MockSubscriptionClient {
    async fn get_subscription_author_ids(
        &self,
        tweet_ids: &[i64],
    ) -> anyhow::Result<HashMap<i64, u64>> {
        Ok(tweet_ids
            .iter()
            .filter_map(|id| self.subscriptions.get(id).map(|r| (*id, *r)))
            .collect())
    }
}

/// Visibility filtering, run separately for in-network and out-of-network
/// candidates (see [`crate::hydrators::visibility`]).
#[async_trait]
pub trait VisibilityClient: Send + Sync {
    async fn get_visibility_results(
        &self,
        tweet_ids: &[i64],
    ) -> anyhow::Result<HashMap<i64, String>>;
}

#[derive(Debug, Default)]
pub struct MockVisibilityClient {
    reasons: DashMap<i64, String>,
}

impl MockVisibilityClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_reason(&self, tweet_id: i64, reason: impl Into<String>) {
        self.reasons.insert(tweet_id, reason.into());
    }
}

#[async_trait]
impl VisibilityClient for MockVisibilityClient {
    async fn get_visibility_results(
        &self,
        tweet_ids: &[i64],
    ) -> anyhow::Result<HashMap<i64, String>> {
        Ok(tweet_ids
            .iter()
            .filter_map(|id| self.reasons.get(id).map(|r| (*id, r.clone())))
            .collect())
    }
}

/// The ranking model's batch prediction call. Predictions are keyed by the
/// tweet id used to look them up (the retweeted original's id for retweets,
/// so retweets of the same post share one prediction).
#[async_trait]
pub trait RankingClient: Send + Sync {
    async fn predict(
        &self,
        user_id: i64,
        tweet_ids: &[i64],
    ) -> anyhow::Result<(HashMap<i64, PhoenixScores>, u64)>;
}

/// Deterministic pseudo-scores, useful for tests and local wiring without a
/// real model server.
#[derive(Debug, Default)]
pub struct MockRankingClient;

impl MockRankingClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RankingClient for MockRankingClient {
    async fn predict(
        &self,
        _user_id: i64,
        tweet_ids: &[i64],
    ) -> anyhow::Result<(HashMap<i64, PhoenixScores>, u64)> {
        let mut scores = HashMap::new();
        for (i, tweet_id) in tweet_ids.iter().enumerate() {
            let base = 0.3 + (i % 10) as f64 * 0.05;
            scores.insert(
                *tweet_id,
                PhoenixScores {
                    favorite_score: Some(base),
                    reply_score: Some(base * 0.5),
                    retweet_score: Some(base * 0.4),
                    photo_expand_score: Some(base * 0.2),
                    click_score: Some(base * 0.6),
                    profile_click_score: Some(base * 0.1),
                    vqv_score: Some(base * 0.3),
                    share_score: Some(base * 0.1),
                    share_via_dm_score: Some(base * 0.05),
                    share_via_copy_link_score: Some(base * 0.05),
                    dwell_score: Some(base * 0.7),
                    quote_score: Some(base * 0.1),
                    quoted_click_score: Some(base * 0.1),
                    follow_author_score: Some(base * 0.05),
                    not_interested_score: Some((1.0 - base) * 0.02),
                    block_author_score: Some((1.0 - base) * 0.01),
                    mute_author_score: Some((1.0 - base) * 0.01),
                    report_score: Some((1.0 - base) * 0.005),
                    dwell_time: Some(base * 1000.0),
                },
            );
        }
        Ok((scores, 1))
    }
}

/// Records which posts were served in this response, for future
/// previously-served filtering.
#[async_trait]
pub trait RequestInfoCacheClient: Send + Sync {
    async fn store_request_info(&self, user_id: i64, tweet_ids: &[i64]) -> anyhow::Result<()>;
}

#[derive(Debug, Default)]
pub struct MockRequestInfoCacheClient {
    stored: DashMap<i64, Vec<i64>>,
}

impl MockRequestInfoCacheClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored_for(&self, user_id: i64) -> Vec<i64> {
        self.stored.get(&user_id).map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl RequestInfoCacheClient for MockRequestInfoCacheClient {
    async fn store_request_info(&self, user_id: i64, tweet_ids: &[i64]) -> anyhow::Result<()> {
        self.stored.insert(user_id, tweet_ids.to_vec());
        Ok(())
    }
}
