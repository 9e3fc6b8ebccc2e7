//! Value types shared by every stage of a candidate pipeline: the per-request
//! `Query`, the per-post `Candidate`, and the supporting prediction/feature
//! structures hydrators and scorers read and write.

use serde::{Deserialize, Serialize};

/// A request for a personalized feed, enriched in place as it passes through
/// the query-hydration stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Query {
    pub user_id: i64,
    pub client_app_id: i64,
    pub country_code: String,
    pub language_code: String,
    pub seen_ids: Vec<i64>,
    pub served_ids: Vec<i64>,
    pub in_network_only: bool,
    pub is_bottom_request: bool,
    pub bloom_filter_entries: Vec<BloomFilterEntry>,
    pub request_id: String,

    /// Populated by query hydrators; absent until hydrated.
    pub user_action_sequence: Option<UserActionSequence>,
    pub user_features: UserFeatures,
}

/// A serialized bloom filter bit-array, opaque to everything but the filter
/// that built and reads it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BloomFilterEntry {
    pub data: Vec<u8>,
}

/// The viewer's recent interaction history, used by the ranking scorer to
/// condition its predictions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserActionSequence {
    pub user_id: u64,
    pub metadata: Option<UserActionSequenceMeta>,
    pub actions: Vec<UserAction>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserActionSequenceMeta {
    pub length: u64,
    pub first_sequence_time: u64,
    pub last_sequence_time: u64,
    pub last_modified_epoch_ms: u64,
    pub previous_kafka_publish_epoch_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserAction {
    pub action_type: String,
    pub tweet_id: i64,
    pub timestamp: i64,
}

/// Viewer-level lists (mutes, blocks, follows) consulted by pre-scoring
/// filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserFeatures {
    pub muted_keywords: Vec<String>,
    pub blocked_user_ids: Vec<i64>,
    pub muted_user_ids: Vec<i64>,
    pub followed_user_ids: Vec<i64>,
    pub subscribed_user_ids: Vec<i64>,
}

/// How a candidate entered the pipeline — in-network timeline fan-in or an
/// out-of-network retrieval source. Centralized here instead of left as the
/// ad hoc `0`/`1` literals scattered across the collaborator sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ServedType {
    ForYouInNetwork = 0,
    ForYouPhoenixRetrieval = 1,
}

/// A single post moving through the pipeline, accumulating hydrated fields
/// and scores as it goes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Candidate {
    pub tweet_id: i64,
    pub author_id: u64,
    pub tweet_text: String,

    pub in_reply_to_tweet_id: Option<u64>,
    pub retweeted_tweet_id: Option<u64>,
    pub retweeted_user_id: Option<u64>,

    pub phoenix_scores: Option<PhoenixScores>,

    pub prediction_request_id: Option<u64>,
    pub last_scored_at_ms: Option<u64>,
    pub weighted_score: Option<f64>,
    pub score: Option<f64>,

    pub served_type: Option<i32>,
    pub in_network: Option<bool>,
    pub ancestors: Vec<u64>,
    pub video_duration_ms: Option<i32>,
    pub author_followers_count: Option<i32>,
    pub author_screen_name: Option<String>,
    pub retweeted_screen_name: Option<String>,
    pub visibility_reason: Option<String>,
    pub subscription_author_id: Option<u64>,
}

impl Candidate {
    /// `author_id -> screen_name` for this candidate and, if it is a
    /// retweet, the retweeted author too.
    pub fn screen_names(&self) -> std::collections::HashMap<u64, String> {
        let mut names = std::collections::HashMap::new();
        if let Some(name) = &self.author_screen_name {
            names.insert(self.author_id, name.clone());
        }
        if let (Some(name), Some(user_id)) =
            (&self.retweeted_screen_name, self.retweeted_user_id)
        {
            names.insert(user_id, name.clone());
        }
        names
    }
}

/// The 19 interaction-probability predictions the ranking model produces per
/// candidate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhoenixScores {
    pub favorite_score: Option<f64>,
    pub reply_score: Option<f64>,
    pub retweet_score: Option<f64>,
    pub photo_expand_score: Option<f64>,
    pub click_score: Option<f64>,
    pub profile_click_score: Option<f64>,
    pub vqv_score: Option<f64>,
    pub share_score: Option<f64>,
    pub share_via_dm_score: Option<f64>,
    pub share_via_copy_link_score: Option<f64>,
    pub dwell_score: Option<f64>,
    pub quote_score: Option<f64>,
    pub quoted_click_score: Option<f64>,
    pub follow_author_score: Option<f64>,

    pub not_interested_score: Option<f64>,
    pub block_author_score: Option<f64>,
    pub mute_author_score: Option<f64>,
    pub report_score: Option<f64>,

    pub dwell_time: Option<f64>,
}

/// The final output of a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineResult {
    pub retrieved_candidates: Vec<Candidate>,
    pub filtered_candidates: Vec<Candidate>,
    pub selected_candidates: Vec<Candidate>,
    pub query: Query,
}

/// What a single filter stage kept versus dropped.
#[derive(Debug, Clone, Default)]
pub struct FilterResult {
    pub kept: Vec<Candidate>,
    pub removed: Vec<Candidate>,
}
