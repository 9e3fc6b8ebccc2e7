//! The in-network fan-in query path: admission control, following-list
//! backfill, per-author caps, reply-chain eligibility, and deadline-aware
//! scanning.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::info;
use tokio::sync::Semaphore;

use crate::config::{Metrics, ThunderConfig};
use crate::post::Post;
use crate::post_index::{DequeKind, PostStore};

pub const MAX_INPUT_LIST_SIZE: usize = 10_000;
pub const MAX_POSTS_TO_RETURN: u32 = 1_000;
pub const MAX_VIDEO_POSTS_TO_RETURN: u32 = 500;

pub const MAX_ORIGINAL_POSTS_PER_AUTHOR: usize = 10;
pub const MAX_REPLY_POSTS_PER_AUTHOR: usize = 5;
pub const MAX_VIDEO_POSTS_PER_AUTHOR: usize = 5;
pub const MAX_TINY_POSTS_PER_USER_SCAN: usize = 1_000;

/// Fetches a viewer's following list when the caller didn't supply one.
/// Models the abstract `FollowingListClient` collaborator; the only
/// concrete implementation in scope is a mock useful for tests and wiring.
#[async_trait]
pub trait FollowingListClient: Send + Sync {
    async fn fetch(&self, viewer_id: u64, max_size: usize) -> anyhow::Result<Vec<u64>>;
}

/// A following-list client with a fixed, in-memory mapping — stands in for
/// the real user-features collaborator, which is out of scope.
#[derive(Debug, Default)]
pub struct MockFollowingListClient {
    following: dashmap::DashMap<u64, Vec<u64>>,
}

impl MockFollowingListClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_following(&self, viewer_id: u64, authors: Vec<u64>) {
        self.following.insert(viewer_id, authors);
    }
}

#[async_trait]
impl FollowingListClient for MockFollowingListClient {
    async fn fetch(&self, viewer_id: u64, max_size: usize) -> anyhow::Result<Vec<u64>> {
        let mut list = self
            .following
            .get(&viewer_id)
            .map(|r| r.clone())
            .unwrap_or_default();
        list.truncate(max_size);
        Ok(list)
    }
}

#[derive(Clone, Debug, Default)]
pub struct InNetworkQuery {
    pub viewer_id: u64,
    pub following_user_ids: Vec<u64>,
    pub exclude_post_ids: Vec<i64>,
    pub max_results: u32,
    pub is_video_request: bool,
    pub debug: bool,
}

#[derive(Clone, Debug, Default)]
pub struct InNetworkResponse {
    pub posts: Vec<Post>,
}

/// A request was rejected or failed outright; partial results from a
/// deadline hit are represented as `Ok`, never as an error.
#[derive(Debug)]
pub enum QueryServiceError {
    ResourceExhausted,
    Internal(anyhow::Error),
}

impl std::fmt::Display for QueryServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ResourceExhausted => write!(f, "admission rejected: at capacity"),
            Self::Internal(err) => write!(f, "following-list fetch failed: {err}"),
        }
    }
}

impl std::error::Error for QueryServiceError {}

impl From<anyhow::Error> for QueryServiceError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

/// Bounds concurrent in-flight queries and serves the fan-in scan.
pub struct QueryService {
    store: Arc<PostStore>,
    following_client: Arc<dyn FollowingListClient>,
    admission: Semaphore,
    request_timeout: Duration,
    metrics: Arc<Metrics>,
}

impl QueryService {
    pub fn new(
        store: Arc<PostStore>,
        following_client: Arc<dyn FollowingListClient>,
        config: &ThunderConfig,
    ) -> Self {
        Self {
            store,
            following_client,
            admission: Semaphore::new(config.max_concurrent_requests),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            metrics: Metrics::new(),
        }
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    pub async fn get_in_network_posts(
        &self,
        mut query: InNetworkQuery,
    ) -> Result<InNetworkResponse, QueryServiceError> {
        let _permit = match self.admission.try_acquire() {
            Ok(permit) => permit,
            Err(_) => {
                self.metrics.record_rejected();
                return Err(QueryServiceError::ResourceExhausted);
            }
        };
        self.metrics.record_request();

        if query.following_user_ids.is_empty() {
            query.following_user_ids = self
                .following_client
                .fetch(query.viewer_id, MAX_INPUT_LIST_SIZE)
                .await?;
        }
        query.following_user_ids.truncate(MAX_INPUT_LIST_SIZE);
        query.exclude_post_ids.truncate(MAX_INPUT_LIST_SIZE);

        let default_max = if query.is_video_request {
            MAX_VIDEO_POSTS_TO_RETURN
        } else {
            MAX_POSTS_TO_RETURN
        };
        let max_results = if query.max_results == 0 {
            default_max
        } else {
            query.max_results
        };

        let posts = self.scan(&query, max_results);
        Ok(InNetworkResponse { posts })
    }

    fn scan(&self, query: &InNetworkQuery, max_results: u32) -> Vec<Post> {
        let exclude: std::collections::HashSet<i64> = query.exclude_post_ids.iter().copied().collect();
        let following: std::collections::HashSet<u64> = query.following_user_ids.iter().copied().collect();
        let deadline = Instant::now();
        let mut accumulated = Vec::new();
        let mut authors_processed = 0usize;
        let mut timed_out = false;

        'authors: for &author in &query.following_user_ids {
            if self.request_timeout > Duration::ZERO && deadline.elapsed() >= self.request_timeout {
                timed_out = true;
                break;
            }
            authors_processed += 1;

            if query.is_video_request {
                let kept = self.scan_author_deque(
                    DequeKind::Videos,
                    author as i64,
                    &exclude,
                    &following,
                    MAX_VIDEO_POSTS_PER_AUTHOR,
                    query.viewer_id,
                    false,
                    deadline,
                );
                match kept {
                    Some(posts) => accumulated.extend(posts),
                    None => {
                        timed_out = true;
                        break 'authors;
                    }
                }
                continue;
            }

            let originals = self.scan_author_deque(
                DequeKind::Originals,
                author as i64,
                &exclude,
                &following,
                MAX_ORIGINAL_POSTS_PER_AUTHOR,
                query.viewer_id,
                false,
                deadline,
            );
            match originals {
                Some(posts) => accumulated.extend(posts),
                None => {
                    timed_out = true;
                    break 'authors;
                }
            }

            let secondary = self.scan_author_deque(
                DequeKind::Secondary,
                author as i64,
                &exclude,
                &following,
                MAX_REPLY_POSTS_PER_AUTHOR,
                query.viewer_id,
                true,
                deadline,
            );
            match secondary {
                Some(posts) => accumulated.extend(posts),
                None => {
                    timed_out = true;
                    break 'authors;
                }
            }
        }

        if timed_out {
            self.metrics.record_timed_out();
        }
        info!(
            "in-network scan processed {}/{} authors, accumulated {} posts",
            authors_processed,
            query.following_user_ids.len(),
            accumulated.len()
        );

        accumulated.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        accumulated.truncate(max_results as usize);
        accumulated
    }

    /// Scans one author's deque newest-first, applying the exclude set,
    /// tombstone check, self-retweet rule, and (for the secondary deque)
    /// reply-chain eligibility, up to the per-author cap or the scan-depth
    /// cap, whichever binds first. Returns `None` if the deadline was hit
    /// mid-scan, signalling the caller to stop processing further authors.
    #[allow(clippy::too_many_arguments)]
    fn scan_author_deque(
        &self,
        kind: DequeKind,
        author_id: i64,
        exclude: &std::collections::HashSet<i64>,
        following: &std::collections::HashSet<u64>,
        per_author_cap: usize,
        viewer_id: u64,
        apply_reply_chain_rules: bool,
        deadline: Instant,
    ) -> Option<Vec<Post>> {
        let tiny_posts = self.store.author_deque_newest_first(kind, author_id);
        let mut kept = Vec::with_capacity(per_author_cap.min(tiny_posts.len()));

        for (scanned, tiny) in tiny_posts.into_iter().take(MAX_TINY_POSTS_PER_USER_SCAN).enumerate() {
            if self.request_timeout > Duration::ZERO
                && scanned % 64 == 0
                && deadline.elapsed() >= self.request_timeout
            {
                return None;
            }
            if kept.len() >= per_author_cap {
                break;
            }
            if exclude.contains(&tiny.post_id) {
                continue;
            }
            let Some(post) = self.store.get_post(tiny.post_id) else {
                continue;
            };
            if post.is_retweet && post.source_user_id == Some(viewer_id) {
                continue;
            }
            if apply_reply_chain_rules && !self.passes_reply_chain_rules(&post, following) {
                continue;
            }
            kept.push(post);
        }

        Some(kept)
    }

    /// A reply is eligible only if the post it replies to is itself an
    /// original, or it targets the conversation root and that root's
    /// author is in the viewer's following set. Retweets pass
    /// unconditionally (subject to the self-retweet rule already applied
    /// by the caller).
    fn passes_reply_chain_rules(&self, post: &Post, following: &std::collections::HashSet<u64>) -> bool {
        if post.is_retweet {
            return true;
        }
        let Some(parent_id) = post.in_reply_to_post_id else {
            return true;
        };
        let Some(parent) = self.store.get_post(parent_id) else {
            return false;
        };
        if !parent.is_reply && !parent.is_retweet {
            return true;
        }
        if post.conversation_id == Some(parent_id) {
            if let Some(conversation_root) = self.store.get_post(parent_id) {
                return following.contains(&conversation_root.author_id);
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: i64, author: u64, created_at: i64) -> Post {
        Post {
            post_id: id,
            author_id: author,
            created_at,
            is_reply: false,
            is_retweet: false,
            has_video: false,
            source_post_id: None,
            source_user_id: None,
            in_reply_to_post_id: None,
            in_reply_to_user_id: None,
            conversation_id: None,
        }
    }

    fn config() -> ThunderConfig {
        ThunderConfig {
            max_concurrent_requests: 10,
            request_timeout_ms: 0,
            ..ThunderConfig::default()
        }
    }

    #[tokio::test]
    async fn per_author_cap_enforced() {
        let store = Arc::new(PostStore::new(Duration::from_secs(172_800)));
        let now = 1_000_000;
        let batch: Vec<Post> = (0..20).map(|i| post(i, 1, now - (20 - i))).collect();
        store.insert_posts(batch, now);

        let client = Arc::new(MockFollowingListClient::new());
        let service = QueryService::new(store, client, &config());

        let response = service
            .get_in_network_posts(InNetworkQuery {
                viewer_id: 99,
                following_user_ids: vec![1],
                max_results: 1000,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(response.posts.len(), 10);
        let newest_ten: Vec<i64> = (10..20).rev().collect();
        let returned_ids: Vec<i64> = response.posts.iter().map(|p| p.post_id).collect();
        assert_eq!(returned_ids, newest_ten);
    }

    #[tokio::test]
    async fn empty_following_video_request_returns_empty() {
        let store = Arc::new(PostStore::new(Duration::from_secs(172_800)));
        let client = Arc::new(MockFollowingListClient::new());
        let service = QueryService::new(store, client, &config());

        let response = service
            .get_in_network_posts(InNetworkQuery {
                viewer_id: 1,
                is_video_request: true,
                debug: true,
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(response.posts.is_empty());
    }

    #[tokio::test]
    async fn self_retweet_echo_is_suppressed() {
        let store = Arc::new(PostStore::new(Duration::from_secs(172_800)));
        let now = 1_000_000;
        let mut retweet = post(2, 1, now - 5);
        retweet.is_retweet = true;
        retweet.source_user_id = Some(99);
        store.insert_posts(vec![retweet], now);

        let client = Arc::new(MockFollowingListClient::new());
        let service = QueryService::new(store, client, &config());

        let response = service
            .get_in_network_posts(InNetworkQuery {
                viewer_id: 99,
                following_user_ids: vec![1],
                max_results: 1000,
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(response.posts.is_empty());
    }

    #[tokio::test]
    async fn admission_rejects_beyond_capacity() {
        let store = Arc::new(PostStore::new(Duration::from_secs(172_800)));
        let client = Arc::new(MockFollowingListClient::new());
        let mut cfg = config();
        cfg.max_concurrent_requests = 1;
        let service = Arc::new(QueryService::new(store, client, &cfg));

        let _permit = service.admission.try_acquire().unwrap();
        let result = service
            .get_in_network_posts(InNetworkQuery {
                viewer_id: 1,
                following_user_ids: vec![1],
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(QueryServiceError::ResourceExhausted)));
        assert_eq!(
            service.metrics.requests_rejected.load(std::sync::atomic::Ordering::Relaxed),
            1
        );
    }

    #[tokio::test]
    async fn accepted_requests_increment_the_request_counter() {
        let store = Arc::new(PostStore::new(Duration::from_secs(172_800)));
        let client = Arc::new(MockFollowingListClient::new());
        let service = QueryService::new(store, client, &config());

        service
            .get_in_network_posts(InNetworkQuery {
                viewer_id: 1,
                following_user_ids: vec![1],
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(
            service.metrics().requests_total.load(std::sync::atomic::Ordering::Relaxed),
            1
        );
    }
}
