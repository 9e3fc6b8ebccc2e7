//! [`PostDeque`], the per-author ordered sequence, and [`PostStore`], the
//! fan-out-by-author index plus the canonical post map and tombstone set.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, info};
use parking_lot::RwLock;

use crate::post::{Post, TinyPost};

/// Reserved author key used to track delete-events on the same retention
/// timeline as real posts, so tombstones age out instead of accumulating
/// forever.
pub const DELETE_EVENT_KEY: i64 = -1;

/// Default interval between automatic trim passes.
pub const DEFAULT_TRIM_INTERVAL: Duration = Duration::from_secs(120);

/// An append-back/pop-front ordered sequence of [`TinyPost`] under its own
/// lock, so per-author mutation never contends with unrelated authors or
/// with the canonical map/tombstone set.
#[derive(Debug, Default)]
pub struct PostDeque {
    inner: RwLock<VecDeque<TinyPost>>,
}

impl PostDeque {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_back(&self, post: TinyPost) {
        self.inner.write().push_back(post);
    }

    pub fn front(&self) -> Option<TinyPost> {
        self.inner.read().front().copied()
    }

    pub fn pop_front(&self) -> Option<TinyPost> {
        self.inner.write().pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// A snapshot of the deque's contents, newest `created_at` first. Taken
    /// under the read lock and then released, so callers can scan a stable
    /// view while trim/insert proceed concurrently on the live deque.
    pub fn snapshot_newest_first(&self) -> Vec<TinyPost> {
        let mut items: Vec<TinyPost> = self.inner.read().iter().copied().collect();
        items.reverse();
        items
    }

    /// Restores ascending `created_at` order. Used by `finalize_init` after
    /// a bulk load where insertion order may not already be sorted.
    pub fn sort_by_created_at(&self) {
        self.inner
            .write()
            .make_contiguous()
            .sort_by_key(|p| p.created_at);
    }
}

/// The three per-kind `author_id -> deque` maps plus the canonical
/// `post_id -> Post` map and the tombstone set. `dashmap` gives each a
/// sharded, lock-free-reads concurrent map, matching the per-author/
/// per-map concurrency discipline required of the index.
pub struct PostStore {
    originals: DashMap<i64, PostDeque>,
    secondary: DashMap<i64, PostDeque>,
    videos: DashMap<i64, PostDeque>,
    posts: DashMap<i64, Post>,
    deleted: DashMap<i64, ()>,
    retention: Duration,
}

/// Which per-author deque a post belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DequeKind {
    Originals,
    Secondary,
    Videos,
}

impl PostStore {
    pub fn new(retention: Duration) -> Self {
        Self {
            originals: DashMap::new(),
            secondary: DashMap::new(),
            videos: DashMap::new(),
            posts: DashMap::new(),
            deleted: DashMap::new(),
            retention,
        }
    }

    fn map_for(&self, kind: DequeKind) -> &DashMap<i64, PostDeque> {
        match kind {
            DequeKind::Originals => &self.originals,
            DequeKind::Secondary => &self.secondary,
            DequeKind::Videos => &self.videos,
        }
    }

    /// A snapshot view of one author's deque of the given kind, newest
    /// first. Empty if the author has no entries of that kind.
    pub fn author_deque_newest_first(&self, kind: DequeKind, author_id: i64) -> Vec<TinyPost> {
        self.map_for(kind)
            .get(&author_id)
            .map(|deque| deque.snapshot_newest_first())
            .unwrap_or_default()
    }

    pub fn get_post(&self, post_id: i64) -> Option<Post> {
        if self.deleted.contains_key(&post_id) {
            return None;
        }
        self.posts.get(&post_id).map(|r| r.clone())
    }

    pub fn is_deleted(&self, post_id: i64) -> bool {
        self.deleted.contains_key(&post_id)
    }

    fn append(&self, kind: DequeKind, author_id: i64, post: &Post) {
        self.map_for(kind)
            .entry(author_id)
            .or_insert_with(PostDeque::new)
            .push_back(TinyPost::from(post));
    }

    /// Admits a batch of newly ingested posts: drops posts with an
    /// out-of-window `created_at`, sorts the survivors ascending so deque
    /// invariant 2 holds without per-insert sorting, then inserts each one
    /// idempotently.
    pub fn insert_posts(&self, mut batch: Vec<Post>, now: i64) {
        let retention_secs = self.retention.as_secs() as i64;
        batch.retain(|p| p.created_at < now && now - p.created_at <= retention_secs);
        batch.sort_by_key(|p| p.created_at);

        for post in batch {
            self.insert_one(post);
        }
    }

    fn insert_one(&self, post: Post) {
        if self.deleted.contains_key(&post.post_id) {
            return;
        }

        let source = post
            .source_post_id
            .and_then(|source_id| self.posts.get(&source_id).map(|r| r.clone()));
        let video_eligible = post.is_video_eligible(source.as_ref());

        let post_id = post.post_id;
        let author_id = post.author_id as i64;
        let is_secondary = post.is_reply || post.is_retweet;

        match self.posts.entry(post_id) {
            Entry::Occupied(_) => return,
            Entry::Vacant(entry) => {
                entry.insert(post.clone());
            }
        }

        if is_secondary {
            self.append(DequeKind::Secondary, author_id, &post);
        } else {
            self.append(DequeKind::Originals, author_id, &post);
        }
        if video_eligible {
            self.append(DequeKind::Videos, author_id, &post);
        }
    }

    /// Removes a post from the canonical map, tombstones it, and records
    /// the delete itself under the reserved sentinel author so it ages out
    /// on the same retention clock as real posts.
    pub fn mark_deleted(&self, post_id: i64, deleted_at: i64) {
        self.posts.remove(&post_id);
        self.deleted.insert(post_id, ());
        self.originals
            .entry(DELETE_EVENT_KEY)
            .or_insert_with(PostDeque::new)
            .push_back(TinyPost::new(post_id, deleted_at));
    }

    /// After a catch-up bulk load: restore sort order in every deque, run a
    /// full trim, and purge any entries whose post has since been
    /// tombstoned.
    pub fn finalize_init(&self, now: i64) {
        for map in [&self.originals, &self.secondary, &self.videos] {
            for entry in map.iter() {
                entry.value().sort_by_created_at();
            }
        }
        self.trim_old_posts(now);
        self.purge_deleted();
    }

    fn purge_deleted(&self) {
        for map in [&self.originals, &self.secondary, &self.videos] {
            for entry in map.iter() {
                let deque = entry.value();
                let mut retained: Vec<TinyPost> = deque
                    .snapshot_newest_first()
                    .into_iter()
                    .rev()
                    .filter(|tp| !self.deleted.contains_key(&tp.post_id))
                    .collect();
                while deque.pop_front().is_some() {}
                for tp in retained.drain(..) {
                    deque.push_back(tp);
                }
            }
        }
    }

    /// Pops every deque's stale front entries. A pop from `originals`/
    /// `secondary` also removes the post from the canonical map (its
    /// primary reference is gone); a pop from `videos` only removes the
    /// deque entry, since the post may still be referenced by its primary
    /// deque (or already removed from there, in which case lookups already
    /// treat it as tombstoned via the missing-post-is-absent rule).
    pub fn trim_old_posts(&self, now: i64) {
        let retention_secs = self.retention.as_secs() as i64;
        let cutoff = now - retention_secs;

        self.trim_map(&self.originals, cutoff, true);
        self.trim_map(&self.secondary, cutoff, true);
        self.trim_map(&self.videos, cutoff, false);
    }

    fn trim_map(&self, map: &DashMap<i64, PostDeque>, cutoff: i64, remove_canonical: bool) {
        let mut empty_authors = Vec::new();

        for entry in map.iter() {
            let author_id = *entry.key();
            let deque = entry.value();
            while let Some(front) = deque.front() {
                if front.created_at >= cutoff {
                    break;
                }
                deque.pop_front();
                if remove_canonical {
                    self.posts.remove(&front.post_id);
                }
            }
            if deque.is_empty() {
                empty_authors.push(author_id);
            }
        }

        for author_id in empty_authors {
            map.remove_if(&author_id, |_, deque| deque.is_empty());
        }
    }

    pub fn author_count(&self, kind: DequeKind) -> usize {
        self.map_for(kind).len()
    }

    pub fn canonical_post_count(&self) -> usize {
        self.posts.len()
    }

    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    /// Spawns a background task that trims stale entries on a fixed
    /// interval for as long as the returned handle (or the store's last
    /// `Arc`) is alive.
    pub fn start_auto_trim(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let now = chrono::Utc::now().timestamp();
                store.trim_old_posts(now);
                debug!("trim pass complete: posts={}", store.canonical_post_count());
            }
        })
    }

    /// Spawns a background task that logs index size statistics on a fixed
    /// interval, for operational visibility.
    pub fn start_stats_logger(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                info!(
                    "poststore stats: authors(originals)={} authors(secondary)={} authors(videos)={} posts={} deleted={}",
                    store.author_count(DequeKind::Originals),
                    store.author_count(DequeKind::Secondary),
                    store.author_count(DequeKind::Videos),
                    store.canonical_post_count(),
                    store.deleted_count(),
                );
            }
        })
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

    #[test]
    fn insert_is_idempotent() {
        let store = PostStore::new(Duration::from_secs(172_800));
        let now = 1_000_000;
        store.insert_posts(vec![post(1, 7, now - 10)], now);
        store.insert_posts(vec![post(1, 7, now - 10)], now);

        assert_eq!(store.canonical_post_count(), 1);
        assert_eq!(store.author_deque_newest_first(DequeKind::Originals, 7).len(), 1);
    }

    #[test]
    fn admission_drops_future_and_stale_posts() {
        let store = PostStore::new(Duration::from_secs(100));
        let now = 1_000_000;
        store.insert_posts(
            vec![post(1, 7, now + 1), post(2, 7, now - 1000), post(3, 7, now - 10)],
            now,
        );

        assert!(store.get_post(1).is_none());
        assert!(store.get_post(2).is_none());
        assert!(store.get_post(3).is_some());
    }

    #[test]
    fn delete_then_reinsert_stays_absent() {
        let store = PostStore::new(Duration::from_secs(172_800));
        let now = 1_000_000;
        store.insert_posts(vec![post(7, 1, now - 10)], now);
        store.mark_deleted(7, now);
        store.insert_posts(vec![post(7, 1, now - 5)], now);

        assert!(store.get_post(7).is_none());
        assert!(store.is_deleted(7));
    }

    #[test]
    fn trim_is_idempotent_and_reclaims_old_posts() {
        let store = PostStore::new(Duration::from_secs(100));
        let now = 1_000_000;
        store.insert_posts(vec![post(1, 7, now - 50)], now);
        store.trim_old_posts(now + 200);
        store.trim_old_posts(now + 200);

        assert!(store.get_post(1).is_none());
        assert_eq!(store.author_deque_newest_first(DequeKind::Originals, 7).len(), 0);
    }

    #[test]
    fn video_eligible_retweet_appears_in_videos_deque() {
        let store = PostStore::new(Duration::from_secs(172_800));
        let now = 1_000_000;
        let mut source = post(1, 9, now - 20);
        source.has_video = true;
        store.insert_posts(vec![source], now);

        let mut retweet = post(2, 7, now - 10);
        retweet.is_retweet = true;
        retweet.source_post_id = Some(1);
        store.insert_posts(vec![retweet], now);

        assert_eq!(store.author_deque_newest_first(DequeKind::Videos, 7).len(), 1);
        assert_eq!(store.author_deque_newest_first(DequeKind::Secondary, 7).len(), 1);
    }

    #[test]
    fn per_author_deques_stay_sorted_ascending() {
        let store = PostStore::new(Duration::from_secs(172_800));
        let now = 1_000_000;
        store.insert_posts(
            vec![post(3, 7, now - 5), post(1, 7, now - 30), post(2, 7, now - 15)],
            now,
        );

        let newest_first = store.author_deque_newest_first(DequeKind::Originals, 7);
        let created_ats: Vec<i64> = newest_first.iter().map(|p| p.created_at).collect();
        assert_eq!(created_ats, vec![now - 5, now - 15, now - 30]);
    }
}
