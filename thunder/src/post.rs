//! The canonical [`Post`] record and the size-minimal [`TinyPost`] reference
//! kept inside per-author sequences.

use serde::{Deserialize, Serialize};

/// A post as ingested from the event stream. Immutable once stored: C1 never
/// mutates a `Post` in place, only inserts or tombstones it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub post_id: i64,
    pub author_id: u64,
    pub created_at: i64,
    pub is_reply: bool,
    pub is_retweet: bool,
    pub has_video: bool,
    pub source_post_id: Option<i64>,
    pub source_user_id: Option<u64>,
    pub in_reply_to_post_id: Option<i64>,
    pub in_reply_to_user_id: Option<u64>,
    pub conversation_id: Option<i64>,
}

impl Post {
    /// A post is video-eligible iff it isn't a reply and either carries its
    /// own video or is a retweet whose source (looked up by the caller) is
    /// itself a non-reply video post.
    pub fn is_video_eligible(&self, source: Option<&Post>) -> bool {
        if self.is_reply {
            return false;
        }
        if self.has_video {
            return true;
        }
        if self.is_retweet {
            if let Some(source) = source {
                return !source.is_reply && source.has_video;
            }
        }
        false
    }
}

/// A cache-friendly `{post_id, created_at}` pair kept in per-author deques.
/// Everything else about the post lives behind the canonical map lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TinyPost {
    pub post_id: i64,
    pub created_at: i64,
}

impl TinyPost {
    pub fn new(post_id: i64, created_at: i64) -> Self {
        Self { post_id, created_at }
    }
}

impl From<&Post> for TinyPost {
    fn from(post: &Post) -> Self {
        TinyPost::new(post.post_id, post.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: i64, reply: bool, retweet: bool, video: bool) -> Post {
        Post {
            post_id: id,
            author_id: 1,
            created_at: 0,
            is_reply: reply,
            is_retweet: retweet,
            has_video: video,
            source_post_id: None,
            source_user_id: None,
            in_reply_to_post_id: None,
            in_reply_to_user_id: None,
            conversation_id: None,
        }
    }

    #[test]
    fn replies_are_never_video_eligible() {
        let reply = post(1, true, false, true);
        assert!(!reply.is_video_eligible(None));
    }

    #[test]
    fn own_video_is_eligible() {
        let p = post(1, false, false, true);
        assert!(p.is_video_eligible(None));
    }

    #[test]
    fn retweet_inherits_source_video_eligibility() {
        let source = post(1, false, false, true);
        let retweet = post(2, false, true, false);
        assert!(retweet.is_video_eligible(Some(&source)));

        let reply_source = post(1, true, false, true);
        assert!(!retweet.is_video_eligible(Some(&reply_source)));
    }

    #[test]
    fn retweet_without_resolvable_source_is_not_eligible() {
        let retweet = post(2, false, true, false);
        assert!(!retweet.is_video_eligible(None));
    }
}
