//! The streaming ingest path: a transport-agnostic [`EventSource`] feeding a
//! [`Deserializer`]-decoded batch of [`IngestEvent`]s into a [`PostStore`].

use std::sync::Arc;

use async_trait::async_trait;
use log::warn;

use crate::post::Post;
use crate::post_index::PostStore;

/// One decoded unit of the ingest stream: either a new post or a delete
/// marker for an existing one.
#[derive(Clone, Debug)]
pub enum IngestEvent {
    Create(Post),
    Delete { post_id: i64, deleted_at: i64 },
}

/// Decodes raw wire bytes into typed [`IngestEvent`]s. Kept separate from
/// "apply events to the store" so the store logic never depends on the wire
/// format of the event stream.
pub trait Deserializer: Send + Sync {
    fn deserialize(&self, raw: &[u8]) -> anyhow::Result<IngestEvent>;
}

/// A JSON-line deserializer usable for local testing and for any event
/// stream that ships newline-delimited JSON records.
#[derive(Debug, Default)]
pub struct JsonDeserializer;

#[derive(serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum WireEvent {
    Create(Post),
    Delete { post_id: i64, deleted_at: i64 },
}

impl Deserializer for JsonDeserializer {
    fn deserialize(&self, raw: &[u8]) -> anyhow::Result<IngestEvent> {
        let event: WireEvent = serde_json::from_slice(raw)?;
        Ok(match event {
            WireEvent::Create(post) => IngestEvent::Create(post),
            WireEvent::Delete { post_id, deleted_at } => IngestEvent::Delete { post_id, deleted_at },
        })
    }
}

/// A pluggable source of raw event batches. The ingest loop polls this and
/// hands each batch to a [`Deserializer`]; the concrete Kafka-backed
/// implementation lives behind the `kafka` feature so the core crate
/// doesn't require `rdkafka` to build.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Polls for the next batch of raw records. Returns an empty vec if
    /// nothing is currently available; the ingest loop treats that as a
    /// normal, non-fatal poll and retries after its configured interval.
    async fn poll_batch(&mut self) -> anyhow::Result<Vec<Vec<u8>>>;
}

/// Applies one decoded batch to the store: creates are grouped and inserted
/// together (so [`PostStore::insert_posts`]'s admission-then-sort-then-
/// insert discipline applies across the whole batch), deletes are applied
/// individually since they don't participate in the sort.
pub fn apply_batch(store: &PostStore, events: Vec<IngestEvent>, now: i64) {
    let mut creates = Vec::with_capacity(events.len());
    for event in events {
        match event {
            IngestEvent::Create(post) => creates.push(post),
            IngestEvent::Delete { post_id, deleted_at } => store.mark_deleted(post_id, deleted_at),
        }
    }
    if !creates.is_empty() {
        store.insert_posts(creates, now);
    }
}

/// Runs the ingest consumer loop: poll a batch, decode each record, apply it
/// to the store. Decode failures are logged and the record is dropped,
/// mirroring the teacher's "recoverable upstream" failure policy — a single
/// malformed record never stops the stream.
pub async fn run_ingest_loop(
    store: Arc<PostStore>,
    mut source: Box<dyn EventSource>,
    deserializer: Arc<dyn Deserializer>,
    poll_interval: std::time::Duration,
) -> anyhow::Result<()> {
    loop {
        let raw_batch = source.poll_batch().await?;
        if raw_batch.is_empty() {
            tokio::time::sleep(poll_interval).await;
            continue;
        }

        let mut events = Vec::with_capacity(raw_batch.len());
        for raw in raw_batch {
            match deserializer.deserialize(&raw) {
                Ok(event) => events.push(event),
                Err(err) => warn!("dropping malformed ingest record: {err}"),
            }
        }

        let now = chrono::Utc::now().timestamp();
        apply_batch(&store, events, now);
    }
}

#[cfg(feature = "kafka")]
pub mod kafka {
    //! A [`super::EventSource`] backed by `rdkafka`'s `StreamConsumer`,
    //! mirroring `thunder/internal/kafka`'s listener/utils split: this
    //! module only knows how to poll raw bytes off a topic, leaving
    //! decoding to a [`super::Deserializer`].

    use async_trait::async_trait;
    use rdkafka::config::ClientConfig;
    use rdkafka::consumer::{Consumer, StreamConsumer};
    use rdkafka::Message;

    use crate::config::KafkaConfig;

    pub struct KafkaEventSource {
        consumer: StreamConsumer,
        batch_size: usize,
    }

    impl KafkaEventSource {
        pub fn new(config: &KafkaConfig) -> anyhow::Result<Self> {
            let mut client_config = ClientConfig::new();
            client_config
                .set("bootstrap.servers", config.brokers.join(","))
                .set("group.id", &config.group_id)
                .set(
                    "auto.offset.reset",
                    if config.skip_to_latest { "latest" } else { "earliest" },
                );

            if let Some(security) = &config.security {
                client_config.set("security.protocol", &security.protocol);
                if let Some(mechanism) = &security.sasl_mechanism {
                    client_config.set("sasl.mechanism", mechanism);
                }
                if let (Some(user), Some(pass)) = (&security.sasl_username, &security.sasl_password) {
                    client_config
                        .set("sasl.username", user)
                        .set("sasl.password", pass);
                }
            }

            let consumer: StreamConsumer = client_config.create()?;
            consumer.subscribe(&[config.topic.as_str()])?;

            Ok(Self {
                consumer,
                batch_size: config.batch_size,
            })
        }
    }

    #[async_trait]
    impl super::EventSource for KafkaEventSource {
        async fn poll_batch(&mut self) -> anyhow::Result<Vec<Vec<u8>>> {
            let mut batch = Vec::with_capacity(self.batch_size);
            while batch.len() < self.batch_size {
                match tokio::time::timeout(std::time::Duration::from_millis(200), self.consumer.recv()).await {
                    Ok(Ok(message)) => {
                        if let Some(payload) = message.payload() {
                            batch.push(payload.to_vec());
                        }
                    }
                    Ok(Err(err)) => return Err(err.into()),
                    Err(_timeout) => break,
                }
            }
            Ok(batch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn post(id: i64) -> Post {
        Post {
            post_id: id,
            author_id: 1,
            created_at: 1_000_000 - 10,
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
    fn json_deserializer_roundtrips_create_and_delete() {
        let deserializer = JsonDeserializer;
        let create_json = serde_json::json!({
            "kind": "create",
            "post_id": 1, "author_id": 1, "created_at": 100,
            "is_reply": false, "is_retweet": false, "has_video": false,
            "source_post_id": null, "source_user_id": null,
            "in_reply_to_post_id": null, "in_reply_to_user_id": null,
            "conversation_id": null
        });
        let event = deserializer
            .deserialize(create_json.to_string().as_bytes())
            .unwrap();
        assert!(matches!(event, IngestEvent::Create(p) if p.post_id == 1));

        let delete_json = serde_json::json!({"kind": "delete", "post_id": 1, "deleted_at": 200});
        let event = deserializer
            .deserialize(delete_json.to_string().as_bytes())
            .unwrap();
        assert!(matches!(event, IngestEvent::Delete { post_id: 1, deleted_at: 200 }));
    }

    #[test]
    fn apply_batch_groups_creates_and_applies_deletes() {
        let store = PostStore::new(Duration::from_secs(172_800));
        let events = vec![
            IngestEvent::Create(post(1)),
            IngestEvent::Create(post(2)),
            IngestEvent::Delete { post_id: 1, deleted_at: 1_000_000 },
        ];
        apply_batch(&store, events, 1_000_000);

        assert!(store.get_post(1).is_none());
        assert!(store.get_post(2).is_some());
    }
}
