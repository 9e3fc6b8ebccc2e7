//! Thunder — the in-memory, append-dominant, time-windowed, per-author-
//! partitioned in-network post store.
//!
//! [`post_index::PostStore`] is the core index; [`ingest`] feeds it from a
//! streaming event source; [`query_service::QueryService`] serves the
//! fan-in read path; [`service`] exposes that over gRPC.

pub mod args;
pub mod config;
pub mod ingest;
pub mod post;
pub mod post_index;
pub mod proto;
pub mod query_service;
pub mod service;
