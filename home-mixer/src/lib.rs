//! HomeMixer - Timeline Ranking Service
//!
//! This crate provides the ranking algorithm for the "For You" timeline.

pub mod args;
pub mod clients;
pub mod config;
pub mod filters;
pub mod hydrators;
pub mod params;
pub mod pipeline;
pub mod proto;
pub mod query_hydrators;
pub mod scorers;
pub mod selectors;
pub mod server;
pub mod side_effects;
pub mod sources;
pub mod util;

// Re-exports for convenience
pub use config::{Metrics, RequestContext};
pub use server::HomeMixerServer;
