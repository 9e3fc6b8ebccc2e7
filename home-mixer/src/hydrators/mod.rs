//! Candidate hydrators: enrich the retrieved candidate list in parallel.
//! Every hydrator preserves length and order; a hydrator must never drop a
//! candidate (that's a filter's job).

pub mod core_data;
pub mod gizmoduck;
pub mod in_network;
pub mod subscription;
pub mod video_duration;
pub mod visibility;
