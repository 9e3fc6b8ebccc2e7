//! Candidate sources: the in-network fan-in (Thunder) and out-of-network
//! retrieval (Phoenix) paths. Both run in parallel; the executor concatenates
//! their results in declaration order.

pub mod in_network;
pub mod out_of_network;
