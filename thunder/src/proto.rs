//! Generated message and server-trait types for `thunder.proto`, compiled by
//! `build.rs` via `tonic-build`/`prost`.

tonic::include_proto!("thunder");
