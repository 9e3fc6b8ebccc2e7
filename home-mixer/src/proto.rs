//! Generated message and server-trait types for `home_mixer.proto`, compiled
//! by `build.rs` via `tonic-build`/`prost`.

tonic::include_proto!("home_mixer");
