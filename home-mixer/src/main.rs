//! HomeMixer service entrypoint: wires the for-you timeline pipeline with
//! mock collaborator clients and serves the gRPC scoring surface.

use anyhow::Result;
use clap::Parser;
use log::info;

use home_mixer::args::Args;
use home_mixer::pipeline::{self, Clients};
use home_mixer::proto::scored_posts_service_server::ScoredPostsServiceServer;
use home_mixer::HomeMixerServer;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    info!("home-mixer starting: result_size={}", args.result_size);

    let candidate_pipeline = pipeline::build(Clients::mock(), args.result_size);
    let server = HomeMixerServer::new(candidate_pipeline);

    let (_health_reporter, health_service) = tonic_health::server::health_reporter();

    let addr = format!("0.0.0.0:{}", args.grpc_port).parse()?;
    info!("home-mixer gRPC server listening on {addr}");

    tonic::transport::Server::builder()
        .add_service(health_service)
        .add_service(ScoredPostsServiceServer::new(server))
        .serve(addr)
        .await?;

    Ok(())
}
