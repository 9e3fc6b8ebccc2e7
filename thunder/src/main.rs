//! Thunder service entrypoint: wires the post store, background trim/stats
//! tasks, the ingest consumer (when built with the `kafka` feature), and
//! serves the gRPC query surface.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use log::info;

use thunder::args::Args;
use thunder::config::ThunderConfig;
use thunder::post_index::{PostStore, DEFAULT_TRIM_INTERVAL};
use thunder::proto::thunder_service_server::ThunderServiceServer;
use thunder::query_service::{MockFollowingListClient, QueryService};
use thunder::service::ThunderGrpcService;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = ThunderConfig {
        post_retention_seconds: args.post_retention_seconds,
        request_timeout_ms: args.request_timeout_ms,
        max_concurrent_requests: args.max_concurrent_requests,
        ..ThunderConfig::from_env()
    };

    info!(
        "thunder starting: retention={}s timeout={}ms max_concurrent={}",
        config.post_retention_seconds, config.request_timeout_ms, config.max_concurrent_requests
    );

    let store = Arc::new(PostStore::new(Duration::from_secs(config.post_retention_seconds)));
    let _trim_handle = store.start_auto_trim(DEFAULT_TRIM_INTERVAL);
    let _stats_handle = store.start_stats_logger(Duration::from_secs(60));

    #[cfg(feature = "kafka")]
    if args.is_serving {
        let kafka_config = config.kafka.clone();
        let ingest_store = Arc::clone(&store);
        tokio::spawn(async move {
            match thunder::ingest::kafka::KafkaEventSource::new(&kafka_config) {
                Ok(source) => {
                    let deserializer = Arc::new(thunder::ingest::JsonDeserializer);
                    if let Err(err) = thunder::ingest::run_ingest_loop(
                        ingest_store,
                        Box::new(source),
                        deserializer,
                        Duration::from_millis(kafka_config.fetch_timeout_ms),
                    )
                    .await
                    {
                        log::error!("ingest loop exited: {err}");
                    }
                }
                Err(err) => log::error!("failed to start kafka ingest: {err}"),
            }
        });
    }

    if !args.is_serving {
        info!("is_serving=false, running as an ingest-only consumer");
        tokio::signal::ctrl_c().await?;
        return Ok(());
    }

    let following_client = Arc::new(MockFollowingListClient::new());
    let query_service = QueryService::new(Arc::clone(&store), following_client, &config);
    let grpc_service = ThunderGrpcService::new(query_service);

    let (_health_reporter, health_service) = tonic_health::server::health_reporter();

    let addr = format!("0.0.0.0:{}", args.grpc_port).parse()?;
    info!("thunder gRPC server listening on {addr}");

    tonic::transport::Server::builder()
        .add_service(health_service)
        .add_service(ThunderServiceServer::new(grpc_service))
        .serve(addr)
        .await?;

    Ok(())
}
