//! Command line arguments for the HomeMixer service

use clap::Parser;

/// Command line arguments for the for-you timeline ranking service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// gRPC server port
    #[arg(long, default_value = "50052")]
    pub grpc_port: u16,

    /// Maximum number of scored posts returned per request
    #[arg(long, default_value_t = crate::params::RESULT_SIZE)]
    pub result_size: usize,
}
