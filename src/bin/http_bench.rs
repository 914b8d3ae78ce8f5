//! HTTP file-transfer benchmark client.
//!
//! Examples:
//!
//! ```text
//! cargo run --bin http_bench -- --server http://127.0.0.1:8000 --protocol http11
//! cargo run --bin http_bench -- --server http://127.0.0.1:8000 --protocol http2
//! ```
use clap::Parser;
use transfer_bench::bootstrap;
use transfer_bench::console::benchmarks::runner;
use transfer_bench::console::clients::http::Protocol;
use url::Url;

#[derive(Parser, Debug)]
#[command(author, version, about = "HTTP file-transfer benchmark client", long_about = None)]
struct Args {
    /// Base URL of the file server, e.g. `http://192.168.1.2:8000`.
    #[arg(long)]
    server: Url,

    /// The HTTP protocol version to benchmark.
    #[arg(long, value_enum, default_value = "http11")]
    protocol: Protocol,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = bootstrap::app::config();
    bootstrap::logging::setup(&config);

    runner::run_http_benchmark(&config, &args.server, args.protocol).await
}
