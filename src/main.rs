use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("waterfall=info")),
        )
        .init();

    let args = waterfall::api::ServeArgs::parse();
    if let Err(e) = waterfall::api::run_http_server(args).await {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}
