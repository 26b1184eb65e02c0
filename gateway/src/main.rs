//! Gateway main entry point
//!
//! Serves the student auth and file storage API over HTTP.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gateway_lib::{build_router, AppState, GatewayConfig};

async fn run_server() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "botnology_gateway=info,gateway_lib=info,auth=info,storage=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = GatewayConfig::from_env();
    tracing::info!("Starting Botnology Gateway v{}", config.version);

    let state = AppState::from_config(&config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    tracing::info!("HTTP server listening on {}", config.http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "run" => {}
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_help();
                return Ok(());
            }
        }
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_server())
}

fn print_help() {
    println!("Botnology Gateway - student auth and file storage API");
    println!();
    println!("Usage:");
    println!("  botnology-gateway              Run the HTTP server");
    println!("  botnology-gateway run          Run the HTTP server");
    println!("  botnology-gateway --help       Show this help");
    println!();
    println!("Environment Variables:");
    println!("  BOTNOLOGY_HTTP_ADDR        HTTP listen address (default: 127.0.0.1:8000)");
    println!("  BOTNOLOGY_TOKEN_SECRET     Token signing secret (required in production)");
    println!("  BOTNOLOGY_TOKEN_TTL_SECS   Token lifetime in seconds (default: no expiry)");
    println!("  BOTNOLOGY_STORAGE_DIR      Student file storage directory (default: ./data/student_files)");
    println!("  BOTNOLOGY_MAX_FILE_BYTES   Largest file a student may write (default: 1048576)");
    println!("  RUST_LOG                   Log filter");
}
