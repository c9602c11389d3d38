//! imgdrop - Push images to a server, get back public URLs.
//!
//! This binary hosts both halves of the system: `serve` runs the HTTP
//! server, `upload` is the command-line client.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imgdrop::{
    client,
    config::{Cli, Command, ServeConfig, UploadConfig},
    server::{create_router, RouterConfig},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(config) => run_serve(config).await,
        Command::Upload(config) => run_upload(config).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    // Initialize logging
    init_logging(config.verbose);

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let url_prefix = config.url_prefix_or_default();

    info!("Configuration:");
    info!("  Storage directory: {}", config.storage_dir.display());
    info!("  URL prefix: {}", url_prefix);
    info!(
        "  Max upload size: {} MiB",
        config.max_upload_size / (1024 * 1024)
    );
    info!("  Request timeout: {}s", config.request_timeout);

    // The storage directory is created once here, never per request
    if let Err(e) = tokio::fs::create_dir_all(&config.storage_dir).await {
        error!(
            "Failed to create storage directory {}: {}",
            config.storage_dir.display(),
            e
        );
        error!("");
        error!("  Please check:");
        error!("    - The parent directory exists and is writable");
        error!("    - The process has permission to create directories there");
        return ExitCode::FAILURE;
    }

    // Build router configuration
    let router_config = build_router_config(&config, url_prefix);
    let router = create_router(&config.storage_dir, router_config);

    // Bind and serve
    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!(
        "    imgdrop upload --api-url http://{} --token <token> cat.png",
        addr
    );
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Resolve on ctrl-c so in-flight requests drain before the process exits.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig, url_prefix: String) -> RouterConfig {
    let mut router_config = RouterConfig::new(&config.token, url_prefix)
        .with_max_upload_size(config.max_upload_size)
        .with_request_timeout(Duration::from_secs(config.request_timeout))
        .with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}

// =============================================================================
// Upload Command
// =============================================================================

async fn run_upload(config: UploadConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let timeout = Duration::from_secs(config.timeout);

    let outcomes = match client::upload(&config.api_url, &config.token, &config.files, timeout)
        .await
    {
        Ok(outcomes) => outcomes,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // URLs go to stdout so they can be piped; per-file failures to stderr
    let mut failures = 0;
    for outcome in outcomes {
        match outcome.url {
            Some(url) => println!("{}", url),
            None => {
                failures += 1;
                eprintln!(
                    "{}: {}",
                    outcome.name,
                    outcome
                        .message
                        .as_deref()
                        .unwrap_or("upload failed with no detail")
                );
            }
        }
    }

    if failures > 0 {
        eprintln!("{} file(s) failed to upload", failures);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Logging
// =============================================================================

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "imgdrop=debug,tower_http=debug"
    } else {
        "imgdrop=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
