//! filewire Server Binary
//!
//! Starts the sequential TCP file server.

use std::path::PathBuf;

use clap::Parser;
use filewire::config::TomlConfig;
use filewire::{Config, Result, Server};
use tracing_subscriber::{fmt, EnvFilter};

/// filewire Server
#[derive(Parser, Debug)]
#[command(name = "filewire-server")]
#[command(about = "Sequential TCP server for remote file management")]
#[command(version)]
struct Args {
    /// Bind address [default: 0.0.0.0]
    #[arg(long)]
    ip: Option<String>,

    /// Bind port, 1024-65535 [default: 5005]
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1024..))]
    port: Option<u16>,

    /// Bytes per receive [default: 4096]
    #[arg(short, long)]
    buffer_size: Option<usize>,

    /// Directory path arguments are resolved against [default: .]
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Read timeout in milliseconds, 0 waits forever [default: 30000]
    #[arg(long)]
    read_timeout_ms: Option<u64>,

    /// Write timeout in milliseconds, 0 waits forever [default: 30000]
    #[arg(long)]
    write_timeout_ms: Option<u64>,

    /// Pending connection queue length [default: 1]
    #[arg(long)]
    backlog: Option<i32>,

    /// TOML configuration file; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter, overridden by RUST_LOG [default: info,filewire=debug]
    #[arg(long)]
    log_level: Option<String>,
}

fn main() {
    let args = Args::parse();

    let file = match &args.config {
        Some(path) => match TomlConfig::load(path) {
            Ok(file) => file,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        None => TomlConfig::default(),
    };

    // Initialize tracing/logging
    let level = args
        .log_level
        .clone()
        .or_else(|| file.logging.level.clone())
        .unwrap_or_else(|| "info,filewire=debug".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt().with_env_filter(filter).with_target(true).init();

    tracing::info!("filewire server v{}", filewire::VERSION);

    let config = match build_config(&args, &file) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::bind(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}

/// File values first, then flags on top
fn build_config(args: &Args, file: &TomlConfig) -> Result<Config> {
    let mut config = Config::from_toml(file)?;

    if let Some(ip) = &args.ip {
        config.ip = ip.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(size) = args.buffer_size {
        config.buffer_size = size;
    }
    if let Some(root) = &args.root {
        config.root_dir = root.clone();
    }
    if let Some(ms) = args.read_timeout_ms {
        config.read_timeout_ms = ms;
    }
    if let Some(ms) = args.write_timeout_ms {
        config.write_timeout_ms = ms;
    }
    if let Some(backlog) = args.backlog {
        config.backlog = backlog;
    }

    config.validate()?;
    Ok(config)
}
