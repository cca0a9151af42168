//! Load a service configuration and print the result as JSON.
//!
//! ```text
//! DEMO_SERVER_PORT=9000 DEMO_TAGS=a,b cargo run --example service -- --config demo.json
//! RUST_LOG=confstack=trace cargo run --example service
//! ```

use clap::Parser;
use confstack::{specification, Loader};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(about = "Print the configuration resolved from defaults, files and environment.")]
struct Args {
    /// Environment variable prefix.
    #[arg(short, long, default_value = "demo")]
    prefix: String,

    /// JSON file to merge; repeat to layer several, later files win.
    #[arg(short, long)]
    config: Vec<PathBuf>,

    /// Also try the conventional per-user locations before `--config` files.
    #[arg(long)]
    search: bool,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Server {
    bind: Option<IpAddr>,
    port: u16,
    read_timeout: Duration,
}

specification!(Server {
    bind(default = "127.0.0.1"),
    port(default = "3000"),
    read_timeout(default = "30s"),
});

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Pool {
    min_idle: u32,
    max_size: u32,
    idle_timeout: Duration,
}

specification!(Pool {
    min_idle(default = "1"),
    max_size(default = "16"),
    idle_timeout(default = "10m"),
});

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct DemoConfig {
    name: String,
    debug: bool,
    tags: Vec<String>,
    server: Server,
    pool: Pool,
    database_url: String,
}

specification!(DemoConfig {
    name(default = "demo-service"),
    debug,
    tags,
    server,
    pool(embedded),
    database_url(env = "DATABASE_URL"),
});

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let mut loader = Loader::new(args.prefix.as_str());
    if args.search {
        loader = loader.files(confstack::search_paths(&args.prefix));
    }
    let config: DemoConfig = loader
        .files(&args.config)
        .path_var(format!("{}_CONFIG", args.prefix.to_uppercase()))
        .load()?;

    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
