mod cli;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

use sr_core::config::Config;
use sr_core::validation::validate_title;
use sr_server::context::AppContext;
use sr_server::lookup;

/// Load config from `path` (or defaults) with the environment applied.
fn load_config(path: Option<&Path>) -> Config {
    let mut config = Config::load_or_default(path);
    config.apply_env();
    config
}

async fn start_server(host: Option<String>, port: Option<u16>, config_path: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_path);

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting seasonrank server");
    sr_server::start(config).await?;
    Ok(())
}

async fn rank(title: &str, config_path: Option<&Path>) -> Result<()> {
    let title = validate_title(title)?;
    let ctx = AppContext::from_config(load_config(config_path))?;

    let ranked = lookup::rank_series(&ctx, &title).await?;
    println!("{}", serde_json::to_string_pretty(&ranked)?);
    Ok(())
}

async fn suggest(query: &str, config_path: Option<&Path>) -> Result<()> {
    let query = validate_title(query)?;
    let ctx = AppContext::from_config(load_config(config_path))?;

    let suggestions = lookup::suggest_series(&ctx, &query).await?;
    println!("{}", serde_json::to_string_pretty(&suggestions)?);
    Ok(())
}

fn validate_config(config_path: Option<&Path>) -> Result<()> {
    let mut config = match config_path {
        Some(path) => {
            println!("Validating {}", path.display());
            Config::load(path)?
        }
        None => {
            println!("No config file given, validating defaults");
            Config::default()
        }
    };
    config.apply_env();

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("Configuration is valid");
    } else {
        for warning in &warnings {
            println!("warning: {warning}");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults from the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "seasonrank=trace,sr_server=trace,sr_core=debug,tower_http=debug".to_string()
        } else {
            "seasonrank=info,sr_server=info,sr_core=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, config_path))
        }
        Commands::Rank { title } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(rank(&title, config_path))
        }
        Commands::Suggest { query } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(suggest(&query, config_path))
        }
        Commands::Validate {
            config: validate_path,
        } => {
            let path = validate_path.or_else(|| config_path.map(Path::to_path_buf));
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("seasonrank {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
