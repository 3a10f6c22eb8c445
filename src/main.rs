mod cli;

use imgcache::{config, server};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "imgcache=trace,imgcache_store=trace,tower_http=debug".to_string()
        } else {
            "imgcache=debug,imgcache_store=debug,tower_http=info".to_string()
        }
    });

    // Logs go to stderr so `list`/`push` output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let mut config = load_config(cli.config.as_deref(), cli.root)?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config::validate_config(&config)?;

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(server::start_server(config))
        }
        Commands::Push { file } => {
            let config = load_config(cli.config.as_deref(), cli.root)?;
            push_file(&config, &file)
        }
        Commands::List { group, json } => {
            let config = load_config(cli.config.as_deref(), cli.root)?;
            list_images(&config, group.as_deref(), json)
        }
        Commands::Checksum { file } => {
            let config = load_config(cli.config.as_deref(), cli.root)?;
            let data =
                std::fs::read(&file).with_context(|| format!("Failed to read {:?}", file))?;
            println!("{}", config.store.checksum.compute(&data));
            Ok(())
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("imgcache {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>, root: Option<PathBuf>) -> Result<config::Config> {
    let mut config = config::load_config_or_default(path)?;
    if let Some(root) = root {
        config.store.root = root;
    }
    Ok(config)
}

fn push_file(config: &config::Config, file: &Path) -> Result<()> {
    let data = std::fs::read(file).with_context(|| format!("Failed to read {:?}", file))?;

    let store = config::build_store(config);
    store
        .ensure_root()
        .with_context(|| format!("Failed to prepare cache directory {:?}", store.root()))?;

    match store.sniff(&data) {
        Ok(mime) => tracing::debug!("Pushing {:?} as {}", file, mime),
        Err(e) => tracing::warn!("Pushing {:?} with unrecognised content: {}", file, e),
    }

    let id = store
        .persist(&data)
        .with_context(|| format!("Failed to store {:?}", file))?;
    println!("{}", id);
    Ok(())
}

fn list_images(config: &config::Config, group: Option<&str>, json: bool) -> Result<()> {
    let store = config::build_store(config);
    let entries = store
        .list(group)
        .with_context(|| format!("Failed to list {:?}", store.root()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in &entries {
            println!("{} {}", entry.id, entry.mime);
        }
    }
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(path)?;
    config::validate_config(&config)?;

    match path {
        Some(p) => println!("Configuration valid: {}", p.display()),
        None => println!("Configuration valid (defaults)"),
    }
    println!("  Listen: {}:{}", config.server.host, config.server.port);
    println!("  Cache root: {}", config.store.root.display());
    println!("  Checksum: {}", config.store.checksum);
    Ok(())
}
