use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use colored::Colorize;
use hoard_group::{Getter, GetterFn, PeerGetter, Registry};
use hoard_server::{CacheServer, HttpPeerClient, ServerConfig};
use hoard_types::CacheError;
use tracing::info;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    match cli.command {
        Command::Serve(args) => runtime.block_on(cmd_serve(args)),
        Command::Get(args) => runtime.block_on(cmd_get(args)),
    }
}

/// Backing source of the demo namespace: a fixed table standing in for a
/// slow database.
fn demo_source() -> impl Getter {
    let db: HashMap<&'static str, &'static str> =
        HashMap::from([("Tom", "630"), ("Jack", "587"), ("Sam", "567")]);
    GetterFn(move |key: &str| {
        info!(key, "slow db lookup");
        db.get(key)
            .map(|v| v.as_bytes().to_vec())
            .ok_or_else(|| CacheError::key_not_found(key))
    })
}

/// Merge the optional config file with command-line overrides.
fn serve_config(args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
        if args.self_url.is_none() {
            config.self_url = format!("http://{bind}");
        }
    }
    if let Some(self_url) = &args.self_url {
        config.self_url = self_url.clone();
    }
    if !args.peers.is_empty() {
        config.peers = args.peers.clone();
    }
    if let Some(api) = args.api {
        config.api_addr = Some(api);
    }
    if let Some(replicas) = args.replicas {
        config.replicas = replicas;
    }
    config.validate()?;
    Ok(config)
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = serve_config(&args)?;
    let registry = Arc::new(Registry::new());
    registry.register("scores", args.cache_bytes, demo_source());

    let server = CacheServer::new(config, registry);
    let router = server.attach_peers()?;

    let config = server.config();
    println!("{} hoard node {}", "✓".green().bold(), config.self_url.bold());
    println!("  Listening: {}", config.bind_addr.to_string().cyan());
    if let Some(api) = config.api_addr {
        println!("  API: {}", format!("http://{api}/api?namespace=scores&key=Tom").cyan());
    }
    let peers = router.peers();
    if peers.is_empty() {
        println!("  Peers: {}", "none (standalone)".dimmed());
    } else {
        println!("  Peers: {}", peers.join(", ").yellow());
    }

    server.serve().await?;
    Ok(())
}

async fn cmd_get(args: GetArgs) -> anyhow::Result<()> {
    let client = HttpPeerClient::new(
        &args.peer,
        &args.base_path,
        Duration::from_millis(args.timeout_ms),
    )?;
    let value = client
        .get(&args.namespace, &args.key)
        .await
        .with_context(|| format!("looking up {}/{} on {}", args.namespace, args.key, args.peer))?;
    println!(
        "{} {}/{} = {}",
        "✓".green().bold(),
        args.namespace.cyan(),
        args.key.yellow(),
        value
    );
    Ok(())
}
