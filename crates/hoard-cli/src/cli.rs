use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "hoard",
    about = "Distributed read-through cache with consistent-hash sharding",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a cache node serving the demo `scores` namespace
    Serve(ServeArgs),
    /// Look up a key on a running node through the peer protocol
    Get(GetArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Address to listen on for peer traffic
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// This node's base URL as listed in --peers (default: http://<bind>)
    #[arg(long)]
    pub self_url: Option<String>,
    /// Base URLs of every node, comma separated
    #[arg(long, value_delimiter = ',')]
    pub peers: Vec<String>,
    /// Also serve the front-end API on this address
    #[arg(long)]
    pub api: Option<SocketAddr>,
    /// Virtual nodes per peer
    #[arg(long)]
    pub replicas: Option<usize>,
    /// Byte budget of the demo namespace (0 = unbounded)
    #[arg(long, default_value_t = 2 << 10)]
    pub cache_bytes: u64,
}

#[derive(Args)]
pub struct GetArgs {
    /// Base URL of the node to ask
    pub peer: String,
    pub namespace: String,
    pub key: String,
    #[arg(long, default_value = hoard_protocol::DEFAULT_BASE_PATH)]
    pub base_path: String,
    #[arg(long, default_value_t = 3_000)]
    pub timeout_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve_defaults() {
        let cli = Cli::try_parse_from(["hoard", "serve"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert!(args.config.is_none());
            assert!(args.bind.is_none());
            assert!(args.peers.is_empty());
            assert_eq!(args.cache_bytes, 2048);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_serve_peers() {
        let cli = Cli::try_parse_from([
            "hoard",
            "serve",
            "--bind",
            "127.0.0.1:8002",
            "--peers",
            "http://127.0.0.1:8001,http://127.0.0.1:8002",
            "--api",
            "127.0.0.1:9999",
        ])
        .unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind, Some("127.0.0.1:8002".parse().unwrap()));
            assert_eq!(args.peers.len(), 2);
            assert_eq!(args.api, Some("127.0.0.1:9999".parse().unwrap()));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_serve_rejects_bad_address() {
        assert!(Cli::try_parse_from(["hoard", "serve", "--bind", "nowhere"]).is_err());
    }

    #[test]
    fn parse_get() {
        let cli = Cli::try_parse_from([
            "hoard",
            "-v",
            "get",
            "http://127.0.0.1:8001",
            "scores",
            "Tom",
        ])
        .unwrap();
        assert!(cli.verbose);
        if let Command::Get(args) = cli.command {
            assert_eq!(args.peer, "http://127.0.0.1:8001");
            assert_eq!(args.namespace, "scores");
            assert_eq!(args.key, "Tom");
            assert_eq!(args.base_path, "/_cache/");
            assert_eq!(args.timeout_ms, 3000);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn get_requires_key() {
        assert!(Cli::try_parse_from(["hoard", "get", "http://127.0.0.1:8001", "scores"]).is_err());
    }
}
