use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::config::BuildStrategy;
use super::constants::{
    ENV_CONFIG, ENV_CONNECTOR_URL, ENV_HOST, ENV_PORT, ENV_PROXY_URL, ENV_TRACE_STRATEGY,
};

#[derive(Parser)]
#[command(name = "provenance")]
#[command(version, about = "Food provenance trace service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Provenance proxy base URL
    #[arg(long, global = true, env = ENV_PROXY_URL)]
    pub proxy_url: Option<String>,

    /// Connector base URL (payload uploads are disabled without it)
    #[arg(long, global = true, env = ENV_CONNECTOR_URL)]
    pub connector_url: Option<String>,

    /// Record-set build strategy (batched or per_event)
    #[arg(long, global = true, env = ENV_TRACE_STRATEGY, value_parser = parse_build_strategy)]
    pub trace_strategy: Option<BuildStrategy>,
}

/// Parse build strategy from CLI/env string
fn parse_build_strategy(s: &str) -> Result<BuildStrategy, String> {
    match s.to_lowercase().as_str() {
        "batched" => Ok(BuildStrategy::Batched),
        "per_event" | "per-event" => Ok(BuildStrategy::PerEvent),
        _ => Err(format!(
            "Invalid trace strategy '{}'. Valid options: batched, per_event",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Trace one item and print the result as JSON
    Trace {
        /// Item identifier (EPC or lot)
        epc: String,

        /// Authorization value forwarded to the provenance proxy
        #[arg(long, short = 't')]
        token: String,

        /// Print the nested event graph instead of the narrative view
        #[arg(long)]
        graph: bool,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub proxy_url: Option<String>,
    pub connector_url: Option<String>,
    pub trace_strategy: Option<BuildStrategy>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        config: cli.config,
        proxy_url: cli.proxy_url,
        connector_url: cli.connector_url,
        trace_strategy: cli.trace_strategy,
    };
    (config, cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_strategy() {
        assert_eq!(parse_build_strategy("batched"), Ok(BuildStrategy::Batched));
        assert_eq!(parse_build_strategy("PER_EVENT"), Ok(BuildStrategy::PerEvent));
        assert_eq!(parse_build_strategy("per-event"), Ok(BuildStrategy::PerEvent));
        assert!(parse_build_strategy("lazy").is_err());
    }

    #[test]
    fn test_trace_command() {
        let cli = Cli::try_parse_from([
            "provenance",
            "trace",
            "urn:epc:class:lgtin:1.2.LOT",
            "--token",
            "Bearer abc",
            "--graph",
            "--trace-strategy",
            "per_event",
        ])
        .unwrap();

        assert_eq!(cli.trace_strategy, Some(BuildStrategy::PerEvent));
        match cli.command {
            Some(Commands::Trace { epc, token, graph }) => {
                assert_eq!(epc, "urn:epc:class:lgtin:1.2.LOT");
                assert_eq!(token, "Bearer abc");
                assert!(graph);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_trace_requires_token() {
        assert!(Cli::try_parse_from(["provenance", "trace", "epc"]).is_err());
    }

    #[test]
    fn test_no_command_defaults_to_server() {
        let cli = Cli::try_parse_from(["provenance", "-p", "8080"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.port, Some(8080));
    }
}
