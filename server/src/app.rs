//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::{ConnectorClient, ProxyClient};
use crate::domain::ProvenanceService;
use crate::domain::provenance::Credential;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub provenance: Arc<ProvenanceService>,
    pub connector: Option<Arc<ConnectorClient>>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let app = Self::init(&cli_config)?;
        match command {
            Some(Commands::Trace { epc, token, graph }) => app.trace(&epc, token, graph).await,
            Some(Commands::Start) | None => Self::start_server(app).await,
        }
    }

    fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;

        let proxy = ProxyClient::new(&config.proxy).context("Failed to create proxy client")?;
        let provenance = Arc::new(ProvenanceService::new(
            Arc::new(proxy),
            config.strategy,
            config.narrative.clone(),
        ));

        let connector = match &config.connector.url {
            Some(url) => Some(Arc::new(
                ConnectorClient::new(url, config.connector.timeout_secs)
                    .context("Failed to create connector client")?,
            )),
            None => {
                tracing::debug!("No connector URL configured, payload uploads disabled");
                None
            }
        };

        Ok(Self {
            shutdown: ShutdownService::new(),
            config,
            provenance,
            connector,
        })
    }

    /// One-shot trace printed to stdout as pretty JSON
    async fn trace(&self, epc: &str, token: String, graph: bool) -> Result<()> {
        let credential = Credential::new(token);
        let output = if graph {
            let events = self
                .provenance
                .graph_for_item(&credential, epc)
                .await
                .with_context(|| format!("Failed to trace {}", epc))?;
            serde_json::to_string_pretty(&events)?
        } else {
            let narrative = self
                .provenance
                .narrative_for_item(&credential, epc)
                .await
                .with_context(|| format!("Failed to trace {}", epc))?;
            serde_json::to_string_pretty(&narrative)?
        };
        println!("{}", output);
        Ok(())
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        // Logs go to stderr so `trace` output stays pipeable
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        banner::print_banner(&app.config);

        let server = ApiServer::new(app);
        let app = server.start().await?;
        tracing::info!(triggered = app.shutdown.is_triggered(), "Server shut down");

        Ok(())
    }
}
