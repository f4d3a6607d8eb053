use crate::session::{run_health, run_lookup, run_sources, LookupArgs};
use clap::{Parser, Subcommand};
use corenta::config::AppConfig;
use corenta::error::AppError;
use corenta::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "corenta",
    about = "Autodiagnóstico de cumplimiento tributario por NIT",
    version
)]
struct Cli {
    /// Host context used to pick the compliance service (loopback means local)
    #[arg(long, global = true)]
    host: Option<String>,
    /// Explicit compliance service URL; wins over --host
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up a NIT and render its compliance report
    Consultar(LookupArgs),
    /// Check whether the compliance service is reachable
    Health,
    /// List the data sources consulted by the compliance service
    Fuentes,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;

    if let Some(host) = cli.host {
        config.api.set_host(host);
    }
    if let Some(url) = cli.api_url.as_deref() {
        config.api.set_base_url(url)?;
    }

    telemetry::init(&config.telemetry)?;
    tracing::debug!(?config.environment, base_url = %config.api.base_url, "configuration loaded");

    match cli.command {
        Command::Consultar(args) => run_lookup(&config, args).await,
        Command::Health => run_health(&config).await,
        Command::Fuentes => run_sources(&config).await,
    }
}
