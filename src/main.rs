use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use periodscan::config::{LogFormat, LoggingConfig, ScanConfig};
use periodscan::sink::{JsonSink, LineSink, PlotSink, ResultSink};
use periodscan::source::{DataSource, FileSource, QueryWindow, WavefrontSource};

#[derive(Parser)]
#[command(
    name = "periodscan",
    about = "Rank metric time series by how strongly they oscillate",
    version,
    long_about = None
)]
struct Cli {
    /// TOML config file (defaults: $PERIODSCAN_CONFIG, then /etc/periodscan/periodscan.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the metrics store for a metric and rank its hosts by periodicity
    Scan {
        /// Metric name, e.g. cpu.loadavg.1m
        metric: String,

        /// Draw each retained spectrum and wait for Enter
        #[arg(long)]
        plot: bool,

        /// Print results as a JSON array instead of CSV lines
        #[arg(long, conflicts_with = "plot")]
        json: bool,

        /// Base URL of the metrics store
        #[arg(long, env = "WF_URL")]
        url: Option<String>,

        /// API token
        #[arg(long, env = "WF_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Rank the series in a saved chart API response
    Analyze {
        /// Path to the JSON response
        file: PathBuf,

        /// Draw each retained spectrum and wait for Enter
        #[arg(long)]
        plot: bool,

        /// Print results as a JSON array instead of CSV lines
        #[arg(long, conflicts_with = "plot")]
        json: bool,
    },

    /// Print the effective configuration as TOML
    PrintConfig,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));
    // stdout carries results only.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match logging.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Load the config under a stderr subscriber so fallback warnings are not
/// lost before the configured one is installed.
fn load_config(path: Option<&std::path::Path>) -> Result<ScanConfig> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::with_default(bootstrap, || match path {
        Some(path) => ScanConfig::load(path),
        None => Ok(ScanConfig::load_or_default()),
    })
}

fn make_sink(plot: bool, json: bool) -> Box<dyn ResultSink> {
    if json {
        Box::new(JsonSink::new(std::io::stdout()))
    } else if plot {
        Box::new(PlotSink::new(
            LineSink::new(std::io::stdout()),
            std::io::stdin().lock(),
            std::io::stderr(),
        ))
    } else {
        Box::new(LineSink::new(std::io::stdout()))
    }
}

async fn scan_with<D: DataSource>(
    source: &D,
    config: &ScanConfig,
    plot: bool,
    json: bool,
) -> Result<()> {
    let window = QueryWindow::ending_now(&config.analysis);
    let mut sink = make_sink(plot, json);
    periodscan::run(source, &window, sink.as_mut(), &config.analysis, plot).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Scan {
            metric,
            plot,
            json,
            url,
            token,
        } => {
            tracing::info!(%metric, plot, "Scanning metric");
            let source = WavefrontSource::new(
                url.or_else(|| config.source.base_url.clone()),
                token,
                metric,
                Duration::from_secs(config.source.timeout_secs),
            )
            .context("failed to configure chart source")?;
            scan_with(&source, &config, plot, json).await?;
        }
        Commands::Analyze { file, plot, json } => {
            tracing::info!(file = %file.display(), plot, "Analyzing saved response");
            let source = FileSource::new(file);
            scan_with(&source, &config, plot, json).await?;
        }
        Commands::PrintConfig => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
