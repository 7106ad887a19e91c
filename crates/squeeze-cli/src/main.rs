//! Command-line interface for squeeze

mod render;

use anyhow::bail;
use clap::{Parser, Subcommand};
use squeeze_core::{
    AnalysisProvider, PortfolioOrchestrator, PortfolioSession, SessionState, SqueezeConfig,
    TickerSession,
};
use squeeze_utils::LogConfig;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "squeeze")]
#[command(about = "Is this stock cooked or a rocket under agentic AI?", long_about = None)]
struct Cli {
    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a single ticker
    Analyze {
        /// Ticker symbol, e.g. CRM
        ticker: String,
    },
    /// Analyze 2 to 15 tickers and synthesize a portfolio view
    Portfolio {
        /// Tickers separated by commas or spaces, `$` prefixes allowed
        #[arg(required = true, num_args = 1..)]
        tickers: Vec<String>,
    },
    /// Suggest known tickers matching a prefix or company name
    Suggest {
        input: String,
    },
    /// Describe the five disruption zones
    Zones,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    squeeze_utils::init_tracing_with(&LogConfig::from_env()?);

    let cli = Cli::parse();
    debug!(command = ?cli.command, "Starting squeeze");

    match cli.command {
        Commands::Analyze { ticker } => analyze(&ticker, cli.json).await,
        Commands::Portfolio { tickers } => portfolio(&tickers.join(" "), cli.json).await,
        Commands::Suggest { input } => suggest(&input, cli.json).await,
        Commands::Zones => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&render::zones_json())?);
            } else {
                println!("{}", render::zones_table());
            }
            Ok(())
        }
    }
}

fn provider() -> anyhow::Result<(SqueezeConfig, AnalysisProvider)> {
    let config = SqueezeConfig::from_env()?;
    let provider = AnalysisProvider::from_config(&config)?;
    Ok((config, provider))
}

async fn analyze(ticker: &str, json: bool) -> anyhow::Result<()> {
    let (_, provider) = provider()?;
    let session = TickerSession::new(provider);

    let state = session.submit(ticker).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    }

    match state {
        SessionState::Ready {
            ticker,
            analysis,
            source,
            ..
        } => {
            if !json {
                println!("{}", render::analysis(&ticker, &analysis, source));
            }
            Ok(())
        }
        SessionState::Failed { message, .. } => bail!(message),
        other => bail!("analysis did not finish: {other:?}"),
    }
}

async fn portfolio(input: &str, json: bool) -> anyhow::Result<()> {
    let (config, provider) = provider()?;
    let session = PortfolioSession::new(PortfolioOrchestrator::new(provider, &config));

    let state = session
        .submit(input, |event| {
            if !json {
                eprintln!("{event}");
            }
        })
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else if let Some(report) = state.report() {
        println!("{}", render::portfolio(report));
    }
    Ok(())
}

async fn suggest(input: &str, json: bool) -> anyhow::Result<()> {
    let (_, provider) = provider()?;
    let suggestions = provider.store().suggest(input).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
    } else {
        println!("{}", render::suggestions(&suggestions));
    }
    Ok(())
}
