//! esg-bot: ESG question answering actions.
//!
//! Single-binary Tokio application that:
//! 1. Loads configuration (.env, config.toml, env overrides)
//! 2. Loads or seeds the company ESG cache
//! 3. Runs one action from the command line, or an interactive loop
//!    where each line is one conversational turn

mod actions;
mod config;

use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::{error, info};

use common::config::BotConfig;
use esg_store::EsgAdapter;

/// ESG chatbot actions
#[derive(Parser)]
#[command(name = "esg-bot", about = "Answer ESG questions from the simulated data set")]
struct Cli {
    /// Directory holding the company cache and snapshots (overrides config).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
enum Command {
    /// CO2 emissions for a period.
    Emissions {
        #[arg(long)]
        period: Option<String>,
    },
    /// Gender parity, for one department or overall.
    Parity {
        #[arg(long)]
        department: Option<String>,
    },
    /// ESG training hours for a period.
    Training {
        #[arg(long)]
        period: Option<String>,
    },
    /// Suppliers scoring below the threshold.
    Suppliers {
        #[arg(long)]
        threshold: Option<i64>,
    },
    /// Compare the carbon footprint of two countries.
    Footprint {
        #[arg(long = "country")]
        countries: Vec<String>,
    },
    /// Provider ratings for a company.
    Company {
        ticker: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        refresh: bool,
    },
    /// Write every table to the data directory.
    Export,
    /// Read one request per line from stdin.
    Interactive,
}

type SharedAdapter = Arc<Mutex<EsgAdapter>>;

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "esg_bot=info,esg_store=info".into()),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(dir) = cli.data_dir.clone() {
        cfg.data_dir = dir;
    }

    info!(
        "{}",
        json!({
            "event": "startup",
            "data_dir": cfg.data_dir.display().to_string(),
            "supplier_threshold": cfg.supplier_threshold,
            "default_countries": cfg.default_countries,
        })
    );

    let adapter: SharedAdapter = match EsgAdapter::load(&cfg) {
        Ok(a) => {
            info!(
                "ESG adapter ready: {} companies ({:?})",
                a.cached_tickers().len(),
                a.origin()
            );
            Arc::new(Mutex::new(a))
        }
        Err(e) => {
            error!("Failed to initialise ESG data: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Command::Interactive => {
            if let Err(e) = run_interactive(&adapter, &cfg).await {
                error!("Interactive session failed: {}", e);
                std::process::exit(1);
            }
        }
        command => println!("{}", dispatch(&adapter, &cfg, command).await),
    }
}

/// Run one turn against the shared adapter.
async fn dispatch(adapter: &SharedAdapter, cfg: &BotConfig, command: Command) -> String {
    let mut adapter = adapter.lock().await;
    match command {
        Command::Emissions { period } => {
            actions::action_get_emissions_co2(&adapter, period.as_deref())
        }
        Command::Parity { department } => actions::action_get_parite(&adapter, department.as_deref()),
        Command::Training { period } => actions::action_get_formation_rse(&adapter, period.as_deref()),
        Command::Suppliers { threshold } => actions::action_get_score_fournisseurs(
            &adapter,
            threshold.unwrap_or(cfg.supplier_threshold),
        ),
        Command::Footprint { countries } => {
            actions::action_compare_empreinte_carbone(&adapter, &countries, &cfg.default_countries)
        }
        Command::Company {
            ticker,
            name,
            refresh,
        } => actions::action_get_company_esg(&mut adapter, &ticker, name.as_deref(), refresh),
        Command::Export => actions::action_export_snapshot(&adapter),
        Command::Interactive => actions::UNKNOWN_REQUEST.into(),
    }
}

async fn run_interactive(adapter: &SharedAdapter, cfg: &BotConfig) -> std::io::Result<()> {
    info!("Interactive mode: one request per line, 'quit' to exit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit") {
            break;
        }
        let response = match parse_turn(line) {
            Some(command) => dispatch(adapter, cfg, command).await,
            None => actions::UNKNOWN_REQUEST.into(),
        };
        println!("{}", response);
    }

    info!("Interactive session closed");
    Ok(())
}

/// Parse an interactive line: an intent word followed by its entity text.
fn parse_turn(line: &str) -> Option<Command> {
    let line = line.trim();
    let (intent, rest) = match line.split_once(char::is_whitespace) {
        Some((intent, rest)) => (intent, rest.trim()),
        None => (line, ""),
    };
    let text = (!rest.is_empty()).then(|| rest.to_string());

    let command = match intent.to_lowercase().as_str() {
        "emissions" | "co2" => Command::Emissions { period: text },
        "parity" | "parite" | "parité" => Command::Parity { department: text },
        "training" | "formation" => Command::Training { period: text },
        "suppliers" | "fournisseurs" => Command::Suppliers {
            threshold: text.and_then(|t| t.parse().ok()),
        },
        "footprint" | "empreinte" => Command::Footprint {
            countries: rest.split_whitespace().map(str::to_string).collect(),
        },
        "company" | "entreprise" => {
            let mut words = rest.split_whitespace();
            let ticker = words.next()?.to_string();
            let mut refresh = false;
            let mut name_words = Vec::new();
            for word in words {
                if word == "--refresh" {
                    refresh = true;
                } else {
                    name_words.push(word);
                }
            }
            Command::Company {
                ticker,
                name: (!name_words.is_empty()).then(|| name_words.join(" ")),
                refresh,
            }
        }
        "export" => Command::Export,
        _ => return None,
    };
    Some(command)
}
