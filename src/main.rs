use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use rarebid::app::ports::{DepositPort, EventPublisher, ObjectStore, PaymentGateway};
use rarebid::app::{AuctionUseCase, AuthUseCase, MemberUseCase, PaymentUseCase, ProductUseCase};
use rarebid::commitlint;
use rarebid::config::AppConfig;
use rarebid::infra::event_bus::{run_event_logger, EventBus};
use rarebid::infra::jwt::TokenProvider;
use rarebid::infra::object_store_fs::FsObjectStore;
use rarebid::infra::payment_gateway_http::HttpPaymentGateway;
use rarebid::server::AppState;
use rarebid::storage::{InMemoryStorage, Storage};
use rarebid::{logging, observability, server, tasks};

#[derive(Parser)]
#[command(name = "rarebid")]
#[command(about = "Secondhand-collectibles auction marketplace backend")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server with its background sweeps
    Serve {
        /// Path to the configuration file
        #[arg(long, default_value = "config.toml")]
        config: String,
    },
    /// Lint a commit message (commit-msg hook). Reads the file argument or stdin.
    LintCommit {
        /// Path to the commit message file (the hook's $1)
        file: Option<PathBuf>,
    },
    /// Run one auction start/settle sweep and exit
    Settle {
        #[arg(long, default_value = "config.toml")]
        config: String,
    },
    /// Run one settlement payout batch and exit
    ProcessSettlements {
        #[arg(long, default_value = "config.toml")]
        config: String,
    },
}

fn build_state(config: &AppConfig) -> (Arc<AppState>, Arc<EventBus>) {
    let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
    let bus = Arc::new(EventBus::new(256));
    let events: Arc<dyn EventPublisher> = bus.clone();

    let tokens = Arc::new(TokenProvider::new(&config.jwt.secret));
    let objects: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::new(
        config.object_store.root.as_str(),
        config.object_store.base_url.clone(),
    ));
    let gateway: Arc<dyn PaymentGateway> = Arc::new(HttpPaymentGateway::new(
        config.gateway.base_url.clone(),
        config.gateway.secret_key.clone(),
    ));

    let auth = Arc::new(AuthUseCase::new(
        storage.clone(),
        tokens,
        config.jwt.access_expire_seconds,
        config.jwt.refresh_expire_seconds,
    ));
    let members = Arc::new(MemberUseCase::new(storage.clone()));
    let products = Arc::new(ProductUseCase::new(storage.clone(), objects));
    let payments = Arc::new(PaymentUseCase::new(
        storage.clone(),
        gateway,
        events.clone(),
        config.settlement.fee_rate,
        config.settlement.hold_days,
        config.settlement.batch_size,
    ));
    let deposits: Arc<dyn DepositPort> = payments.clone();
    let auctions = Arc::new(AuctionUseCase::new(
        storage.clone(),
        deposits,
        events,
        config.auction.deposit_rate,
        config.auction.payment_window_hours,
    ));

    let state = Arc::new(AppState {
        storage,
        auth,
        members,
        products,
        auctions,
        payments,
    });
    (state, bus)
}

fn lint_commit(file: Option<PathBuf>) -> std::process::ExitCode {
    let message = match file {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("could not read {}: {}", path.display(), e);
                return std::process::ExitCode::from(2);
            }
        },
        None => {
            let mut buffer = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut buffer) {
                eprintln!("could not read stdin: {}", e);
                return std::process::ExitCode::from(2);
            }
            buffer
        }
    };

    let report = commitlint::lint(&message);
    observability::metrics::lint::checked();

    if report.exempt {
        println!("✓ automated commit, lint skipped");
        return std::process::ExitCode::SUCCESS;
    }
    if report.violations.is_empty() {
        println!("✓ commit message ok");
        return std::process::ExitCode::SUCCESS;
    }

    observability::metrics::lint::rejected();
    eprintln!("✗ commit message has {} problem(s):", report.violations.len());
    for violation in &report.violations {
        eprintln!("  - {}", violation);
    }
    eprintln!("\nexpected format: type(scope): subject");
    std::process::ExitCode::FAILURE
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // The lint subcommand runs as a git hook; keep it free of server setup
    let command = match cli.command {
        Commands::LintCommit { file } => return lint_commit(file),
        command => command,
    };

    logging::init_logging();
    if let Err(e) = observability::init() {
        eprintln!("failed to initialize metrics: {e}");
        return std::process::ExitCode::FAILURE;
    }

    let result = match command {
        Commands::Serve { config } => serve(&config).await,
        Commands::Settle { config } => settle_once(&config).await,
        Commands::ProcessSettlements { config } => process_settlements_once(&config).await,
        Commands::LintCommit { .. } => unreachable!("handled above"),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn serve(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_from(config_path)?;
    let (state, bus) = build_state(&config);

    tokio::spawn(run_event_logger(bus.subscribe()));
    let _handles = tasks::spawn_background_tasks(state.clone(), &config);
    info!("background sweeps started");

    server::start_server(state, &config.object_store.root, config.server.port).await
}

async fn settle_once(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_from(config_path)?;
    let (state, _bus) = build_state(&config);

    let now = chrono::Utc::now();
    let started = state.auctions.start_due_auctions(now).await?;
    let summary = state.auctions.settle_expired(now).await?;

    println!("\n📊 Auction sweep results:");
    println!("   Started: {}", started);
    println!("   Settled with winner: {}", summary.settled);
    println!("   Closed without bids: {}", summary.failed_lots);
    println!("   Errors: {}", summary.errors.len());
    for error in &summary.errors {
        println!("   - {}", error);
    }
    Ok(())
}

async fn process_settlements_once(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_from(config_path)?;
    let (state, _bus) = build_state(&config);

    let paid = state.payments.process_settlements(chrono::Utc::now()).await?;
    println!("\n📊 Settlement batch results:");
    println!("   Paid out: {}", paid);
    Ok(())
}
