use billsplit::application::service::SplitService;
use billsplit::domain::group::GroupId;
use billsplit::domain::user::UserId;
use billsplit::infrastructure::in_memory::{
    InMemoryExpenseStore, InMemoryGroupStore, InMemoryUserStore,
};
use billsplit::interfaces::csv::balance_writer::BalanceWriter;
use billsplit::interfaces::csv::expense_reader::ExpenseReader;
use billsplit::interfaces::ledger::LedgerReader;
use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON ledger of users, groups and expenses to load
    #[arg(long, env = "BILLSPLIT_LEDGER")]
    ledger: Option<PathBuf>,

    /// CSV file of equally split expenses to load after the ledger
    #[arg(long)]
    expenses: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "BILLSPLIT_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Log filter directive, e.g. `info` or `billsplit=debug`
    #[arg(long, env = "BILLSPLIT_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pairwise balances of the viewer against every other group member
    Balances {
        #[arg(long)]
        group: String,
        #[arg(long)]
        viewer: String,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Net position of every group member
    Net {
        #[arg(long)]
        group: String,
        #[arg(long)]
        viewer: String,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// What the viewer owes and is owed across all of their groups
    Overview {
        #[arg(long)]
        viewer: String,
    },
    /// The group's expenses, newest first
    Expenses {
        #[arg(long)]
        group: String,
        #[arg(long)]
        viewer: String,
    },
    /// The viewer's groups, newest first
    Groups {
        #[arg(long)]
        viewer: String,
    },
    /// Recent expenses across all of the viewer's groups
    Activity {
        #[arg(long)]
        viewer: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log_level).into_diagnostic()?)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();

    let service = open_service(cli.db_path.as_deref())?;

    if let Some(path) = &cli.ledger {
        let file = File::open(path).into_diagnostic()?;
        let ledger = LedgerReader::new(file).read().into_diagnostic()?;
        let stats = ledger.apply(&service).await;
        tracing::info!(
            applied = stats.applied,
            skipped = stats.skipped,
            rejected = stats.rejected,
            "ledger loaded"
        );
    }

    if let Some(path) = &cli.expenses {
        load_expenses(&service, path).await?;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Balances {
            group,
            viewer,
            format,
        } => {
            let report = service
                .group_balances(&GroupId::new(group), &UserId::new(viewer))
                .await
                .into_diagnostic()?;
            match format {
                Format::Json => write_json(&mut out, &report)?,
                Format::Csv => BalanceWriter::new(&mut out)
                    .write_members(&report.members)
                    .into_diagnostic()?,
            }
        }
        Command::Net {
            group,
            viewer,
            format,
        } => {
            let positions = service
                .group_net_balances(&GroupId::new(group), &UserId::new(viewer))
                .await
                .into_diagnostic()?;
            match format {
                Format::Json => write_json(&mut out, &positions)?,
                Format::Csv => BalanceWriter::new(&mut out)
                    .write_net_positions(&positions)
                    .into_diagnostic()?,
            }
        }
        Command::Overview { viewer } => {
            let overview = service
                .overview(&UserId::new(viewer))
                .await
                .into_diagnostic()?;
            write_json(&mut out, &overview)?;
        }
        Command::Expenses { group, viewer } => {
            let expenses = service
                .list_expenses(&GroupId::new(group), &UserId::new(viewer))
                .await
                .into_diagnostic()?;
            write_json(&mut out, &expenses)?;
        }
        Command::Groups { viewer } => {
            let groups = service
                .user_groups(&UserId::new(viewer))
                .await
                .into_diagnostic()?;
            write_json(&mut out, &groups)?;
        }
        Command::Activity { viewer } => {
            let expenses = service
                .activity(&UserId::new(viewer))
                .await
                .into_diagnostic()?;
            write_json(&mut out, &expenses)?;
        }
    }

    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn open_service(db_path: Option<&Path>) -> Result<SplitService> {
    use billsplit::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(path) => {
            let store = RocksDBStore::open(path).into_diagnostic()?;
            Ok(SplitService::new(
                Box::new(store.clone()),
                Box::new(store.clone()),
                Box::new(store),
            ))
        }
        None => Ok(in_memory_service()),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_service(db_path: Option<&Path>) -> Result<SplitService> {
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory_service())
}

fn in_memory_service() -> SplitService {
    SplitService::new(
        Box::new(InMemoryUserStore::new()),
        Box::new(InMemoryGroupStore::new()),
        Box::new(InMemoryExpenseStore::new()),
    )
}

async fn load_expenses(service: &SplitService, path: &Path) -> Result<()> {
    let file = File::open(path).into_diagnostic()?;
    for row in ExpenseReader::new(file).rows() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tracing::error!("Error reading expense: {e}");
                continue;
            }
        };
        let created = match row.to_request() {
            Ok(request) => {
                service
                    .create_expense(&row.group, &row.paid_by, request)
                    .await
            }
            Err(e) => Err(e),
        };
        if let Err(e) = created {
            tracing::error!("Error processing expense: {e}");
        }
    }
    Ok(())
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).into_diagnostic()?;
    writeln!(out).into_diagnostic()?;
    Ok(())
}
