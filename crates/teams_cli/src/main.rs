//! `teams` operator CLI.
//!
//! Settings come from `TEAMS_DB_PATH`, `TEAMS_LOG_LEVEL` and `TEAMS_LOG_DIR`;
//! the global flags override them.

use clap::{Parser, Subcommand};
use log::error;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use teams_core::db::open_db;
use teams_core::sequence::KNOWN_NAMESPACES;
use teams_core::{
    init_logging, CoreConfig, GroupService, ImportEndpoint, ImportError, ImportReconciler,
    LogTarget, SqliteRepository, SqliteSequenceAllocator,
};

/// Exit code for rejected import calls (bad group, malformed snapshot).
const EXIT_IMPORT_REJECTED: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "teams")]
#[command(version, about = "Teams backend maintenance tools", long_about = None)]
struct Cli {
    /// SQLite database file.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log level: trace, debug, info, warn or error.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rotating log files. Logs go to stderr when unset.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create zero-valued counters for every known namespace.
    InitSequences,
    /// Create a group and print its id.
    CreateGroup {
        name: String,
        #[arg(long)]
        club: Option<String>,
    },
    /// Import a legacy snapshot file into a group and print the response.
    Import {
        group_id: String,
        snapshot: PathBuf,
    },
    /// Print the last value issued by a namespace.
    ShowSequence { namespace: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            if err.downcast_ref::<ImportError>().is_some() {
                ExitCode::from(EXIT_IMPORT_REJECTED)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = CoreConfig::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(dir) = cli.log_dir {
        config.log_target = LogTarget::Directory(dir);
    }
    let level = cli.log_level.as_deref().unwrap_or(config.log_level);
    init_logging(level, config.log_target.clone())?;

    let conn = open_db(&config.db_path)?;
    let allocator = SqliteSequenceAllocator::new(&conn);
    let repo = SqliteRepository::new(&conn);

    match cli.command {
        Commands::InitSequences => {
            let created = allocator.initialize(KNOWN_NAMESPACES)?;
            println!("created {created} of {} namespaces", KNOWN_NAMESPACES.len());
        }
        Commands::CreateGroup { name, club } => {
            let group = GroupService::new(&allocator, &repo).create_group(&name, club.as_deref())?;
            println!("{}", group.id);
        }
        Commands::Import { group_id, snapshot } => {
            let raw = std::fs::read_to_string(&snapshot)
                .map_err(|err| format!("cannot read {}: {err}", snapshot.display()))?;
            let endpoint = ImportEndpoint::new(ImportReconciler::new(&allocator, &repo), &repo);
            let response = endpoint.handle(&group_id, &raw).map_err(|err| {
                error!(
                    "event=cli_import module=cli status=error status_code={} error={}",
                    err.status_code(),
                    err
                );
                err
            })?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::ShowSequence { namespace } => {
            println!("{}", allocator.current(&namespace)?);
        }
    }
    Ok(())
}
