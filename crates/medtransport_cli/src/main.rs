//! Command-line front end for the scheduling reports.
//!
//! # Responsibility
//! - Load store configuration, open the database and run one report.
//! - Print report results as JSON, the shape the web layer serves.

use clap::{Args, Parser, Subcommand};
use log::info;
use medtransport_core::{
    parse_permission, supported_permission_names, GrantTable, Permission, SchedulingService,
    SqliteSchedulingRepository, StoreConfig, UserId, DEFAULT_RECENT_LIMIT,
};
use serde_json::json;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "medtransport", version, about = "Patient-transport scheduling reports")]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every report.
#[derive(Args, Debug)]
struct StoreArgs {
    /// JSON config file. `MEDTRANSPORT_*` variables override its values.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Database URI; wins over config file and environment.
    #[arg(long, value_name = "URI", global = true)]
    database: Option<String>,
    /// User the report runs as.
    #[arg(long, value_name = "ID", default_value_t = 0, global = true)]
    user: UserId,
    /// Grant a permission before running, as `USER_ID:PERMISSION`. Repeatable.
    #[arg(long = "grant", value_name = "USER_ID:PERMISSION", global = true)]
    grants: Vec<String>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print core health and version.
    Ping,
    /// List the permission names accepted by `--grant`.
    Permissions,
    #[command(flatten)]
    Report(ReportCommand),
}

/// Subcommands that read the scheduling store.
#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Total number of scheduling records.
    Count,
    /// Most recent bookings with patient and hospital names.
    Recent {
        #[arg(long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: u32,
    },
    /// Bookings per month, January first.
    Monthly {
        /// Calendar year; defaults to the current local year.
        #[arg(long)]
        year: Option<i32>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let output = match cli.command {
        Commands::Ping => ping_json(),
        Commands::Permissions => permissions_json(),
        Commands::Report(report) => run_report(report, &cli.store)?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_report(
    command: ReportCommand,
    store: &StoreArgs,
) -> Result<serde_json::Value, Box<dyn Error>> {
    let mut config = match &store.config {
        Some(path) => StoreConfig::from_file(path)?,
        None => StoreConfig::default(),
    }
    .with_env_overrides()?;
    if let Some(uri) = &store.database {
        config.database_uri = uri.clone();
    }
    config.init_logging()?;

    let permissions = parse_grants(&store.grants)?;
    let conn = config.open_database()?;
    let service = SchedulingService::new(SqliteSchedulingRepository::try_new(&conn)?, permissions);

    let output = match command {
        ReportCommand::Count => json!({ "total": service.count_all(store.user)? }),
        ReportCommand::Recent { limit } => {
            serde_json::to_value(service.list_recent(store.user, limit)?)?
        }
        ReportCommand::Monthly { year: Some(year) } => {
            serde_json::to_value(service.monthly_counts_for_year(store.user, year)?)?
        }
        ReportCommand::Monthly { year: None } => {
            serde_json::to_value(service.monthly_counts_current_year(store.user)?)?
        }
    };

    info!("event=cli_report module=cli status=ok user_id={}", store.user);
    Ok(output)
}

fn ping_json() -> serde_json::Value {
    json!({
        "ping": medtransport_core::ping(),
        "version": medtransport_core::core_version(),
    })
}

fn permissions_json() -> serde_json::Value {
    let entries: Vec<_> = supported_permission_names()
        .iter()
        .filter_map(|name| parse_permission(name).ok())
        .map(|permission: Permission| {
            json!({ "name": permission.as_str(), "description": permission.description() })
        })
        .collect();
    serde_json::Value::from(entries)
}

fn parse_grants(values: &[String]) -> Result<GrantTable, String> {
    let mut table = GrantTable::new();
    for value in values {
        let (user, permission) = value
            .split_once(':')
            .ok_or_else(|| format!("grant `{value}` must look like USER_ID:PERMISSION"))?;
        let user_id: UserId = user
            .trim()
            .parse()
            .map_err(|err| format!("grant `{value}` has an invalid user id: {err}"))?;
        let permission = parse_permission(permission).map_err(|err| {
            format!(
                "grant `{value}`: {err} (supported: {})",
                supported_permission_names().join(", ")
            )
        })?;
        table.grant(user_id, permission);
    }
    Ok(table)
}
