//! CLI entrypoint for Role Quorum
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use role_quorum_application::{
    AuditLogger, NoAuditLogger, RequestService, ServiceError, StateStore, SweepReport, Verdict,
    VotingParams,
};
use role_quorum_domain::{MessageId, NewRequest, RequestId, RequestRecord, Timestamp, UserId};
use role_quorum_infrastructure::{ConfigLoader, FileConfig, JsonFileStateStore, JsonlAuditLogger};
use role_quorum_presentation::{Cli, Command, ConsoleFormatter, OutputFormat};
use std::path::Path;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Exit status for requests the engine rejected as invalid input
const EXIT_USER_ERROR: i32 = 2;

#[tokio::main]
async fn main() {
    if let Err(e) = try_main().await {
        eprintln!("Error: {:#}", e);
        let user_error = e
            .downcast_ref::<ServiceError>()
            .is_some_and(ServiceError::is_user_error);
        std::process::exit(if user_error { EXIT_USER_ERROR } else { 1 });
    }
}

async fn try_main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    let _log_guard = init_logging(cli.verbose, config.logging.file.as_deref())?;

    info!("Starting Role Quorum");

    for issue in config.validate()? {
        warn!("Config: {}", issue.message);
    }

    match &cli.command {
        Command::Rules => {
            println!("{}", ConsoleFormatter::rules(&config.roles.to_policy()));
            return Ok(());
        }
        Command::Config => {
            if !cli.no_config {
                ConfigLoader::print_config_sources(cli.config.as_ref());
                println!();
            }
            println!("{}", ConsoleFormatter::format_json(&config));
            return Ok(());
        }
        _ => {}
    }

    // === Dependency Injection ===
    let state_file = cli
        .state_file
        .clone()
        .unwrap_or_else(|| config.storage.state_file.clone());
    info!("Using state file {}", state_file.display());

    let store = JsonFileStateStore::new(state_file);
    let mut service = RequestService::load(store, config.roles.to_policy(), now())
        .with_audit_logger(audit_logger(&config));

    run(&cli, &mut service, &config.voting.to_params()).await
}

/// Initialize logging based on verbosity level, with an optional log file
fn init_logging(verbose: u8, file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("Invalid log file path: {}", path.display()))?;

            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

fn audit_logger(config: &FileConfig) -> Arc<dyn AuditLogger> {
    match config
        .logging
        .audit_file
        .as_ref()
        .and_then(JsonlAuditLogger::open)
    {
        Some(logger) => {
            info!("Writing audit log to {}", logger.path().display());
            Arc::new(logger)
        }
        None => Arc::new(NoAuditLogger),
    }
}

fn now() -> Timestamp {
    chrono::Utc::now().timestamp()
}

async fn run<S: StateStore>(
    cli: &Cli,
    service: &mut RequestService<S>,
    params: &VotingParams,
) -> Result<()> {
    let format = cli.output;

    match cli.command.clone() {
        Command::Open {
            requester,
            id,
            title,
            role,
            deadline,
        } => {
            let deadline = deadline.unwrap_or_else(|| params.deadline_from(now()));
            let mut draft =
                NewRequest::new(UserId::new(requester), RequestId::new(id), title, deadline);
            if let Some(role) = role {
                draft = draft.with_role(role);
            }

            let id = service.open(draft)?;
            let request = service
                .get(id)
                .context("Request disappeared after opening")?;
            match format {
                OutputFormat::Json => {
                    println!("{}", ConsoleFormatter::format_json(&request.to_record()))
                }
                OutputFormat::Text => println!("{}", ConsoleFormatter::request(request, now())),
            }
        }

        Command::Prompt { id, message } => {
            service.set_prompt(RequestId::new(id), MessageId::new(message))?;
            println!("Prompt message set for request {}.", id);
        }

        Command::Vote {
            id,
            voter,
            roles,
            choice,
        } => {
            let cast = service.vote(
                RequestId::new(id),
                UserId::new(voter),
                &roles,
                choice.into(),
            )?;
            match format {
                OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&cast)),
                OutputFormat::Text => println!("{}", ConsoleFormatter::cast_vote(&cast)),
            }
        }

        Command::Cancel { id, voter } => {
            service.cancel_vote(RequestId::new(id), UserId::new(voter))?;
            println!("Your vote has been cancelled.");
        }

        Command::Feedback { id, voter, text } => {
            service.submit_feedback(RequestId::new(id), UserId::new(voter), text)?;
            println!("Feedback submitted.");
        }

        Command::Veto {
            id,
            moderator,
            choice,
        } => {
            let user = UserId::new(moderator.moderator);
            service.ensure_moderator(user, &moderator.roles)?;
            service.set_veto(RequestId::new(id), user, choice.approves())?;
            println!(
                "Veto recorded: request {} will be {} when it closes.",
                id,
                if choice.approves() { "approved" } else { "denied" }
            );
        }

        Command::End {
            id,
            moderator,
            outcome,
        } => {
            let user = UserId::new(moderator.moderator);
            service.ensure_moderator(user, &moderator.roles)?;
            match service.end_early(RequestId::new(id), user, outcome.into()) {
                Ok(verdict) => print_verdicts(format, &[verdict]),
                Err(e) => {
                    if let Some(verdict) = e.verdict() {
                        print_verdicts(format, std::slice::from_ref(verdict));
                    }
                    return Err(e.into());
                }
            }
        }

        Command::Remove { id, moderator } => {
            let user = UserId::new(moderator.moderator);
            service.ensure_moderator(user, &moderator.roles)?;
            let removed = service.remove(RequestId::new(id))?;
            println!(
                "Removed {} request {} without a decision.",
                removed.role(),
                id
            );
        }

        Command::Show { id: Some(id) } => {
            let Some(request) = service.latest(RequestId::new(id)) else {
                bail!("Request {} is not active and has no closed requests", id);
            };
            match format {
                OutputFormat::Json => {
                    println!("{}", ConsoleFormatter::format_json(&request.to_record()))
                }
                OutputFormat::Text => println!("{}", ConsoleFormatter::request(request, now())),
            }
        }

        Command::Show { id: None } => {
            let active = service.registry().active();
            match format {
                OutputFormat::Json => {
                    let records: Vec<RequestRecord> = active.map(|r| r.to_record()).collect();
                    println!("{}", ConsoleFormatter::format_json(&records));
                }
                OutputFormat::Text => print!("{}", ConsoleFormatter::active(active, now())),
            }
        }

        Command::History { id } => {
            let history = service.history(RequestId::new(id));
            match format {
                OutputFormat::Json => {
                    let records: Vec<RequestRecord> =
                        history.iter().map(|r| r.to_record()).collect();
                    println!("{}", ConsoleFormatter::format_json(&records));
                }
                OutputFormat::Text => print!("{}", ConsoleFormatter::history(history)),
            }
        }

        Command::Sweep { now: at } => {
            let report = service.sweep(at.unwrap_or_else(now));
            if report.is_empty() && format == OutputFormat::Text {
                println!("No expired requests.");
            }
            print_sweep(format, &report);
            if report.has_failures() {
                bail!("{} expired requests could not be finalized", report.failures.len());
            }
        }

        Command::Watch => watch(service, params, format).await?,

        Command::Rules | Command::Config => {}
    }

    Ok(())
}

/// Sweep expired requests every check interval until Ctrl-C
async fn watch<S: StateStore>(
    service: &mut RequestService<S>,
    params: &VotingParams,
    format: OutputFormat,
) -> Result<()> {
    let mut ticker = tokio::time::interval(params.check_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        "Watching {} active requests, checking every {:?}",
        service.registry().len(),
        params.check_interval
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => print_sweep(format, &service.sweep(now())),
            result = &mut shutdown => {
                result.context("Failed to listen for Ctrl-C")?;
                info!("Stopping watch");
                break;
            }
        }
    }

    Ok(())
}

/// Print every verdict, then log each request the sweep could not finalize
fn print_sweep(format: OutputFormat, report: &SweepReport) {
    print_verdicts(format, &report.verdicts);
    for (id, e) in &report.failures {
        error!("Failed to finalize request {}: {}", id, e);
    }
}

fn print_verdicts(format: OutputFormat, verdicts: &[Verdict]) {
    for verdict in verdicts {
        match format {
            OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(verdict)),
            OutputFormat::Text => println!("{}", ConsoleFormatter::verdict(verdict)),
        }
    }
}
