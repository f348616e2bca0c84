//! Create a database and optionally wait for it to converge
//!
//! The command is strictly sequential: one `create` call, then (if a target
//! state was given) the poller. The first error ends the run and nothing that
//! was already created is cleaned up.

use std::future::Future;
use std::io::Write;

use colored::Colorize;
use dbctl_core::{
    CreationSpec, DatabaseApi, PollConfig, ProgressCallback, ProgressEvent, wait_for_state,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::Cli;
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output::{OutputFormat, render};

/// What a dry run shows: the request as it would be sent, plus the wait plan
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DryRunPlan<'a> {
    database: &'a CreationSpec,
    wait: WaitPlan<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WaitPlan<'a> {
    target_state: Option<&'a str>,
    interval_seconds: u64,
    max_wait_seconds: u64,
}

impl<'a> DryRunPlan<'a> {
    fn new(spec: &'a CreationSpec, poll: &'a PollConfig) -> Self {
        Self {
            database: spec,
            wait: WaitPlan {
                target_state: poll.target_state(),
                interval_seconds: poll.interval().as_secs(),
                max_wait_seconds: poll.deadline().as_secs(),
            },
        }
    }
}

/// Handle the top-level command
///
/// Configuration is only loaded once a real request is about to be sent, so a
/// dry run works without any profile or credentials.
pub async fn handle_create<C, T>(cli: &Cli, cancel: C) -> CliResult<()>
where
    C: Future<Output = T>,
{
    let spec = cli.database.to_spec();
    spec.validate()?;
    let poll = cli.wait.to_poll_config()?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if cli.dry_run {
        info!("Dry run requested, no API calls will be made");
        eprintln!("{}", "Dry run: request not sent".yellow());
        writeln!(out, "{}", render(&DryRunPlan::new(&spec, &poll), cli.output)?)?;
        return Ok(());
    }

    let conn_mgr = ConnectionManager::load(cli.config_file.as_ref())?;
    let client = conn_mgr.create_database_client(cli.profile.as_deref())?;
    provision(&client, &spec, &poll, cli.output, &mut out, cancel).await
}

/// Create the database, print it, then wait for the target state if one is set
pub async fn provision<A, W, C, T>(
    api: &A,
    spec: &CreationSpec,
    poll: &PollConfig,
    format: OutputFormat,
    out: &mut W,
    cancel: C,
) -> CliResult<()>
where
    A: DatabaseApi + ?Sized,
    W: Write,
    C: Future<Output = T>,
{
    debug!("Creating database {} in home {}", spec.name, spec.home_id);
    let database = api.create(spec).await?;
    info!("Database {} created", database.id);

    writeln!(out, "{}", render(&database, format)?)?;
    out.flush()?;

    let Some(target) = poll.target_state() else {
        debug!("No target state given, not waiting");
        return Ok(());
    };

    info!("Waiting for database {} to reach {}", database.id, target);
    let report = wait_for_state(api, &database.id, poll, cancel, Some(progress_printer())).await?;
    debug!(
        "Database {} reached {} after {} checks in {:?}",
        database.id, report.state, report.attempts, report.elapsed
    );

    writeln!(out, "Database state is: {}", report.state)?;
    Ok(())
}

/// Status lines go to stderr so stdout stays machine-readable
fn progress_printer() -> ProgressCallback {
    Box::new(|event| {
        if let Some(line) = status_line(&event) {
            eprintln!("{}", line);
        }
    })
}

/// One line per completed status query, the matching one included
fn status_line(event: &ProgressEvent) -> Option<String> {
    match event {
        ProgressEvent::Polling { status, .. } | ProgressEvent::Converged { status, .. } => {
            Some(format!("Current database status is: {}", status))
        }
        ProgressEvent::Started { .. } => None,
    }
}
