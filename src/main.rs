use std::env;
use std::path::Path;

use anyhow::Result;
use env_logger::Env;
use log::{error, info};

mod config;
mod data;
mod notify;
mod worktray;

use crate::config::Config;
use crate::notify::{ConsoleNotifier, Notifier};
use crate::worktray::ingest;
use crate::worktray::submit::{self, HttpFormClient, SubmitOptions};
use crate::worktray::tray::Worktray;
use crate::worktray::validate::{self, Rules};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(path) => Config::load(Path::new(path))?,
        None => Config::default(),
    };

    run(&config, &ConsoleNotifier)
}

/// The whole run, in order: confirm, pre-check, stage, validate, submit.
/// Any stage error aborts the sequence; the tray stays on disk in its
/// last-saved state and a re-run picks up where this one left off. There
/// is no cross-process guard: never point two concurrent runs at the same
/// tray file.
fn run(config: &Config, notifier: &dyn Notifier) -> Result<()> {
    info!("------- starting the process -------");

    if !notifier.confirm("Transactions will be loaded into the remote form. Continue?") {
        notifier.notify("The operation has been cancelled.");
        info!("run cancelled by the operator");
        return Ok(());
    }

    info!("step 1: checking the input file");
    let check = ingest::check_input(config)?;
    if !check.passed() {
        notifier.notify(&check.failure_summary());
        error!("input check failed, process terminated");
        return Ok(());
    }

    info!("step 2: creating the worktray");
    let input = ingest::create_worktray(config)?;
    notifier.notify(&format!(
        "A total of {} transactions will be loaded.",
        input.len()
    ));

    info!("step 3: validating the worktray");
    let mut tray = Worktray::load(&config.worktray_path())?;
    let rules = Rules::new()?;
    validate::validate_worktray(&mut tray, &rules)?;

    info!("step 4: submitting to the remote form");
    let client = HttpFormClient::new(config)?;
    let report = submit::submit_worktray(&mut tray, &client, &SubmitOptions::from(config))?;
    notifier.report(report.submitted, report.failed);

    info!("all steps completed");
    Ok(())
}
