use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use romdeck_core::SyncAction;
use romdeck_lib::SaveSyncMode;
use romdeck_sync::{SyncReport, execute_item, plan_sync};

use super::{progress_bar, spinner};
use crate::error::CliError;
use crate::session::Session;

/// Plan and run a save sync. `dry_run` stops after printing the plan.
pub(crate) async fn run_saves(session: &Session, dry_run: bool) -> Result<(), CliError> {
    if session.config.save_sync_mode == SaveSyncMode::Off && !dry_run {
        log::info!("Save sync is off (save_sync_mode = \"off\"); showing the plan only.");
        return print_plan(session).await.map(|_| ());
    }

    let plan = print_plan(session).await?;
    if dry_run {
        return Ok(());
    }
    let actionable: Vec<_> = plan
        .items
        .iter()
        .filter(|i| i.action != SyncAction::Skip)
        .collect();
    if actionable.is_empty() {
        log::info!("Nothing to sync.");
        return Ok(());
    }

    let pb = progress_bar(actionable.len() as u64);
    let mut report = SyncReport::default();
    for item in actionable {
        pb.set_message(item.rom_name.clone());
        report
            .results
            .push(execute_item(session.remote(), &session.config, item).await);
        pb.inc(1);
    }
    pb.finish_and_clear();

    log::info!(
        "{} {} uploaded, {} downloaded",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        report.succeeded(SyncAction::Upload),
        report.succeeded(SyncAction::Download),
    );
    for failure in report.failures() {
        log::warn!(
            "{} {} {}: {}",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            failure.action,
            failure.rom_name,
            failure.error.as_deref().unwrap_or("unknown error"),
        );
    }
    Ok(())
}

async fn print_plan(session: &Session) -> Result<romdeck_sync::SyncPlan, CliError> {
    let pb = spinner("Scanning saves...");
    let plan = plan_sync(session.remote(), &session.config, &session.hashes).await;
    pb.finish_and_clear();
    let plan = plan?;

    for item in &plan.items {
        let label = match item.action {
            SyncAction::Upload => "upload  ".if_supports_color(Stdout, |t| t.yellow()).to_string(),
            SyncAction::Download => "download".if_supports_color(Stdout, |t| t.cyan()).to_string(),
            SyncAction::Skip => "ok      ".if_supports_color(Stdout, |t| t.dimmed()).to_string(),
        };
        log::info!("  {} {}", label, item.rom_name);
    }
    for save in &plan.unmatched {
        log::info!(
            "  {} {}",
            "unmatched".if_supports_color(Stdout, |t| t.red()),
            save.path.display(),
        );
    }
    if plan.is_empty() {
        log::info!("No saves found on the card or the server.");
    }
    Ok(plan)
}
