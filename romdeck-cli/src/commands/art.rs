use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use super::{platform_roms, spinner};
use crate::error::CliError;
use crate::session::Session;

/// Fill in missing cover art for a platform. With `check`, also replace
/// covers the server has updated.
pub(crate) async fn run_art(session: &Session, slug: &str, check: bool) -> Result<(), CliError> {
    if !session.config.download_art {
        log::info!("Artwork downloads are disabled (download_art = false).");
        return Ok(());
    }
    let platform = session.platform(slug)?;
    let roms = platform_roms(session, platform).await?;

    if check {
        let pb = spinner(format!("Checking {} cover(s)...", roms.len()));
        let outdated = session.artwork.get_outdated(session.remote(), &roms).await;
        pb.set_message(format!("Updating {} cover(s)...", outdated.len()));
        let mut updated = 0;
        for rom in &outdated {
            match session.artwork.download(session.remote(), rom).await {
                Ok(_) => updated += 1,
                Err(e) => pb.suspend(|| log::warn!("{}: {e}", rom.name)),
            }
        }
        pb.finish_and_clear();
        log::info!(
            "{} {} of {} outdated cover(s) updated",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            updated,
            outdated.len(),
        );
    }

    let pb = spinner(format!("Fetching artwork for {}...", platform.name));
    let summary = session
        .artwork
        .sync_in_background(session.remote(), &roms)
        .await;
    pb.finish_and_clear();

    log::info!(
        "{} {} downloaded, {} already cached or without art",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        summary.downloaded,
        summary.skipped,
    );
    if summary.failed > 0 {
        log::warn!(
            "{} {} cover(s) failed (run with RUST_LOG=debug for details)",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            summary.failed,
        );
    }
    Ok(())
}
