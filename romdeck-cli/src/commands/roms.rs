use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use super::{format_bytes, platform_roms, progress_bar};
use crate::error::CliError;
use crate::session::Session;

/// List a platform's games; with `download`, fetch the ones missing from
/// the card.
pub(crate) async fn run_roms(session: &Session, slug: &str, download: bool) -> Result<(), CliError> {
    let platform = session.platform(slug)?;
    let roms = platform_roms(session, platform).await?;
    let rom_dir = session.config.rom_dir_for(&platform.slug);

    log::info!(
        "{} ({} games)",
        platform.name.if_supports_color(Stdout, |t| t.bold()),
        roms.len(),
    );
    for rom in &roms {
        let on_card = rom_dir
            .as_ref()
            .is_some_and(|d| d.join(&rom.fs_name).exists());
        let mark = if on_card {
            "\u{2714}".if_supports_color(Stdout, |t| t.green()).to_string()
        } else {
            " ".to_string()
        };
        log::info!(
            "  {} {:>6}  {}",
            mark,
            rom.id.if_supports_color(Stdout, |t| t.dimmed()),
            rom.name
        );
    }

    if !download {
        return Ok(());
    }
    let Some(rom_dir) = rom_dir else {
        log::warn!("No ROM folder for {}; add a directory mapping", platform.slug);
        return Ok(());
    };

    let missing: Vec<_> = roms
        .iter()
        .filter(|r| !r.fs_name.is_empty() && !rom_dir.join(&r.fs_name).exists())
        .collect();
    if missing.is_empty() {
        log::info!("All games are already on the card.");
        return Ok(());
    }

    let pb = progress_bar(missing.len() as u64);
    let mut total = 0u64;
    let mut failed = 0usize;
    for rom in missing {
        pb.set_message(rom.name.clone());
        match session.client.download_rom(rom, &rom_dir.join(&rom.fs_name)).await {
            Ok(bytes) => total += bytes,
            Err(e) => {
                failed += 1;
                pb.suspend(|| {
                    log::warn!(
                        "{} {}: {}",
                        "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                        rom.name,
                        e
                    )
                });
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    log::info!(
        "{} Downloaded {} into {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        format_bytes(total),
        rom_dir.display(),
    );
    if failed > 0 {
        log::warn!("{failed} download(s) failed");
    }
    Ok(())
}
