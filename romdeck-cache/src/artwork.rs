//! Cover art, resized for the device screen.
//!
//! Files live at `artwork/<platform slug>/<rom id>.png` and are always PNG
//! regardless of what the server sent.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use romdeck_client::RomLibrary;
use romdeck_core::{Rom, time};
use romdeck_lib::util;

use crate::error::CacheError;

/// Counts from one [`ArtworkCache::sync_in_background`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArtworkSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub struct ArtworkCache {
    dir: PathBuf,
    max_width: u32,
    max_height: u32,
}

impl ArtworkCache {
    /// `size` is the bounding box images are fitted into.
    pub fn new(dir: impl Into<PathBuf>, size: (u32, u32)) -> Self {
        Self {
            dir: dir.into(),
            max_width: size.0.max(1),
            max_height: size.1.max(1),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, rom: &Rom) -> PathBuf {
        self.dir
            .join(&rom.platform_slug)
            .join(format!("{}.png", rom.id))
    }

    pub fn exists(&self, rom: &Rom) -> bool {
        self.path_for(rom).is_file()
    }

    /// True when there is no local copy, or the server's copy is newer.
    ///
    /// Any doubt about the remote side (HEAD failed, no `Last-Modified`,
    /// network error) keeps the local file.
    pub async fn needs_update(&self, remote: &dyn RomLibrary, rom: &Rom) -> bool {
        let path = self.path_for(rom);
        let local = match fs::metadata(&path).and_then(|m| m.modified()) {
            Ok(t) => time::from_system_time(t),
            Err(_) => return true,
        };
        let Some(cover) = rom.cover_path() else {
            return false;
        };
        match remote.head_artwork(cover).await {
            Ok(head) if head.ok => match head.last_modified {
                Some(remote_time) => time::cmp_seconds(remote_time, local) == Ordering::Greater,
                None => false,
            },
            Ok(_) => false,
            Err(e) => {
                log::debug!("HEAD for {} failed: {e}", rom.name);
                false
            }
        }
    }

    /// Fetch, resize and store the cover for `rom`.
    pub async fn download(&self, remote: &dyn RomLibrary, rom: &Rom) -> Result<PathBuf, CacheError> {
        let cover = rom
            .cover_path()
            .ok_or_else(|| CacheError::cache(format!("{} has no artwork", rom.name)))?;
        let bytes = remote.get_artwork(cover).await?;

        let dest = self.path_for(rom);
        let tmp = util::tmp_path(&dest);
        let (w, h) = (self.max_width, self.max_height);
        let (task_tmp, task_dest) = (tmp.clone(), dest.clone());
        let result = tokio::task::spawn_blocking(move || {
            store_resized(&bytes, &task_tmp, &task_dest, w, h)
        })
        .await
        .map_err(|e| CacheError::cache(format!("artwork task failed: {e}")))
        .and_then(|r| r);

        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        Ok(dest)
    }

    /// Download art for every ROM that has some on the server but none
    /// locally. One at a time; failures are logged and skipped.
    pub async fn sync_in_background(&self, remote: &dyn RomLibrary, roms: &[Rom]) -> ArtworkSummary {
        let mut summary = ArtworkSummary::default();
        for rom in roms {
            if !rom.has_artwork() || self.exists(rom) {
                summary.skipped += 1;
                continue;
            }
            match self.download(remote, rom).await {
                Ok(_) => summary.downloaded += 1,
                Err(e) => {
                    log::debug!("Artwork for {} failed: {e}", rom.name);
                    summary.failed += 1;
                }
            }
        }
        log::debug!(
            "Artwork sync: {} downloaded, {} skipped, {} failed",
            summary.downloaded,
            summary.skipped,
            summary.failed
        );
        summary
    }

    /// ROMs with a local cover that the server has since replaced.
    pub async fn get_outdated(&self, remote: &dyn RomLibrary, roms: &[Rom]) -> Vec<Rom> {
        let mut outdated = Vec::new();
        for rom in roms {
            if self.exists(rom) && self.needs_update(remote, rom).await {
                outdated.push(rom.clone());
            }
        }
        outdated
    }

    /// Remove every cached image. Returns bytes freed.
    pub fn clear(&self) -> Result<u64, CacheError> {
        if !self.dir.exists() {
            return Ok(0);
        }
        let size = util::dir_size(&self.dir);
        fs::remove_dir_all(&self.dir)?;
        Ok(size)
    }
}

/// Write the raw body to `tmp`, decode it whatever its format, fit it into
/// the box, re-encode as PNG over `tmp` and move it to `dest`.
fn store_resized(
    bytes: &[u8],
    tmp: &Path,
    dest: &Path,
    max_w: u32,
    max_h: u32,
) -> Result<(), CacheError> {
    if let Some(parent) = dest.parent() {
        util::create_dir_all(parent)?;
    }
    fs::write(tmp, bytes)?;
    util::set_file_mode(tmp)?;

    let img = ImageReader::open(tmp)?.with_guessed_format()?.decode()?;
    let img = fit_image(img, max_w, max_h);
    img.save_with_format(tmp, ImageFormat::Png)?;
    fs::rename(tmp, dest)?;
    Ok(())
}

fn fit_image(img: DynamicImage, max_w: u32, max_h: u32) -> DynamicImage {
    let (w, h) = fit_to_bounds(img.width(), img.height(), max_w, max_h);
    if (w, h) == (img.width(), img.height()) || w == 0 || h == 0 {
        return img;
    }
    img.resize_exact(w, h, FilterType::Triangle)
}

/// Largest size with the source aspect ratio that fits in the box. Scales
/// up as well as down.
fn fit_to_bounds(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if src_w == 0 || src_h == 0 {
        return (0, 0);
    }

    let scale_w = max_w as f64 / src_w as f64;
    let scale_h = max_h as f64 / src_h as f64;
    let scale = scale_w.min(scale_h);

    let new_w = (src_w as f64 * scale).round() as u32;
    let new_h = (src_h as f64 * scale).round() as u32;

    (new_w.clamp(1, max_w), new_h.clamp(1, max_h))
}

#[cfg(test)]
#[path = "tests/artwork_tests.rs"]
mod tests;
