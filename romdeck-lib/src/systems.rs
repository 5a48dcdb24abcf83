//! Device layout tables: where each custom firmware keeps ROMs and saves
//! for a given server platform slug.
//!
//! Slugs are the server's platform slugs. Save folders are listed in
//! preference order; the first one is the default destination for
//! downloaded saves.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Supported custom firmware layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cfw {
    #[default]
    MuOs,
    NextUi,
}

impl Cfw {
    /// Directory holding one folder per system.
    pub fn rom_base(&self, sd_root: &Path) -> PathBuf {
        match self {
            Cfw::MuOs => sd_root.join("ROMS"),
            Cfw::NextUi => sd_root.join("Roms"),
        }
    }

    /// Directory holding one folder per emulator.
    pub fn save_base(&self, sd_root: &Path) -> PathBuf {
        match self {
            Cfw::MuOs => sd_root.join("MUOS").join("save").join("file"),
            Cfw::NextUi => sd_root.join("Saves"),
        }
    }
}

impl std::fmt::Display for Cfw {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cfw::MuOs => write!(f, "muOS"),
            Cfw::NextUi => write!(f, "NextUI"),
        }
    }
}

/// Folder names for one platform slug on each firmware.
#[derive(Debug, Clone, Copy)]
pub struct SystemEntry {
    pub slug: &'static str,
    pub muos_rom_folder: &'static str,
    pub muos_save_folders: &'static [&'static str],
    pub nextui_rom_folder: &'static str,
    pub nextui_save_folders: &'static [&'static str],
}

impl SystemEntry {
    pub fn rom_folder(&self, cfw: Cfw) -> &'static str {
        match cfw {
            Cfw::MuOs => self.muos_rom_folder,
            Cfw::NextUi => self.nextui_rom_folder,
        }
    }

    pub fn save_folders(&self, cfw: Cfw) -> &'static [&'static str] {
        match cfw {
            Cfw::MuOs => self.muos_save_folders,
            Cfw::NextUi => self.nextui_save_folders,
        }
    }
}

const SYSTEMS: &[SystemEntry] = &[
    SystemEntry {
        slug: "gb",
        muos_rom_folder: "Nintendo Game Boy",
        muos_save_folders: &["Gambatte", "SameBoy", "mGBA"],
        nextui_rom_folder: "Game Boy (GB)",
        nextui_save_folders: &["GB"],
    },
    SystemEntry {
        slug: "gbc",
        muos_rom_folder: "Nintendo Game Boy Color",
        muos_save_folders: &["Gambatte", "SameBoy", "mGBA"],
        nextui_rom_folder: "Game Boy Color (GBC)",
        nextui_save_folders: &["GBC"],
    },
    SystemEntry {
        slug: "gba",
        muos_rom_folder: "Nintendo Game Boy Advance",
        muos_save_folders: &["mGBA", "gpSP", "VBA-M"],
        nextui_rom_folder: "Game Boy Advance (GBA)",
        nextui_save_folders: &["GBA", "MGBA"],
    },
    SystemEntry {
        slug: "nes",
        muos_rom_folder: "Nintendo NES-Famicom",
        muos_save_folders: &["FCEUmm", "Nestopia", "QuickNES"],
        nextui_rom_folder: "Nintendo Entertainment System (FC)",
        nextui_save_folders: &["FC"],
    },
    SystemEntry {
        slug: "snes",
        muos_rom_folder: "Nintendo SNES-SFC",
        muos_save_folders: &["Snes9x", "Snes9x 2005", "bsnes"],
        nextui_rom_folder: "Super Nintendo Entertainment System (SFC)",
        nextui_save_folders: &["SFC", "SUPA"],
    },
    SystemEntry {
        slug: "n64",
        muos_rom_folder: "Nintendo N64",
        muos_save_folders: &["Mupen64Plus-Next", "ParaLLEl N64"],
        nextui_rom_folder: "Nintendo 64 (N64)",
        nextui_save_folders: &["N64"],
    },
    SystemEntry {
        slug: "nds",
        muos_rom_folder: "Nintendo DS",
        muos_save_folders: &["DeSmuME", "melonDS"],
        nextui_rom_folder: "Nintendo DS (NDS)",
        nextui_save_folders: &["NDS"],
    },
    SystemEntry {
        slug: "genesis-slash-megadrive",
        muos_rom_folder: "Sega Mega Drive - Genesis",
        muos_save_folders: &["Genesis Plus GX", "PicoDrive"],
        nextui_rom_folder: "Sega Genesis (MD)",
        nextui_save_folders: &["MD"],
    },
    SystemEntry {
        slug: "sms",
        muos_rom_folder: "Sega Master System",
        muos_save_folders: &["Genesis Plus GX", "PicoDrive"],
        nextui_rom_folder: "Sega Master System (SMS)",
        nextui_save_folders: &["SMS"],
    },
    SystemEntry {
        slug: "gamegear",
        muos_rom_folder: "Sega Game Gear",
        muos_save_folders: &["Genesis Plus GX"],
        nextui_rom_folder: "Sega Game Gear (GG)",
        nextui_save_folders: &["GG"],
    },
    SystemEntry {
        slug: "psx",
        muos_rom_folder: "Sony PlayStation",
        muos_save_folders: &["PCSX-ReARMed", "SwanStation"],
        nextui_rom_folder: "Sony PlayStation (PS)",
        nextui_save_folders: &["PS"],
    },
    SystemEntry {
        slug: "psp",
        muos_rom_folder: "Sony PlayStation Portable",
        muos_save_folders: &["PPSSPP"],
        nextui_rom_folder: "Sony PlayStation Portable (PSP)",
        nextui_save_folders: &["PSP"],
    },
    SystemEntry {
        slug: "tg16",
        muos_rom_folder: "NEC PC Engine",
        muos_save_folders: &["Beetle PCE Fast"],
        nextui_rom_folder: "TurboGrafx-16 (PCE)",
        nextui_save_folders: &["PCE"],
    },
    SystemEntry {
        slug: "neo-geo-pocket-color",
        muos_rom_folder: "SNK Neo Geo Pocket - Color",
        muos_save_folders: &["Beetle NeoPop"],
        nextui_rom_folder: "Neo Geo Pocket Color (NGPC)",
        nextui_save_folders: &["NGPC"],
    },
    SystemEntry {
        slug: "arcade",
        muos_rom_folder: "Arcade",
        muos_save_folders: &["FinalBurn Neo", "MAME 2003-Plus"],
        nextui_rom_folder: "Arcade (FBN)",
        nextui_save_folders: &["FBN"],
    },
];

/// Look up the layout entry for a platform slug (case-insensitive).
pub fn lookup(slug: &str) -> Option<&'static SystemEntry> {
    SYSTEMS.iter().find(|s| s.slug.eq_ignore_ascii_case(slug))
}

/// All slugs with a known layout, in table order.
pub fn known_slugs() -> impl Iterator<Item = &'static str> {
    SYSTEMS.iter().map(|s| s.slug)
}

/// Emulator save folders valid for `slug`, preferred first. Empty for
/// unknown slugs.
pub fn emulator_folders_for_slug(cfw: Cfw, slug: &str) -> &'static [&'static str] {
    lookup(slug).map(|s| s.save_folders(cfw)).unwrap_or(&[])
}

/// The firmware's default ROM directory for `slug`.
pub fn default_rom_dir(cfw: Cfw, sd_root: &Path, slug: &str) -> Option<PathBuf> {
    lookup(slug).map(|s| cfw.rom_base(sd_root).join(s.rom_folder(cfw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_unique() {
        let mut slugs: Vec<_> = known_slugs().collect();
        let total = slugs.len();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), total);
    }

    #[test]
    fn every_system_has_save_folders() {
        for s in SYSTEMS {
            assert!(!s.muos_save_folders.is_empty(), "{} (muOS)", s.slug);
            assert!(!s.nextui_save_folders.is_empty(), "{} (NextUI)", s.slug);
        }
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(lookup("GBA").map(|s| s.slug), Some("gba"));
        assert!(lookup("commodore64").is_none());
    }

    #[test]
    fn default_rom_dir_follows_cfw() {
        let root = Path::new("/mnt/mmc");
        assert_eq!(
            default_rom_dir(Cfw::MuOs, root, "gba"),
            Some(PathBuf::from("/mnt/mmc/ROMS/Nintendo Game Boy Advance"))
        );
        assert_eq!(
            default_rom_dir(Cfw::NextUi, root, "gba"),
            Some(PathBuf::from("/mnt/mmc/Roms/Game Boy Advance (GBA)"))
        );
    }

    #[test]
    fn emulator_folders_unknown_slug_is_empty() {
        assert!(emulator_folders_for_slug(Cfw::MuOs, "dos").is_empty());
        assert_eq!(emulator_folders_for_slug(Cfw::NextUi, "gba")[0], "GBA");
    }
}
