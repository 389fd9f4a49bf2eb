/// Asset provider for the slot game.
///
/// A JSON manifest names 16 text-art visuals and 3 audio cues. Everything
/// is resolved up front; any missing or unreadable entry aborts startup.
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::games::slot::round::SymbolId;

pub const VISUAL_ASSETS: [&str; 16] = [
    "background",
    "button",
    "blank",
    "lose",
    "win",
    "mystery",
    "sym1",
    "sym2",
    "sym3",
    "sym4",
    "sym5",
    "sym6",
    "sym7",
    "sym8",
    "sym9",
    "spritesheet",
];

pub const CUE_WIN: &str = "win_sound";
pub const CUE_LOSE: &str = "lose_sound";
pub const CUE_SELECT: &str = "select";
pub const AUDIO_CUES: [&str; 3] = [CUE_WIN, CUE_LOSE, CUE_SELECT];

const EMBEDDED_MANIFEST: &str = include_str!("../../../assets/manifest.json");

// Shipped art, keyed by the file name used in the manifest.
const EMBEDDED_FILES: &[(&str, &str)] = &[
    ("background.txt", include_str!("../../../assets/background.txt")),
    ("button.txt", include_str!("../../../assets/button.txt")),
    ("blank.txt", include_str!("../../../assets/blank.txt")),
    ("lose.txt", include_str!("../../../assets/lose.txt")),
    ("win.txt", include_str!("../../../assets/win.txt")),
    ("mystery.txt", include_str!("../../../assets/mystery.txt")),
    ("sym1.txt", include_str!("../../../assets/sym1.txt")),
    ("sym2.txt", include_str!("../../../assets/sym2.txt")),
    ("sym3.txt", include_str!("../../../assets/sym3.txt")),
    ("sym4.txt", include_str!("../../../assets/sym4.txt")),
    ("sym5.txt", include_str!("../../../assets/sym5.txt")),
    ("sym6.txt", include_str!("../../../assets/sym6.txt")),
    ("sym7.txt", include_str!("../../../assets/sym7.txt")),
    ("sym8.txt", include_str!("../../../assets/sym8.txt")),
    ("sym9.txt", include_str!("../../../assets/sym9.txt")),
    ("spritesheet.txt", include_str!("../../../assets/spritesheet.txt")),
];

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read manifest {}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed manifest")]
    Parse(#[from] serde_json::Error),
    #[error("asset '{0}' is missing from the manifest")]
    Missing(String),
    #[error("failed to load asset '{name}' from {}", .file.display())]
    Io {
        name: String,
        file: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("asset '{name}' refers to {} which is not bundled", .file.display())]
    NotEmbedded { name: String, file: PathBuf },
    #[error("asset '{0}' is empty")]
    Empty(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisualEntry {
    pub file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioEntry {
    #[serde(default = "default_bells")]
    pub bells: u8,
}

fn default_bells() -> u8 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub visuals: BTreeMap<String, VisualEntry>,
    pub audio: BTreeMap<String, AudioEntry>,
}

impl Manifest {
    pub fn from_json(json: &str) -> Result<Self, AssetError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn embedded() -> Result<Self, AssetError> {
        Self::from_json(EMBEDDED_MANIFEST)
    }

    /// Fails on the first required visual or cue the manifest does not name.
    pub fn check(&self) -> Result<(), AssetError> {
        if let Some(name) = VISUAL_ASSETS.iter().find(|n| !self.visuals.contains_key(**n)) {
            return Err(AssetError::Missing((*name).to_string()));
        }
        if let Some(name) = AUDIO_CUES.iter().find(|n| !self.audio.contains_key(**n)) {
            return Err(AssetError::Missing((*name).to_string()));
        }
        Ok(())
    }
}

/// A block of text art.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sprite {
    lines: Vec<String>,
}

impl Sprite {
    pub fn from_art(art: &str) -> Self {
        let lines = art.trim_end_matches(['\n', '\r']).lines().map(|l| l.trim_end().to_string()).collect();
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn width(&self) -> u16 {
        self.lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16
    }

    pub fn height(&self) -> u16 {
        self.lines.len() as u16
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct Sprites {
    pub background: Sprite,
    pub button: Sprite,
    pub blank: Sprite,
    pub lose: Sprite,
    pub win: Sprite,
    pub mystery: Sprite,
    pub spritesheet: Sprite,
    symbols: Vec<Sprite>,
}

impl Sprites {
    pub fn symbol(&self, id: SymbolId) -> &Sprite {
        &self.symbols[id.index()]
    }
}

/// Everything the game needs from disk, fully resolved.
#[derive(Debug, Clone)]
pub struct AssetBundle {
    pub sprites: Sprites,
    /// Cue name to number of terminal bells.
    pub cues: BTreeMap<String, u8>,
}

impl AssetBundle {
    /// The art shipped inside the binary.
    pub fn builtin() -> Result<Self, AssetError> {
        Self::resolve(Manifest::embedded()?, |name, file| {
            EMBEDDED_FILES
                .iter()
                .find(|(f, _)| Path::new(f) == file)
                .map(|(_, art)| (*art).to_string())
                .ok_or_else(|| AssetError::NotEmbedded {
                    name: name.to_string(),
                    file: file.to_path_buf(),
                })
        })
    }

    /// Load a manifest from disk; asset files are relative to its directory.
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let json = fs::read_to_string(path).map_err(|source| AssetError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = Manifest::from_json(&json)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::resolve(manifest, |name, file| {
            let full = base.join(file);
            fs::read_to_string(&full).map_err(|source| AssetError::Io {
                name: name.to_string(),
                file: full,
                source,
            })
        })
    }

    fn resolve<F>(manifest: Manifest, mut read: F) -> Result<Self, AssetError>
    where
        F: FnMut(&str, &Path) -> Result<String, AssetError>,
    {
        manifest.check()?;

        let mut take = |name: &str| -> Result<Sprite, AssetError> {
            let entry = manifest
                .visuals
                .get(name)
                .ok_or_else(|| AssetError::Missing(name.to_string()))?;
            let sprite = Sprite::from_art(&read(name, &entry.file)?);
            if sprite.is_empty() {
                return Err(AssetError::Empty(name.to_string()));
            }
            debug!(asset = name, file = %entry.file.display(), "resolved visual");
            Ok(sprite)
        };

        let symbols = SymbolId::all()
            .map(|id| take(&format!("sym{id}")))
            .collect::<Result<Vec<_>, _>>()?;

        let sprites = Sprites {
            background: take("background")?,
            button: take("button")?,
            blank: take("blank")?,
            lose: take("lose")?,
            win: take("win")?,
            mystery: take("mystery")?,
            spritesheet: take("spritesheet")?,
            symbols,
        };

        let cues = manifest
            .audio
            .iter()
            .filter(|(name, _)| AUDIO_CUES.contains(&name.as_str()))
            .map(|(name, entry)| (name.clone(), entry.bells))
            .collect();

        Ok(Self { sprites, cues })
    }
}
