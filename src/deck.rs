//! Loading the content the overlay shows: host page text, overlay timing and
//! the slide list. A deck that cannot be loaded degrades to "no slides".

use include_dir::{include_dir, Dir};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{ConfigError, OverlayConfig};
use crate::slides::{Slide, SlideSet, SlideSetError};

static DECK_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/decks");

pub const DEFAULT_DECK: &str = "school";

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("no embedded deck named {name:?} (available: {})", .available.join(", "))]
    NotFound { name: String, available: Vec<String> },

    #[error("deck {0:?} is not valid UTF-8")]
    NotUtf8(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse deck: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid slides: {0}")]
    Slides(#[from] SlideSetError),

    #[error("invalid overlay settings: {0}")]
    Config(#[from] ConfigError),
}

/// Text of the page the overlay sits on top of.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
    pub title: String,
    #[serde(default)]
    pub body: Vec<String>,
}

impl Default for PageContent {
    fn default() -> Self {
        Self {
            title: "Welcome".to_string(),
            body: vec![],
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawDeck {
    #[serde(default)]
    page: PageContent,
    #[serde(default)]
    overlay: OverlayConfig,
    #[serde(default)]
    slides: Vec<Slide>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deck {
    pub page: PageContent,
    pub overlay: OverlayConfig,
    pub slides: SlideSet,
}

impl Deck {
    pub fn from_json(data: &str) -> Result<Self, DeckError> {
        let raw: RawDeck = serde_json::from_str(data)?;
        raw.overlay.validate()?;
        Ok(Self {
            page: raw.page,
            overlay: raw.overlay,
            slides: SlideSet::new(raw.slides)?,
        })
    }

    pub fn embedded(name: &str) -> Result<Self, DeckError> {
        let file = DECK_DIR
            .get_file(format!("{name}.json"))
            .ok_or_else(|| DeckError::NotFound {
                name: name.to_string(),
                available: Self::embedded_names(),
            })?;
        let data = file
            .contents_utf8()
            .ok_or_else(|| DeckError::NotUtf8(name.to_string()))?;
        Self::from_json(data)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DeckError> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Names accepted by [`Deck::embedded`], sorted.
    pub fn embedded_names() -> Vec<String> {
        let mut names: Vec<String> = DECK_DIR
            .files()
            .filter_map(|f| {
                let path = f.path();
                if path.extension()? != "json" {
                    return None;
                }
                path.file_stem()?.to_str().map(str::to_string)
            })
            .collect();
        names.sort();
        names
    }
}

/// Where a deck comes from.
pub trait DeckSource {
    fn load(&self) -> Result<Deck, DeckError>;
    fn describe(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct EmbeddedDeck {
    name: String,
}

impl EmbeddedDeck {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for EmbeddedDeck {
    fn default() -> Self {
        Self::new(DEFAULT_DECK)
    }
}

impl DeckSource for EmbeddedDeck {
    fn load(&self) -> Result<Deck, DeckError> {
        Deck::embedded(&self.name)
    }

    fn describe(&self) -> String {
        format!("embedded deck {:?}", self.name)
    }
}

#[derive(Debug, Clone)]
pub struct FileDeck {
    path: PathBuf,
}

impl FileDeck {
    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl DeckSource for FileDeck {
    fn load(&self) -> Result<Deck, DeckError> {
        Deck::from_path(&self.path)
    }

    fn describe(&self) -> String {
        format!("deck file {}", self.path.display())
    }
}

/// Loads the deck, or falls back to an empty one (default page, default
/// overlay settings, no slides) so the overlay simply never shows.
pub fn load_or_empty(source: &dyn DeckSource) -> Deck {
    match source.load() {
        Ok(deck) => deck,
        Err(e) => {
            warn!("could not load {}: {e}; continuing without slides", source.describe());
            Deck::default()
        }
    }
}
