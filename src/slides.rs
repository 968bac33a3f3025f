use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SlideSetError {
    #[error("duplicate slide id: {0}")]
    DuplicateId(String),
}

/// One image/caption pair in the rotating sequence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Slide {
    pub id: String,
    #[serde(rename = "src")]
    pub source_ref: String,
    #[serde(rename = "alt", default)]
    pub alt_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl Slide {
    pub fn new(
        id: impl Into<String>,
        source_ref: impl Into<String>,
        alt_text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_ref: source_ref.into(),
            alt_text: alt_text.into(),
            caption: None,
            href: None,
        }
    }
}

/// Ordered, immutable slide sequence. Order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlideSet {
    slides: Vec<Slide>,
}

impl SlideSet {
    pub fn new(slides: Vec<Slide>) -> Result<Self, SlideSetError> {
        let mut seen = HashSet::new();
        for s in &slides {
            if !seen.insert(s.id.as_str()) {
                return Err(SlideSetError::DuplicateId(s.id.clone()));
            }
        }
        Ok(Self { slides })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slide> {
        self.slides.iter()
    }
}
