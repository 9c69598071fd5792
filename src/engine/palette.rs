//! Colour lookup for linked fragments.
//!
//! Fragments carry an unbounded colour index (the condition's ordinal). The
//! palette maps any index onto a finite set of swatches, wrapping around.
//!
//! A palette deserializes from a JSON array of swatches, so it can come from
//! configuration; an empty array falls back to the default swatches.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Background/foreground pair as `#RRGGBB` strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Swatch {
    pub background: Cow<'static, str>,
    pub foreground: Cow<'static, str>,
}

impl Swatch {
    pub fn new(background: impl Into<Cow<'static, str>>, foreground: impl Into<Cow<'static, str>>) -> Self {
        Swatch { background: background.into(), foreground: foreground.into() }
    }

    const fn fixed(background: &'static str, foreground: &'static str) -> Self {
        Swatch { background: Cow::Borrowed(background), foreground: Cow::Borrowed(foreground) }
    }
}

const DEFAULT_SWATCHES: &[Swatch] = &[
    Swatch::fixed("#F0FCFE", "#075A75"),
    Swatch::fixed("#FFFAED", "#804500"),
    Swatch::fixed("#F4F6FF", "#075A75"),
    Swatch::fixed("#FFF6F1", "#A01D00"),
    Swatch::fixed("#FBF2FC", "#2B3A88"),
    Swatch::fixed("#FFF9F7", "#AE1F00"),
    Swatch::fixed("#FFDEEC", "#8D1E47"),
    Swatch::fixed("#FAE6FF", "#642175"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Swatch>", into = "Vec<Swatch>")]
pub struct Palette {
    swatches: Vec<Swatch>,
}

impl Default for Palette {
    fn default() -> Self {
        Palette { swatches: DEFAULT_SWATCHES.to_vec() }
    }
}

impl From<Vec<Swatch>> for Palette {
    fn from(swatches: Vec<Swatch>) -> Self {
        Palette::new(swatches)
    }
}

impl From<Palette> for Vec<Swatch> {
    fn from(palette: Palette) -> Self {
        palette.swatches
    }
}

impl Palette {
    /// An empty list falls back to the default swatches.
    pub fn new(swatches: Vec<Swatch>) -> Self {
        if swatches.is_empty() { Palette::default() } else { Palette { swatches } }
    }

    pub fn len(&self) -> usize {
        self.swatches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }

    /// Slot used for `color_index`.
    pub fn slot(&self, color_index: usize) -> usize {
        color_index % self.swatches.len()
    }

    pub fn swatch(&self, color_index: usize) -> &Swatch {
        &self.swatches[self.slot(color_index)]
    }
}
