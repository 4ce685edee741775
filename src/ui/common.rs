//! # UI Common Components and Utilities
//!
//! Shared pieces for the menu strategies: the strategy tag, the context every
//! strategy call receives, the color palette and a few layout helpers.
//!
//! ## Strategy Tag
//! [`UiKind`] names every presentation mode the registry knows about. The order of
//! [`UiKind::ALL`] is the registry order, so index 0 is the default mode.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use crate::catalog::Catalog;
use crate::gpu::Color;

/// Closed set of presentation modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UiKind {
    /// 3x3 tile grid, paged
    Grid3,
    /// Vertical list with a description panel
    ListDesc,
}

impl UiKind {
    pub const ALL: [UiKind; 2] = [UiKind::Grid3, UiKind::ListDesc];
}

impl fmt::Display for UiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiKind::Grid3 => write!(f, "Grid3"),
            UiKind::ListDesc => write!(f, "ListDesc"),
        }
    }
}

/// What a strategy wants the loop to do after handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiRequest {
    Stay,
    CycleNext,
    SwitchTo(UiKind),
}

/// Read-only data passed into every strategy call
#[derive(Debug, Clone, Copy)]
pub struct UiContext<'a> {
    pub catalog: &'a Catalog,
}

impl<'a> UiContext<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }
}

/// Centralized color palette for the menu's dark theme.
pub struct UiColors;

impl UiColors {
    /// Full-screen backdrop
    pub const MAIN_BG: Color = Color::argb(0xff, 30, 30, 30);

    /// Tiles and list rows
    pub const INNER_BG: Color = Color::argb(0xe0, 25, 25, 25);

    /// Description panel
    pub const EXTREME_BG: Color = Color::argb(0xc0, 20, 20, 20);

    pub const BORDER: Color = Color::argb(0xff, 60, 60, 60);

    /// Cursor highlight
    pub const ACTIVE: Color = Color::argb(0xff, 50, 200, 20);

    /// Flash after a selection
    pub const SELECTED: Color = Color::argb(0xff, 200, 50, 20);

    pub const TEXT: Color = Color::argb(0xff, 230, 230, 230);

    pub const TEXT_DIM: Color = Color::argb(0xff, 140, 140, 140);
}

/// Cuts `text` to at most `max_chars` characters, marking the cut with `~`
pub fn truncate_label(text: &str, max_chars: usize) -> Cow<'_, str> {
    if text.chars().count() <= max_chars {
        return Cow::Borrowed(text);
    }
    if max_chars == 0 {
        return Cow::Borrowed("");
    }
    let mut cut: String = text.chars().take(max_chars - 1).collect();
    cut.push('~');
    Cow::Owned(cut)
}

/// Index of the first entry on the page that contains `index`
pub fn page_start(index: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    index - index % page_size
}
