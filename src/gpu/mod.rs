//! GPU submission boundary
//!
//! The renderer is tile-deferred: geometry is collected per display list while a
//! scene is open and the hardware only starts rasterizing once the scene is
//! finished. One frame therefore always follows the same protocol:
//!
//! ```text
//! wait_ready ──► scene_begin ──► list_begin(TR) ──► submit* ──► list_finish ──► scene_finish
//! ```
//!
//! [`submit_frame`] is the only place that drives this sequence, so a strategy
//! never opens or closes lists itself; it only pushes primitives through a
//! [`canvas::Canvas`].

pub mod canvas;
pub mod headless;
#[cfg(test)]
pub(crate) mod testing;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use canvas::{Canvas, DepthCounter, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use headless::{HeadlessGpu, HeadlessSettings, SceneSummary};

/// Display lists of the tile accelerator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListKind {
    Opaque,
    OpaqueModifier,
    Translucent,
    TranslucentModifier,
    PunchThrough,
}

impl ListKind {
    pub const ALL: [ListKind; 5] = [
        ListKind::Opaque,
        ListKind::OpaqueModifier,
        ListKind::Translucent,
        ListKind::TranslucentModifier,
        ListKind::PunchThrough,
    ];

    fn index(self) -> usize {
        match self {
            ListKind::Opaque => 0,
            ListKind::OpaqueModifier => 1,
            ListKind::Translucent => 2,
            ListKind::TranslucentModifier => 3,
            ListKind::PunchThrough => 4,
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListKind::Opaque => write!(f, "OP"),
            ListKind::OpaqueModifier => write!(f, "OP_MOD"),
            ListKind::Translucent => write!(f, "TR"),
            ListKind::TranslucentModifier => write!(f, "TR_MOD"),
            ListKind::PunchThrough => write!(f, "PT"),
        }
    }
}

/// Tile bin size reserved for a list; `Disabled` turns the list off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinSize {
    Disabled,
    Size8,
    Size16,
    Size32,
}

impl BinSize {
    pub fn from_entries(entries: u8) -> Option<Self> {
        match entries {
            0 => Some(BinSize::Disabled),
            8 => Some(BinSize::Size8),
            16 => Some(BinSize::Size16),
            32 => Some(BinSize::Size32),
            _ => None,
        }
    }
}

/// Parameters handed to the GPU once at boot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PvrParams {
    /// Bin size per list, indexed like [`ListKind::ALL`]
    pub list_bins: [BinSize; 5],
    /// Vertex buffer size in bytes
    pub vertex_buffer_size: usize,
    pub dma_enabled: bool,
    pub fsaa_enabled: bool,
    /// Per-pixel sorting of translucent polygons
    pub autosort: bool,
}

impl PvrParams {
    /// Only the translucent list is enabled, everything the menu draws goes there
    pub fn translucent_only(bin: BinSize, vertex_buffer_size: usize, autosort: bool) -> Self {
        let mut list_bins = [BinSize::Disabled; 5];
        list_bins[ListKind::Translucent.index()] = bin;
        Self {
            list_bins,
            vertex_buffer_size,
            dma_enabled: false,
            fsaa_enabled: false,
            autosort,
        }
    }

    pub fn bin(&self, list: ListKind) -> BinSize {
        self.list_bins[list.index()]
    }

    pub fn list_enabled(&self, list: ListKind) -> bool {
        self.bin(list) != BinSize::Disabled
    }
}

impl Default for PvrParams {
    fn default() -> Self {
        Self::translucent_only(BinSize::Size32, 256 * 1024, true)
    }
}

/// 32-bit ARGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }
}

/// Screen-space rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// One piece of geometry for the currently open list
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Quad { rect: Rect, z: f32, color: Color },
    Label {
        x: f32,
        y: f32,
        z: f32,
        color: Color,
        text: String,
    },
}

impl Primitive {
    /// Vertices the primitive occupies in the vertex buffer (one strip per glyph)
    pub fn vertex_count(&self) -> usize {
        match self {
            Primitive::Quad { .. } => 4,
            Primitive::Label { text, .. } => {
                text.chars().filter(|c| !c.is_whitespace()).count() * 4
            }
        }
    }

    pub fn z(&self) -> f32 {
        match self {
            Primitive::Quad { z, .. } | Primitive::Label { z, .. } => *z,
        }
    }
}

// Gpu errors
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("GPU used before initialization")]
    NotInitialized,

    #[error("Failed to initialize GPU: {0}")]
    InitializationError(String),

    #[error("Protocol violation: {op} while {state}")]
    Protocol { op: &'static str, state: &'static str },

    #[error("Display list {0} is disabled")]
    ListDisabled(ListKind),

    #[error("GPU worker disconnected: {0}")]
    Disconnected(String),
}

/// Low-level submission interface of the graphics hardware
pub trait Gpu {
    fn init(&mut self, params: &PvrParams) -> Result<(), GpuError>;

    /// Blocks until the hardware accepts a new scene
    fn wait_ready(&mut self) -> Result<(), GpuError>;

    fn scene_begin(&mut self) -> Result<(), GpuError>;

    fn list_begin(&mut self, list: ListKind) -> Result<(), GpuError>;

    fn submit(&mut self, primitive: Primitive);

    fn list_finish(&mut self) -> Result<(), GpuError>;

    /// Closes the scene and hands it to the hardware
    fn scene_finish(&mut self) -> Result<(), GpuError>;
}

/// Submits exactly one scene with exactly one open list
///
/// `draw` runs while `list` is open; the list is closed before the scene is.
pub fn submit_frame<F>(gpu: &mut dyn Gpu, list: ListKind, draw: F) -> Result<(), GpuError>
where
    F: FnOnce(&mut dyn Gpu),
{
    gpu.wait_ready()?;
    gpu.scene_begin()?;
    gpu.list_begin(list)?;

    draw(&mut *gpu);

    gpu.list_finish()?;
    gpu.scene_finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_enable_only_translucent() {
        let params = PvrParams::default();
        for list in ListKind::ALL {
            assert_eq!(params.list_enabled(list), list == ListKind::Translucent, "{}", list);
        }
        assert_eq!(params.bin(ListKind::Translucent), BinSize::Size32);
        assert_eq!(params.vertex_buffer_size, 256 * 1024);
        assert!(params.autosort);
        assert!(!params.dma_enabled);
        assert!(!params.fsaa_enabled);
    }

    #[test]
    fn test_bin_size_from_entries() {
        assert_eq!(BinSize::from_entries(32), Some(BinSize::Size32));
        assert_eq!(BinSize::from_entries(0), Some(BinSize::Disabled));
        assert_eq!(BinSize::from_entries(12), None);
    }

    #[test]
    fn test_color_packing() {
        let c = Color::argb(0x80, 0x11, 0x22, 0x33);
        assert_eq!(c.0, 0x8011_2233);
    }

    #[test]
    fn test_label_vertices_skip_spaces() {
        let label = Primitive::Label {
            x: 0.0,
            y: 0.0,
            z: 1.0,
            color: Color(0),
            text: "A B".to_string(),
        };
        assert_eq!(label.vertex_count(), 8);
    }
}
