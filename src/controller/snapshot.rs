//! Raw per-tick controller state
//!
//! An [`InputSnapshot`] is the unfiltered picture of one controller for exactly one
//! frame. The sampler owns it, resets it at the start of every tick and fills it in
//! again; nothing downstream keeps a copy beyond the translator call.

/// Rest position of an analog axis on the unsigned byte scale
pub const AXIS_CENTER: u8 = 128;

/// Directional pad bitmask, one bit per direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DPad(u8);

impl DPad {
    pub const NONE: DPad = DPad(0);
    pub const UP: DPad = DPad(1 << 0);
    pub const DOWN: DPad = DPad(1 << 1);
    pub const LEFT: DPad = DPad(1 << 2);
    pub const RIGHT: DPad = DPad(1 << 3);

    pub fn contains(self, other: DPad) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: DPad) {
        self.0 |= other.0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for DPad {
    type Output = DPad;

    fn bitor(self, rhs: DPad) -> DPad {
        DPad(self.0 | rhs.0)
    }
}

/// Controller state for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSnapshot {
    pub dpad: DPad,

    // Face buttons
    pub btn_a: bool,
    pub btn_b: bool,
    pub btn_x: bool,
    pub btn_y: bool,
    pub btn_start: bool,

    // Analog stick, 0..=255 with rest at 128
    pub axis_x: u8,
    pub axis_y: u8,

    // Analog triggers, 0..=255
    pub trigger_left: u8,
    pub trigger_right: u8,
}

impl Default for InputSnapshot {
    /// Neutral snapshot: nothing pressed, stick at rest
    fn default() -> Self {
        Self {
            dpad: DPad::NONE,
            btn_a: false,
            btn_b: false,
            btn_x: false,
            btn_y: false,
            btn_start: false,
            axis_x: AXIS_CENTER,
            axis_y: AXIS_CENTER,
            trigger_left: 0,
            trigger_right: 0,
        }
    }
}

impl InputSnapshot {
    /// Puts the snapshot back into its neutral state before a new sample
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Remaps a normalized axis (-1.0..=1.0, rest at 0.0) onto the unsigned byte scale
///
/// Values outside the normalized range are clamped before conversion.
pub fn axis_from_normalized(value: f32) -> u8 {
    if value.is_nan() {
        return AXIS_CENTER;
    }
    let clamped = value.clamp(-1.0, 1.0);
    let scaled = AXIS_CENTER as f32 + clamped * 128.0;
    scaled.round().clamp(0.0, 255.0) as u8
}

/// Converts a normalized trigger (0.0..=1.0) into the unsigned byte range
pub fn trigger_from_normalized(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
