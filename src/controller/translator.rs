//! Snapshot to logical event translation
//!
//! Exactly one [`LogicalEvent`] comes out of every tick. When several inputs are
//! active at once, a fixed precedence chain decides:
//!
//! ```text
//! D-Pad (L, R, U, D) ──► Stick X ──► Stick Y ──► A, B, X, Y, Start ──► None
//! ```
//!
//! The digital pad always wins over the stick, and the stick wins over the face
//! buttons so a held direction still navigates while a button is down.

use super::snapshot::{DPad, InputSnapshot, AXIS_CENTER};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Default half-width of the analog dead zone on the 0..=255 scale
pub const DEFAULT_DEADZONE: u8 = 24;

/// Normalized navigation/action signal handed to the active UI strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalEvent {
    None,
    Up,
    Down,
    Left,
    Right,
    ButtonA,
    ButtonB,
    ButtonX,
    ButtonY,
    Start,
}

impl fmt::Display for LogicalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogicalEvent::None => "None",
            LogicalEvent::Up => "Up",
            LogicalEvent::Down => "Down",
            LogicalEvent::Left => "Left",
            LogicalEvent::Right => "Right",
            LogicalEvent::ButtonA => "A",
            LogicalEvent::ButtonB => "B",
            LogicalEvent::ButtonX => "X",
            LogicalEvent::ButtonY => "Y",
            LogicalEvent::Start => "Start",
        };
        f.write_str(name)
    }
}

// Translator settings
#[derive(Clone, Debug)]
pub struct TranslatorSettings {
    pub deadzone: u8,
}

impl Default for TranslatorSettings {
    fn default() -> Self {
        Self {
            deadzone: DEFAULT_DEADZONE,
        }
    }
}

/// Stateless precedence chain from [`InputSnapshot`] to [`LogicalEvent`]
#[derive(Clone, Debug, Default)]
pub struct InputTranslator {
    settings: TranslatorSettings,
}

impl InputTranslator {
    pub fn new(settings: TranslatorSettings) -> Self {
        debug!("Creating input translator with settings: {:?}", settings);
        Self { settings }
    }

    pub fn settings(&self) -> &TranslatorSettings {
        &self.settings
    }

    /// Lower and upper bound of the dead zone band (both inclusive)
    pub fn deadzone_band(&self) -> (u8, u8) {
        (
            AXIS_CENTER.saturating_sub(self.settings.deadzone),
            AXIS_CENTER.saturating_add(self.settings.deadzone),
        )
    }

    /// Translates one snapshot; `None` input means no controller this tick
    pub fn translate(&self, snapshot: Option<&InputSnapshot>) -> LogicalEvent {
        match snapshot {
            Some(snapshot) => self.translate_snapshot(snapshot),
            None => LogicalEvent::None,
        }
    }

    pub fn translate_snapshot(&self, snapshot: &InputSnapshot) -> LogicalEvent {
        // 1. Digital pad
        if snapshot.dpad.contains(DPad::LEFT) {
            return LogicalEvent::Left;
        }
        if snapshot.dpad.contains(DPad::RIGHT) {
            return LogicalEvent::Right;
        }
        if snapshot.dpad.contains(DPad::UP) {
            return LogicalEvent::Up;
        }
        if snapshot.dpad.contains(DPad::DOWN) {
            return LogicalEvent::Down;
        }

        let (low, high) = self.deadzone_band();

        // 2. Stick X
        if snapshot.axis_x < low {
            return LogicalEvent::Left;
        }
        if snapshot.axis_x > high {
            return LogicalEvent::Right;
        }

        // 3. Stick Y, low values point up
        if snapshot.axis_y < low {
            return LogicalEvent::Up;
        }
        if snapshot.axis_y > high {
            return LogicalEvent::Down;
        }

        // 4. Buttons
        if snapshot.btn_a {
            return LogicalEvent::ButtonA;
        }
        if snapshot.btn_b {
            return LogicalEvent::ButtonB;
        }
        if snapshot.btn_x {
            return LogicalEvent::ButtonX;
        }
        if snapshot.btn_y {
            return LogicalEvent::ButtonY;
        }
        if snapshot.btn_start {
            return LogicalEvent::Start;
        }

        LogicalEvent::None
    }
}
