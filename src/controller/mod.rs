//! Controller subsystem for gamepad input handling
//!
//! Implements a two-stage pipeline that runs once per frame on the loop thread:
//!
//! 1. [`sampler`] - Raw controller state into an [`InputSnapshot`]
//! 2. [`translator`] - Snapshot into exactly one [`LogicalEvent`]
//!
//! # Architecture
//!
//! ```text
//! Gamepad ──► Sampler ──► Translator ──► LogicalEvent
//!             (Snapshot)  (Precedence)
//! ```
//!
//! Nothing is queued between the stages; an event that is not consumed by the
//! active UI strategy in the same frame is gone.

pub mod sampler;
pub mod snapshot;
pub mod translator;

pub use sampler::{GamepadSampler, NoController, PeripheralSampler, SamplerError};
pub use snapshot::{DPad, InputSnapshot, AXIS_CENTER};
pub use translator::{InputTranslator, LogicalEvent, TranslatorSettings, DEFAULT_DEADZONE};
