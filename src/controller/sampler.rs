use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use statum::{machine, state};
use tracing::{debug, error, info, warn};

use super::snapshot::{axis_from_normalized, trigger_from_normalized, DPad, InputSnapshot};

/// Source of one controller snapshot per tick
///
/// Implementations own the snapshot. Every call resets it and fills it from the
/// first controller found; `None` means no controller is attached this tick.
pub trait PeripheralSampler {
    fn sample(&mut self) -> Option<&InputSnapshot>;
}

/// Sampler for hosts without a usable controller interface; never has input
#[derive(Debug, Default)]
pub struct NoController;

impl PeripheralSampler for NoController {
    fn sample(&mut self) -> Option<&InputSnapshot> {
        None
    }
}

// Sampler errors
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    #[error("Failed to initialize sampler: {0}")]
    InitializationError(String),
}

// Define sampler states using statum's state macro
#[state]
#[derive(Debug, Clone)]
pub enum SamplerState {
    Initializing,
    Sampling,
}

#[machine]
#[derive(Debug)]
pub struct GamepadSampler<S: SamplerState> {
    // Gilrs context
    gilrs: Gilrs,

    // Gamepad the last snapshot came from
    active_gamepad: Option<GamepadId>,

    // Reused every tick
    snapshot: InputSnapshot,
}

impl GamepadSampler<Initializing> {
    pub fn create() -> Result<Self, SamplerError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(SamplerError::InitializationError(e.to_string()));
            }
        };

        Ok(Self::new(gilrs, None, InputSnapshot::default()))
    }

    /// Lists the attached gamepads and transitions to Sampling
    ///
    /// Having no gamepad is not an error; every tick re-enumerates.
    pub fn initialize(mut self) -> GamepadSampler<Sampling> {
        let gamepads: Vec<(GamepadId, Gamepad<'_>)> = self.gilrs.gamepads().collect();

        if gamepads.is_empty() {
            warn!("No gamepad connected, sampling neutral input until one appears");
        } else {
            info!("Found {} gamepads:", gamepads.len());
            for (idx, (id, gamepad)) in gamepads.iter().enumerate() {
                info!("  [{}] ID: {}, Name: {}", idx, id, gamepad.name());
            }
            let (id, gamepad) = &gamepads[0];
            info!("Selected gamepad: {} ({})", gamepad.name(), id);
            self.active_gamepad = Some(*id);
        }

        info!("Gamepad sampler initialized, transitioning to Sampling state");
        self.transition()
    }
}

impl GamepadSampler<Sampling> {
    // Drains pending gilrs events so the cached gamepad state is current
    fn pump_events(&mut self) {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match event {
                EventType::Connected => info!("Controller {} connected", id),
                EventType::Disconnected => warn!("Controller {} disconnected", id),
                _ => {}
            }
        }
    }

    // First connected gamepad in enumeration order
    fn first_gamepad(&self) -> Option<GamepadId> {
        self.gilrs
            .gamepads()
            .find(|(_, gamepad)| gamepad.is_connected())
            .map(|(id, _)| id)
    }
}

impl PeripheralSampler for GamepadSampler<Sampling> {
    fn sample(&mut self) -> Option<&InputSnapshot> {
        self.pump_events();
        self.snapshot.reset();

        let id = self.first_gamepad();
        if id != self.active_gamepad {
            match id {
                Some(id) => info!("Sampling gamepad {}", id),
                None => debug!("No gamepad attached, tick carries no input"),
            }
            self.active_gamepad = id;
        }

        let gamepad = self.gilrs.connected_gamepad(id?)?;
        let snapshot = &mut self.snapshot;

        // DPAD
        if gamepad.is_pressed(Button::DPadUp) {
            snapshot.dpad.insert(DPad::UP);
        }
        if gamepad.is_pressed(Button::DPadDown) {
            snapshot.dpad.insert(DPad::DOWN);
        }
        if gamepad.is_pressed(Button::DPadLeft) {
            snapshot.dpad.insert(DPad::LEFT);
        }
        if gamepad.is_pressed(Button::DPadRight) {
            snapshot.dpad.insert(DPad::RIGHT);
        }

        // BUTTONS
        snapshot.btn_a = gamepad.is_pressed(Button::South);
        snapshot.btn_b = gamepad.is_pressed(Button::East);
        snapshot.btn_x = gamepad.is_pressed(Button::West);
        snapshot.btn_y = gamepad.is_pressed(Button::North);
        snapshot.btn_start = gamepad.is_pressed(Button::Start);

        // ANALOG, gilrs reports up as positive Y
        snapshot.axis_x = axis_from_normalized(gamepad.value(Axis::LeftStickX));
        snapshot.axis_y = axis_from_normalized(-gamepad.value(Axis::LeftStickY));

        // TRIGGERS
        let trigger = |button: Button| {
            gamepad
                .button_data(button)
                .map(|data| trigger_from_normalized(data.value()))
                .unwrap_or(0)
        };
        snapshot.trigger_left = trigger(Button::LeftTrigger2);
        snapshot.trigger_right = trigger(Button::RightTrigger2);

        Some(&self.snapshot)
    }
}
