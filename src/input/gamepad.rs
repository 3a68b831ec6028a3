use gilrs::{Button, GamepadId, Gilrs};
use jeflog::warn;

use crate::error::{Error, Result};
use super::InputSource;

// Index order follows the XInput joystick numbering for Xbox-style pads:
// face buttons, shoulders, Back/Start, thumbsticks, then Guide.
const BUTTONS: [Button; 17] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
    Button::Mode,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
];

/// Gamepads reachable through gilrs. If gilrs cannot start on this platform
/// the source simply never reports a device.
pub struct Gamepads {
    gilrs: Option<Gilrs>,
}

impl Gamepads {
    pub fn new() -> Gamepads {
        let gilrs = match Gilrs::new() {
            Ok(gilrs) => Some(gilrs),
            Err(e) => {
                warn!("Gamepad support unavailable: {e}");
                None
            }
        };

        Gamepads { gilrs }
    }
}

impl Default for Gamepads {
    fn default() -> Gamepads {
        Gamepads::new()
    }
}

impl InputSource for Gamepads {
    type Handle = GamepadId;

    fn refresh(&mut self) {
        if let Some(ref mut gilrs) = self.gilrs {
            // gilrs only updates cached button state while events are drained
            while gilrs.next_event().is_some() {}
        }
    }

    fn device_count(&self) -> usize {
        self.gilrs
            .as_ref()
            .map_or(0, |gilrs| gilrs.gamepads().count())
    }

    fn open(&mut self, index: usize) -> Option<GamepadId> {
        self.gilrs
            .as_ref()?
            .gamepads()
            .nth(index)
            .map(|(id, _)| id)
    }

    fn name(&self, handle: GamepadId) -> String {
        self.gilrs
            .as_ref()
            .and_then(|gilrs| gilrs.connected_gamepad(handle))
            .map(|gamepad| gamepad.name().to_string())
            .unwrap_or_default()
    }

    fn button_count(&self, _handle: GamepadId) -> usize {
        BUTTONS.len()
    }

    fn button_state(&self, handle: GamepadId, index: usize) -> Result<bool> {
        let gamepad = self.gilrs
            .as_ref()
            .and_then(|gilrs| gilrs.connected_gamepad(handle))
            .ok_or(Error::DeviceRead { index })?;

        let button = BUTTONS.get(index).ok_or(Error::DeviceRead { index })?;

        Ok(gamepad.is_pressed(*button))
    }
}
