//! Desktop backend over gilrs.
//!
//! Maps the controller's button/axis layout onto a commodity USB/Bluetooth
//! gamepad so the whole stack can be exercised without a robot attached.
//! Desktop pads have no character display, so screen traffic is logged
//! instead of drawn; rumble patterns are logged as well.

use gilrs::{Axis, Button, GamepadId, Gilrs};
use tracing::{debug, info, warn};

use super::{AxisId, ButtonId, ControllerHardware, HalError};

pub struct GilrsController {
    gilrs: Gilrs,
    active_gamepad: Option<GamepadId>,
}

impl GilrsController {
    /// Opens the gilrs context and selects the first connected gamepad, if
    /// any. Starting without a gamepad is fine; one can attach later.
    pub fn new() -> Result<Self, HalError> {
        info!("Initializing gilrs controller interface");
        let gilrs = Gilrs::new()
            .map_err(|e| HalError::InitializationError(format!("gilrs init failed: {}", e)))?;

        let active_gamepad = gilrs.gamepads().next().map(|(id, gamepad)| {
            info!("Selected gamepad: {} ({})", gamepad.name(), id);
            id
        });
        if active_gamepad.is_none() {
            warn!("No gamepad connected, waiting for one to attach");
        }

        Ok(Self { gilrs, active_gamepad })
    }

    fn pick_gamepad(&mut self) {
        if let Some(id) = self.active_gamepad {
            if self.gilrs.gamepad(id).is_connected() {
                return;
            }
            warn!("Gamepad {} disconnected", id);
            self.active_gamepad = None;
        }
        self.active_gamepad = self.gilrs.gamepads().find(|(_, g)| g.is_connected()).map(|(id, gamepad)| {
            info!("Selected gamepad: {} ({})", gamepad.name(), id);
            id
        });
    }
}

fn map_button(button: ButtonId) -> Button {
    match button {
        ButtonId::L1 => Button::LeftTrigger,
        ButtonId::L2 => Button::LeftTrigger2,
        ButtonId::R1 => Button::RightTrigger,
        ButtonId::R2 => Button::RightTrigger2,
        ButtonId::Up => Button::DPadUp,
        ButtonId::Down => Button::DPadDown,
        ButtonId::Left => Button::DPadLeft,
        ButtonId::Right => Button::DPadRight,
        ButtonId::X => Button::North,
        ButtonId::B => Button::East,
        ButtonId::Y => Button::West,
        ButtonId::A => Button::South,
    }
}

fn map_axis(axis: AxisId) -> Axis {
    match axis {
        AxisId::LeftX => Axis::LeftStickX,
        AxisId::LeftY => Axis::LeftStickY,
        AxisId::RightX => Axis::RightStickX,
        AxisId::RightY => Axis::RightStickY,
    }
}

impl ControllerHardware for GilrsController {
    fn refresh(&mut self) {
        // Drain the event queue so cached gamepad state is current for this
        // tick's samples.
        while let Some(event) = self.gilrs.next_event() {
            debug!("gilrs event: {:?}", event.event);
        }
        self.pick_gamepad();
    }

    fn sample_digital(&mut self, button: ButtonId) -> bool {
        match self.active_gamepad {
            Some(id) => self.gilrs.gamepad(id).is_pressed(map_button(button)),
            None => false,
        }
    }

    fn sample_analog(&mut self, axis: AxisId) -> i8 {
        match self.active_gamepad {
            Some(id) => {
                let value = self.gilrs.gamepad(id).value(map_axis(axis));
                (value.clamp(-1.0, 1.0) * 127.0) as i8
            }
            None => 0,
        }
    }

    fn is_connected(&mut self) -> bool {
        self.active_gamepad
            .map(|id| self.gilrs.gamepad(id).is_connected())
            .unwrap_or(false)
    }

    fn write_line(&mut self, line: u8, text: &str) {
        debug!("screen[{}]: {}", line, text.trim_end());
    }

    fn rumble(&mut self, pattern: &str) {
        debug!("rumble: {:?}", pattern);
    }

    fn clear_display(&mut self) {
        debug!("screen cleared");
    }
}
