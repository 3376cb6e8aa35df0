//! Hardware boundary for the controller peripheral.
//!
//! Everything above this module is backend-agnostic: the input frame samples
//! raw digital/analog state through [`ControllerHardware`] and the compositor
//! pushes screen and rumble writes back through it. The crate ships a single
//! desktop backend over gilrs ([`gilrs_backend::GilrsController`]); robot
//! control boards supply their own implementation.

pub mod gilrs_backend;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Character width of one physical screen line. Text writes are padded to
/// this width so stale characters from the previous frame never survive.
pub const LINE_WIDTH: usize = 40;

/// The 12 digital buttons of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ButtonId {
    L1,
    L2,
    R1,
    R2,
    Up,
    Down,
    Left,
    Right,
    X,
    B,
    Y,
    A,
}

impl ButtonId {
    /// All buttons, in sampling order.
    pub const ALL: [ButtonId; 12] = [
        ButtonId::L1,
        ButtonId::L2,
        ButtonId::R1,
        ButtonId::R2,
        ButtonId::Up,
        ButtonId::Down,
        ButtonId::Left,
        ButtonId::Right,
        ButtonId::X,
        ButtonId::B,
        ButtonId::Y,
        ButtonId::A,
    ];

    /// Stable index into the frame's button arena.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// The 4 analog stick axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisId {
    LeftX,
    LeftY,
    RightX,
    RightY,
}

impl AxisId {
    pub const ALL: [AxisId; 4] = [AxisId::LeftX, AxisId::LeftY, AxisId::RightX, AxisId::RightY];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Backend errors raised while bringing up a hardware connection.
#[derive(Debug, Error)]
pub enum HalError {
    #[error("failed to initialize hardware backend: {0}")]
    InitializationError(String),

    #[error("no gamepad connected: {0}")]
    NoGamepadError(String),
}

/// Raw access to one physical controller.
///
/// Sampling methods report instantaneous state; they are called once per
/// button/axis per tick. Write methods are fire-and-forget: a write that the
/// device drops is simply reissued by the compositor on a later pass once the
/// diff notices the mismatch, so there is nothing useful for a backend to
/// return here.
pub trait ControllerHardware: Send {
    /// Called once at the start of every tick, before any sampling. Backends
    /// that cache device state behind an event queue drain it here.
    fn refresh(&mut self) {}

    /// Whether `button` is currently held down.
    fn sample_digital(&mut self, button: ButtonId) -> bool;

    /// Raw axis deflection in the device's native −127..127 range.
    fn sample_analog(&mut self, axis: AxisId) -> i8;

    /// Whether the physical device is attached. The compositor suspends all
    /// screen traffic while this is `false`.
    fn is_connected(&mut self) -> bool;

    /// Writes one text line (0..=2), already padded to [`LINE_WIDTH`].
    fn write_line(&mut self, line: u8, text: &str);

    /// Plays a rumble pattern over the alphabet `.`/`-`/` `.
    fn rumble(&mut self, pattern: &str);

    /// Blanks the whole screen.
    fn clear_display(&mut self);
}
