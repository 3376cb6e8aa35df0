//! Input/output layer between application code and a game-controller
//! peripheral on a robot control board.
//!
//! Raw per-tick digital/analog samples become semantically rich button
//! events, and any number of virtual screens share the controller's
//! physically constrained display (3 text lines plus a rumble channel).
//!
//! # Architecture
//!
//! ```text
//! ControllerHardware ──► InputFrame::update()  (once per control tick)
//!                            │
//!              ┌─────────────┼───────────────────┐
//!              ▼             ▼                   ▼
//!         12 Buttons      4 axes          DisplayCompositor
//!              │             │                   │
//!         EventRegistry  Transformation    VirtualScreens
//!         (listeners)    (deadband/expo/   (default, alerts,
//!                         fisheye chain)    user-defined)
//! ```
//!
//! Everything is cooperative and single-poller: the application calls
//! [`frame::InputFrame::update`] once per tick from one logical thread, no
//! component spawns tasks, and no call blocks on I/O. The compositor performs
//! at most one physical screen write per tick.

pub mod button;
pub mod compositor;
pub mod config;
pub mod event;
pub mod frame;
pub mod hal;
pub mod screen;
pub mod time;
pub mod transform;

pub use button::{Button, EventKind};
pub use config::InputSettings;
pub use frame::InputFrame;
pub use hal::{AxisId, ButtonId, ControllerHardware};
pub use screen::{ScreenBuffer, ScreenError, VirtualScreen};
