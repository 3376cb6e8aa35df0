//! Per-device input frame.
//!
//! One [`InputFrame`] per physical controller, constructed explicitly by the
//! application and polled once per control-loop tick:
//!
//! ```text
//! hardware ──► 12 Buttons ──► listeners
//!     │            │
//!     │            └─► rising edges ──► DisplayCompositor ──► screen/rumble
//!     └─► 4 axes ──► optional Transformation chains
//! ```
//!
//! There is no global master/partner instance; the application owns its
//! frames and passes references where needed.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tracing::info;

use crate::button::Button;
use crate::compositor::DisplayCompositor;
use crate::config::InputSettings;
use crate::hal::{AxisId, ButtonId, ControllerHardware};
use crate::screen::default_screen::DefaultScreen;
use crate::screen::{ScreenError, VirtualScreen};
use crate::time::{Clock, MonotonicClock};
use crate::transform::Transformation;

pub struct InputFrame {
    hardware: Box<dyn ControllerHardware>,
    buttons: [Button; 12],
    axes: [f32; 4],
    left_transform: Option<Transformation>,
    right_transform: Option<Transformation>,
    compositor: DisplayCompositor,
    default_screen: Arc<DefaultScreen>,
    listener_counter: AtomicU32,
}

impl InputFrame {
    pub fn new(hardware: Box<dyn ControllerHardware>) -> Self {
        Self::with_clock(hardware, Arc::new(MonotonicClock::new()))
    }

    /// Builds a frame over an explicit clock. Tests and simulations drive
    /// this with a [`crate::time::ManualClock`].
    pub fn with_clock(hardware: Box<dyn ControllerHardware>, clock: Arc<dyn Clock>) -> Self {
        let buttons = std::array::from_fn(|_| Button::new(clock.clone()));
        let compositor = DisplayCompositor::new(clock);
        let default_screen = Arc::new(DefaultScreen::new());
        compositor.add_screen(default_screen.clone() as Arc<dyn VirtualScreen>);

        Self {
            hardware,
            buttons,
            axes: [0.0; 4],
            left_transform: None,
            right_transform: None,
            compositor,
            default_screen,
            listener_counter: AtomicU32::new(0),
        }
    }

    /// Builds a frame and applies [`InputSettings`] thresholds to every
    /// button.
    pub fn with_settings(hardware: Box<dyn ControllerHardware>, settings: &InputSettings) -> Self {
        info!(
            "Initializing input frame (long press {}ms, repeat {}ms)",
            settings.long_press_threshold_ms, settings.repeat_cooldown_ms
        );
        let mut frame = Self::new(hardware);
        for button in &mut frame.buttons {
            button.long_press_threshold_ms = settings.long_press_threshold_ms;
            button.repeat_cooldown_ms = settings.repeat_cooldown_ms;
        }
        frame
    }

    /// Polls the hardware and advances every subsystem by one tick: button
    /// state machines (firing listeners), axis sampling, and one compositor
    /// pass. Call once at the top of every control-loop iteration.
    pub fn update(&mut self) {
        self.hardware.refresh();

        for id in ButtonId::ALL {
            let is_held = self.hardware.sample_digital(id);
            self.buttons[id.index()].update(is_held);
        }

        for axis in AxisId::ALL {
            self.axes[axis.index()] = f32::from(self.hardware.sample_analog(axis)) / 127.0;
        }

        let pressed: BTreeSet<ButtonId> = ButtonId::ALL
            .into_iter()
            .filter(|id| self.buttons[id.index()].rising_edge)
            .collect();
        self.compositor.pass(self.hardware.as_mut(), &pressed);
    }

    /// State of one button, valid for the current tick.
    pub fn button(&self, id: ButtonId) -> &Button {
        &self.buttons[id.index()]
    }

    /// Mutable button access, e.g. to tune per-button thresholds.
    pub fn button_mut(&mut self, id: ButtonId) -> &mut Button {
        &mut self.buttons[id.index()]
    }

    /// Axis value in −1.0..1.0 with the stick's transformation chain
    /// applied, if one is set.
    pub fn axis(&self, axis: AxisId) -> f32 {
        let (pair, transform) = match axis {
            AxisId::LeftX | AxisId::LeftY => (
                (self.axes[AxisId::LeftX.index()], self.axes[AxisId::LeftY.index()]),
                &self.left_transform,
            ),
            AxisId::RightX | AxisId::RightY => (
                (self.axes[AxisId::RightX.index()], self.axes[AxisId::RightY.index()]),
                &self.right_transform,
            ),
        };
        let (x, y) = match transform {
            Some(chain) => chain.get_value(pair),
            None => pair,
        };
        match axis {
            AxisId::LeftX | AxisId::RightX => x,
            AxisId::LeftY | AxisId::RightY => y,
        }
    }

    /// Axis value in −1.0..1.0 without any transformation.
    pub fn axis_raw(&self, axis: AxisId) -> f32 {
        self.axes[axis.index()]
    }

    pub fn set_left_transform(&mut self, transformation: Transformation) {
        self.left_transform = Some(transformation);
    }

    pub fn set_right_transform(&mut self, transformation: Transformation) {
        self.right_transform = Some(transformation);
    }

    /// Adds a virtual screen to the compositor's priority order.
    pub fn add_screen(&self, screen: Arc<dyn VirtualScreen>) {
        self.compositor.add_screen(screen);
    }

    /// Prints to the built-in low-priority screen; newlines spill onto the
    /// following lines.
    pub fn print_line(&self, line: u8, text: &str) -> Result<(), ScreenError> {
        self.default_screen.print_line(line, text)
    }

    /// Clears all text lines of the built-in screen.
    pub fn clear(&self) {
        self.default_screen.clear();
    }

    /// Clears one text line of the built-in screen.
    pub fn clear_line(&self, line: u8) -> Result<(), ScreenError> {
        self.default_screen.clear_line(line)
    }

    /// Queues a rumble pattern on the built-in screen.
    pub fn rumble(&self, pattern: &str) -> Result<(), ScreenError> {
        self.default_screen.rumble(pattern)
    }

    /// Hands out a listener name that cannot collide with user-chosen names.
    pub fn unique_listener_name(&self) -> String {
        let id = self.listener_counter.fetch_add(1, Ordering::Relaxed);
        format!("{}_internal", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;
    use std::sync::Mutex;

    /// Scriptable hardware: per-tick button/axis state set by the test.
    #[derive(Default)]
    struct ScriptedController {
        held: BTreeSet<ButtonId>,
        axes: [i8; 4],
        connected: bool,
    }

    impl ControllerHardware for ScriptedController {
        fn sample_digital(&mut self, button: ButtonId) -> bool {
            self.held.contains(&button)
        }

        fn sample_analog(&mut self, axis: AxisId) -> i8 {
            self.axes[axis.index()]
        }

        fn is_connected(&mut self) -> bool {
            self.connected
        }

        fn write_line(&mut self, _line: u8, _text: &str) {}

        fn rumble(&mut self, _pattern: &str) {}

        fn clear_display(&mut self) {}
    }

    fn frame_with_clock() -> (InputFrame, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let frame = InputFrame::with_clock(
            Box::new(ScriptedController::default()),
            clock.clone() as Arc<dyn Clock>,
        );
        (frame, clock)
    }

    // The scripted state lives inside the boxed hardware; reach it through a
    // fresh box each time the script changes.
    fn script(frame: &mut InputFrame, held: &[ButtonId], axes: [i8; 4]) {
        frame.hardware = Box::new(ScriptedController {
            held: held.iter().copied().collect(),
            axes,
            connected: false,
        });
    }

    #[test]
    fn update_drives_button_listeners() {
        let (mut frame, clock) = frame_with_clock();
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = Arc::clone(&log);
        frame.button(ButtonId::A).on_press("test", move || l.lock().unwrap().push("a-press"));

        clock.advance(10);
        frame.update();
        assert!(log.lock().unwrap().is_empty());

        script(&mut frame, &[ButtonId::A], [0; 4]);
        clock.advance(10);
        frame.update();
        assert_eq!(*log.lock().unwrap(), vec!["a-press"]);
        assert!(frame.button(ButtonId::A).is_pressed);
    }

    #[test]
    fn axes_scale_to_unit_range() {
        let (mut frame, clock) = frame_with_clock();
        script(&mut frame, &[], [127, -127, 64, 0]);
        clock.advance(10);
        frame.update();

        assert!((frame.axis_raw(AxisId::LeftX) - 1.0).abs() < 1e-6);
        assert!((frame.axis_raw(AxisId::LeftY) + 1.0).abs() < 1e-6);
        assert!((frame.axis_raw(AxisId::RightX) - 64.0 / 127.0).abs() < 1e-6);
        assert_eq!(frame.axis_raw(AxisId::RightY), 0.0);
    }

    #[test]
    fn transform_applies_to_the_matching_stick_only() {
        use crate::transform::{Deadband, TransformationBuilder};

        let (mut frame, clock) = frame_with_clock();
        frame.set_left_transform(TransformationBuilder::new(Deadband::new(0.5, 0.5)).build());

        script(&mut frame, &[], [13, 0, 13, 0]);
        clock.advance(10);
        frame.update();

        // ~0.1 deflection: inside the left deadband, untouched on the right.
        assert_eq!(frame.axis(AxisId::LeftX), 0.0);
        assert!(frame.axis(AxisId::RightX) > 0.09);
        // Raw accessor bypasses the chain.
        assert!(frame.axis_raw(AxisId::LeftX) > 0.09);
    }

    #[test]
    fn unique_listener_names_do_not_collide() {
        let (frame, _clock) = frame_with_clock();
        let a = frame.unique_listener_name();
        let b = frame.unique_listener_name();
        assert_ne!(a, b);
        assert!(frame.button(ButtonId::X).on_press(a, || {}));
        assert!(frame.button(ButtonId::X).on_press(b, || {}));
    }
}
