//! Button event state machine.
//!
//! Converts the per-tick "is the button held" sample into edge events
//! (press/release), duration-gated events (long-press, short-release,
//! long-release) and a repeating event (repeat-press), dispatched through six
//! keyed [`EventRegistry`] slots.
//!
//! # Event order
//!
//! ```text
//! press ──► long-press ──► repeat-press* ──► release ──► short- | long-release
//!   │            (once per hold)                              (exactly one)
//!   └─ fires on the rising edge
//! ```
//!
//! Exactly one dispatch branch runs per tick: a button cannot long-press and
//! release on the same sample. Long-press fires exactly once per continuous
//! hold, the first tick `time_held_ms` reaches the threshold; it also arms
//! repeat-press, which then fires every `repeat_cooldown_ms` while the hold
//! continues.
//!
//! Listeners must not block; a panicking listener aborts the tick and
//! propagates, since swallowing it would leave later listeners un-fired with
//! an inconsistent edge state.

use std::sync::Arc;

use crate::event::EventRegistry;
use crate::time::Clock;

/// Default hold duration before long-press fires, in milliseconds.
pub const DEFAULT_LONG_PRESS_THRESHOLD_MS: u32 = 500;
/// Default spacing between repeat-press firings, in milliseconds.
pub const DEFAULT_REPEAT_COOLDOWN_MS: u32 = 50;

/// The six dispatchable button events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Press,
    LongPress,
    Release,
    ShortRelease,
    LongRelease,
    RepeatPress,
}

/// State machine for one physical button.
///
/// The edge flags and timers are valid for the tick in which
/// [`Button::update`] last ran; edges are recomputed from the previous
/// `is_pressed` every call, never stored as history.
pub struct Button {
    /// The button went down this tick.
    pub rising_edge: bool,
    /// The button came up this tick.
    pub falling_edge: bool,
    /// The button is currently held.
    pub is_pressed: bool,
    /// How long the current hold has lasted.
    pub time_held_ms: u32,
    /// How long the current release has lasted.
    pub time_released_ms: u32,
    /// Hold duration gating long-press / long-release vs short-release.
    pub long_press_threshold_ms: u32,
    /// Spacing between repeat-press firings once long-press has armed them.
    pub repeat_cooldown_ms: u32,

    last_update_time: u32,
    long_press_fired: bool,
    last_repeat_time: u32,
    repeat_iterations: u32,
    clock: Arc<dyn Clock>,

    on_press_event: EventRegistry,
    on_long_press_event: EventRegistry,
    on_release_event: EventRegistry,
    on_short_release_event: EventRegistry,
    on_long_release_event: EventRegistry,
    on_repeat_press_event: EventRegistry,
}

impl Button {
    pub(crate) fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            rising_edge: false,
            falling_edge: false,
            is_pressed: false,
            time_held_ms: 0,
            time_released_ms: 0,
            long_press_threshold_ms: DEFAULT_LONG_PRESS_THRESHOLD_MS,
            repeat_cooldown_ms: DEFAULT_REPEAT_COOLDOWN_MS,
            last_update_time: clock.now_ms(),
            long_press_fired: false,
            last_repeat_time: 0,
            repeat_iterations: 0,
            clock,
            on_press_event: EventRegistry::new(),
            on_long_press_event: EventRegistry::new(),
            on_release_event: EventRegistry::new(),
            on_short_release_event: EventRegistry::new(),
            on_long_release_event: EventRegistry::new(),
            on_repeat_press_event: EventRegistry::new(),
        }
    }

    /// Registers a listener for the rising edge. Returns `false` if a
    /// listener with this name already exists on the slot.
    pub fn on_press(&self, name: impl Into<String>, func: impl FnMut() + Send + 'static) -> bool {
        self.on_press_event.add(name, func)
    }

    /// Registers a listener that fires once the button has been held for
    /// `long_press_threshold_ms`.
    pub fn on_long_press(&self, name: impl Into<String>, func: impl FnMut() + Send + 'static) -> bool {
        self.on_long_press_event.add(name, func)
    }

    /// Registers a listener for the falling edge.
    pub fn on_release(&self, name: impl Into<String>, func: impl FnMut() + Send + 'static) -> bool {
        self.on_release_event.add(name, func)
    }

    /// Registers a listener for releases that happen before the long-press
    /// threshold.
    pub fn on_short_release(&self, name: impl Into<String>, func: impl FnMut() + Send + 'static) -> bool {
        self.on_short_release_event.add(name, func)
    }

    /// Registers a listener for releases that happen at or after the
    /// long-press threshold.
    pub fn on_long_release(&self, name: impl Into<String>, func: impl FnMut() + Send + 'static) -> bool {
        self.on_long_release_event.add(name, func)
    }

    /// Registers a listener that fires every `repeat_cooldown_ms` while the
    /// button stays held past the long-press threshold.
    pub fn on_repeat_press(&self, name: impl Into<String>, func: impl FnMut() + Send + 'static) -> bool {
        self.on_repeat_press_event.add(name, func)
    }

    /// Registers a listener for the given event kind.
    pub fn add_listener(
        &self,
        event: EventKind,
        name: impl Into<String>,
        func: impl FnMut() + Send + 'static,
    ) -> bool {
        match event {
            EventKind::Press => self.on_press(name, func),
            EventKind::LongPress => self.on_long_press(name, func),
            EventKind::Release => self.on_release(name, func),
            EventKind::ShortRelease => self.on_short_release(name, func),
            EventKind::LongRelease => self.on_long_release(name, func),
            EventKind::RepeatPress => self.on_repeat_press(name, func),
        }
    }

    /// Removes `name` from every event slot it was registered under. A
    /// listener name is unique per button, not per slot, so this purges all
    /// six registries. Returns whether any removal occurred.
    pub fn remove_listener(&self, name: &str) -> bool {
        self.on_press_event.remove(name)
            | self.on_long_press_event.remove(name)
            | self.on_release_event.remove(name)
            | self.on_short_release_event.remove(name)
            | self.on_long_release_event.remove(name)
            | self.on_repeat_press_event.remove(name)
    }

    /// Advances the state machine with this tick's hardware sample and fires
    /// whichever single event branch applies. Called exactly once per tick by
    /// the owning frame.
    pub(crate) fn update(&mut self, is_held: bool) {
        let now = self.clock.now_ms();
        let delta = now.wrapping_sub(self.last_update_time);

        self.rising_edge = !self.is_pressed && is_held;
        self.falling_edge = self.is_pressed && !is_held;
        self.is_pressed = is_held;
        if is_held {
            self.time_held_ms = self.time_held_ms.saturating_add(delta);
        } else {
            self.time_released_ms = self.time_released_ms.saturating_add(delta);
        }

        let past_threshold = self.is_pressed && self.time_held_ms >= self.long_press_threshold_ms;
        if self.rising_edge {
            self.long_press_fired = false;
            self.on_press_event.fire();
        } else if past_threshold && !self.long_press_fired {
            self.long_press_fired = true;
            // Arm repeats so the first one fires on the next gated tick.
            self.last_repeat_time = now.wrapping_sub(self.repeat_cooldown_ms);
            self.repeat_iterations = 0;
            self.on_long_press_event.fire();
        } else if past_threshold && now.wrapping_sub(self.last_repeat_time) >= self.repeat_cooldown_ms {
            self.repeat_iterations += 1;
            self.last_repeat_time = now;
            self.on_repeat_press_event.fire();
        } else if self.falling_edge {
            self.on_release_event.fire();
            if self.time_held_ms < self.long_press_threshold_ms {
                self.on_short_release_event.fire();
            } else {
                self.on_long_release_event.fire();
            }
        }

        if self.rising_edge {
            self.time_held_ms = 0;
        }
        if self.falling_edge {
            self.time_released_ms = 0;
        }
        self.last_update_time = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;
    use proptest::prelude::*;
    use std::sync::Mutex;

    struct Harness {
        clock: Arc<ManualClock>,
        button: Button,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Harness {
        fn new() -> Self {
            let clock = Arc::new(ManualClock::new());
            let button = Button::new(clock.clone() as Arc<dyn Clock>);
            let log = Arc::new(Mutex::new(Vec::new()));
            let harness = Self { clock, button, log };

            for (kind, tag) in [
                (EventKind::Press, "press"),
                (EventKind::LongPress, "long-press"),
                (EventKind::Release, "release"),
                (EventKind::ShortRelease, "short-release"),
                (EventKind::LongRelease, "long-release"),
                (EventKind::RepeatPress, "repeat"),
            ] {
                let log = Arc::clone(&harness.log);
                assert!(harness.button.add_listener(kind, format!("log_{}", tag), move || {
                    log.lock().unwrap().push(tag)
                }));
            }
            harness
        }

        fn tick(&mut self, delta_ms: u32, is_held: bool) {
            self.clock.advance(delta_ms);
            self.button.update(is_held);
        }

        fn take_log(&self) -> Vec<&'static str> {
            std::mem::take(&mut *self.log.lock().unwrap())
        }
    }

    #[test]
    fn press_fires_on_rising_edge_only() {
        let mut h = Harness::new();
        h.tick(10, false);
        assert!(h.take_log().is_empty());

        h.tick(10, true);
        assert!(h.button.rising_edge);
        assert_eq!(h.button.time_held_ms, 0);
        assert_eq!(h.take_log(), vec!["press"]);

        h.tick(10, true);
        assert!(!h.button.rising_edge);
        assert_eq!(h.button.time_held_ms, 10);
        assert!(h.take_log().is_empty());
    }

    #[test]
    fn short_release_fires_before_threshold() {
        let mut h = Harness::new();
        h.tick(10, true);
        h.tick(100, true);
        h.tick(10, false);
        assert_eq!(h.take_log(), vec!["press", "release", "short-release"]);
        assert_eq!(h.button.time_released_ms, 0);
    }

    #[test]
    fn long_press_fires_once_per_hold_then_long_release() {
        let mut h = Harness::new();
        h.tick(10, true);
        for _ in 0..5 {
            h.tick(100, true);
        }
        // Held 500ms: long press fired exactly once despite further ticks.
        assert_eq!(h.take_log(), vec!["press", "long-press"]);

        h.tick(10, false);
        assert_eq!(h.take_log(), vec!["release", "long-release"]);

        // A fresh hold re-arms long press.
        h.tick(10, true);
        for _ in 0..5 {
            h.tick(100, true);
        }
        assert_eq!(h.take_log(), vec!["press", "long-press"]);
    }

    #[test]
    fn repeat_fires_at_cooldown_intervals_while_held() {
        let mut h = Harness::new();
        h.button.repeat_cooldown_ms = 50;
        h.tick(10, true);
        for _ in 0..30 {
            h.tick(25, true);
        }
        // 30 ticks of 25ms = 750ms held: long press at 500ms, then repeats
        // gated to one per 50ms (every other 25ms tick).
        let log = h.take_log();
        assert_eq!(log[0], "press");
        assert_eq!(log[1], "long-press");
        assert!(log[2..].iter().all(|e| *e == "repeat"));
        assert_eq!(h.button.repeat_iterations as usize, log[2..].len());
        assert_eq!(log[2..].len(), 5);
    }

    #[test]
    fn repeat_rearms_on_next_hold() {
        let mut h = Harness::new();
        h.tick(10, true);
        for _ in 0..12 {
            h.tick(50, true);
        }
        h.tick(10, false);
        h.take_log();

        h.tick(10, true);
        h.tick(500, true);
        assert_eq!(h.take_log(), vec!["press", "long-press"]);
        assert_eq!(h.button.repeat_iterations, 0);
    }

    #[test]
    fn duplicate_listener_name_is_rejected_per_slot() {
        let h = Harness::new();
        assert!(h.button.on_press("dup", || {}));
        assert!(!h.button.on_press("dup", || {}));
        // Same name on a different slot is a different key space.
        assert!(h.button.on_release("dup", || {}));
    }

    #[test]
    fn remove_listener_purges_every_slot() {
        let h = Harness::new();
        assert!(h.button.on_press("bound", || {}));
        assert!(h.button.on_long_release("bound", || {}));

        assert!(h.button.remove_listener("bound"));
        assert!(!h.button.remove_listener("bound"));

        // Re-adding the same name afterwards succeeds.
        assert!(h.button.on_press("bound", || {}));
        assert!(h.button.on_long_release("bound", || {}));
    }

    proptest! {
        #[test]
        fn edges_are_exclusive_and_reset_timers(samples in proptest::collection::vec(any::<bool>(), 1..64)) {
            let clock = Arc::new(ManualClock::new());
            let mut button = Button::new(clock.clone() as Arc<dyn Clock>);
            let mut prev = false;
            for held in samples {
                clock.advance(10);
                button.update(held);

                prop_assert_eq!(button.rising_edge, !prev && held);
                prop_assert_eq!(button.falling_edge, prev && !held);
                prop_assert!(!(button.rising_edge && button.falling_edge));
                if button.rising_edge {
                    prop_assert_eq!(button.time_held_ms, 0);
                }
                if button.falling_edge {
                    prop_assert_eq!(button.time_released_ms, 0);
                }
                prev = held;
            }
        }

        #[test]
        fn held_timer_only_grows_while_held(lengths in proptest::collection::vec(1u32..20, 1..16)) {
            let clock = Arc::new(ManualClock::new());
            let mut button = Button::new(clock.clone() as Arc<dyn Clock>);
            let mut held = false;
            for run in lengths {
                held = !held;
                let mut last = 0;
                for i in 0..run {
                    clock.advance(10);
                    button.update(held);
                    if held {
                        if i > 0 {
                            prop_assert!(button.time_held_ms > last);
                        }
                        last = button.time_held_ms;
                    }
                }
            }
        }
    }
}
