//! High-priority queue of timed alerts.
//!
//! Alerts are multi-line frames with a display duration and an optional
//! rumble. They queue FIFO and only go on screen when every slot they need
//! is free at once, so an alert never appears partially. Once shown, an
//! alert owns its slots until its duration runs out, regardless of what else
//! competes for the screen.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Mutex;

use tracing::debug;

use super::{split_text, validate_rumble, ScreenBuffer, ScreenError, VirtualScreen, RUMBLE_SLOT};

struct Alert {
    screen: ScreenBuffer,
    remaining_ms: u32,
}

struct AlertState {
    queue: VecDeque<Alert>,
    active: Option<Alert>,
}

pub struct AlertScreen {
    state: Mutex<AlertState>,
}

impl AlertScreen {
    /// Near-maximum: alerts preempt everything except screens that
    /// deliberately claim a higher priority.
    pub const PRIORITY: u32 = u32::MAX - 100;

    pub fn new() -> Self {
        Self {
            state: Mutex::new(AlertState { queue: VecDeque::new(), active: None }),
        }
    }

    /// Queues an alert starting at `line`, shown for `duration_ms` once all
    /// its lines are free. Embedded newlines spill onto the following lines;
    /// an empty `rumble` means no rumble.
    pub fn add_alert(
        &self,
        line: u8,
        text: &str,
        duration_ms: u32,
        rumble: &str,
    ) -> Result<(), ScreenError> {
        let lines = split_text(line, text)?;
        if !rumble.is_empty() {
            validate_rumble(rumble)?;
        }

        let mut screen: ScreenBuffer = Default::default();
        let [l0, l1, l2] = lines;
        screen[0] = l0;
        screen[1] = l1;
        screen[2] = l2;
        if !rumble.is_empty() {
            screen[RUMBLE_SLOT] = Some(rumble.to_string());
        }

        debug!("queueing alert for {}ms: {:?}", duration_ms, text);
        self.state
            .lock()
            .unwrap()
            .queue
            .push_back(Alert { screen, remaining_ms: duration_ms });
        Ok(())
    }
}

impl Default for AlertScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualScreen for AlertScreen {
    fn priority(&self) -> u32 {
        Self::PRIORITY
    }

    fn on_tick(&self, delta_ms: u32) {
        let mut state = self.state.lock().unwrap();
        if let Some(active) = &mut state.active {
            active.remaining_ms = active.remaining_ms.saturating_sub(delta_ms);
            if active.remaining_ms == 0 {
                debug!("alert expired");
                state.active = None;
            }
        }
    }

    fn query_lines(&self, free_lines: &BTreeSet<u8>) -> ScreenBuffer {
        let mut state = self.state.lock().unwrap();

        if let Some(active) = &state.active {
            // Already on screen: keep occupying the slots, but only rumble
            // once.
            let mut screen = active.screen.clone();
            screen[RUMBLE_SLOT] = None;
            return screen;
        }

        let Some(next) = state.queue.front() else {
            return Default::default();
        };

        // The alert must appear atomically: every slot it wants has to be
        // free in the same pass, otherwise it stays queued untouched.
        let blocked = next
            .screen
            .iter()
            .enumerate()
            .any(|(idx, slot)| slot.is_some() && !free_lines.contains(&(idx as u8)));
        if blocked {
            return Default::default();
        }

        let Some(alert) = state.queue.pop_front() else {
            return Default::default();
        };
        let screen = alert.screen.clone();
        state.active = Some(alert);
        screen
    }
}
