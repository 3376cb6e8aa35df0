//! Display compositor: merges virtual screens onto the physical device.
//!
//! One pass per tick, four phases:
//!
//! ```text
//! connection gate ──► notify ──► rate gate ──► collect ──► write (≤1)
//! ```
//!
//! Screens are held in descending priority order. During collection each
//! screen is offered the slots nobody above it claimed; a claimed slot is
//! never overridden by a lower-priority screen. The write phase diffs claims
//! against what is physically on screen (the rumble slot excepted, it is
//! never cached) and performs at most one hardware write per pass, starting
//! its scan after the last written line so no slot can starve the others.
//!
//! The whole pass runs under one mutex, so the device is never read and
//! written from two contexts at once and the round-robin index cannot be
//! corrupted by interleaved passes.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use tracing::{debug, trace};

use crate::hal::{ButtonId, ControllerHardware, LINE_WIDTH};
use crate::screen::{ScreenBuffer, VirtualScreen, RUMBLE_SLOT, SCREEN_SLOTS};
use crate::time::Clock;

/// Minimum spacing between physical writes. The device drops updates that
/// arrive faster than this.
pub const WRITE_INTERVAL_MS: u32 = 50;

struct CompositorState {
    screens: Vec<Arc<dyn VirtualScreen>>,
    /// What the device currently shows. Authoritative for diffing; only
    /// updated after a successful write.
    current_screen: ScreenBuffer,
    /// Candidate claims for the next write, rebuilt every pass.
    next_buffer: ScreenBuffer,
    last_printed_line: u8,
    last_print_time: u32,
    last_update_time: u32,
    screen_cleared: bool,
}

pub struct DisplayCompositor {
    clock: Arc<dyn Clock>,
    state: Mutex<CompositorState>,
}

impl DisplayCompositor {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let now = clock.now_ms();
        Self {
            clock,
            state: Mutex::new(CompositorState {
                screens: Vec::new(),
                current_screen: Default::default(),
                next_buffer: Default::default(),
                last_printed_line: 0,
                last_print_time: 0,
                last_update_time: now,
                screen_cleared: false,
            }),
        }
    }

    /// Inserts a screen, keeping the list sorted by descending priority.
    /// Among equal priorities, earlier additions stay first.
    pub fn add_screen(&self, screen: Arc<dyn VirtualScreen>) {
        let mut state = self.state.lock().unwrap();
        let pos = state
            .screens
            .iter()
            .position(|existing| existing.priority() < screen.priority())
            .unwrap_or(state.screens.len());
        debug!("adding screen with priority {} at slot {}", screen.priority(), pos);
        state.screens.insert(pos, screen);
    }

    /// Runs one full compositor pass. `pressed` is the set of buttons whose
    /// rising edge fired this tick.
    pub fn pass(&self, hardware: &mut dyn ControllerHardware, pressed: &BTreeSet<ButtonId>) {
        let mut state = self.state.lock().unwrap();
        let state = &mut *state;
        let now = self.clock.now_ms();

        // Connection gate: while disconnected, stage the displayed content
        // for rewrite and drop the cleared baseline, then do nothing.
        if !hardware.is_connected() {
            if state.screen_cleared {
                debug!("controller disconnected, staging screen for rewrite");
                state.next_buffer = std::mem::take(&mut state.current_screen);
                state.screen_cleared = false;
            }
            return;
        }

        // Reconnect (or first pass): nothing on the device can be trusted.
        if !state.screen_cleared {
            state.current_screen = Default::default();
            state.last_update_time = now;
        }

        // Notify phase, highest priority first. Runs even when the rate gate
        // below stops the pass, so screen-internal timers keep moving.
        let delta = now.wrapping_sub(state.last_update_time);
        for screen in &state.screens {
            screen.on_tick(delta);
            screen.on_button_events(pressed);
        }
        state.last_update_time = now;

        // Rate gate.
        if now.wrapping_sub(state.last_print_time) <= WRITE_INTERVAL_MS {
            return;
        }

        // Collect phase: offer each screen the slots still unclaimed.
        for screen in &state.screens {
            let free: BTreeSet<u8> = (0..SCREEN_SLOTS as u8)
                .filter(|&slot| state.next_buffer[slot as usize].is_none())
                .collect();
            let buffer = screen.query_lines(&free);
            for (slot, value) in buffer.into_iter().enumerate() {
                if state.next_buffer[slot].is_some() {
                    continue;
                }
                if let Some(value) = value {
                    if !value.is_empty() {
                        trace!("slot {} claimed by priority {}", slot, screen.priority());
                        state.next_buffer[slot] = Some(value);
                    }
                }
            }
        }

        // Write phase: scan round-robin from the line after the last write,
        // perform at most one hardware call, then stop.
        for offset in 0..SCREEN_SLOTS {
            let line = (state.last_printed_line as usize + 1 + offset) % SCREEN_SLOTS;
            if state.next_buffer[line].is_none() {
                continue;
            }

            // Force a known-blank baseline before trusting any text line.
            if !state.screen_cleared && line != RUMBLE_SLOT {
                hardware.clear_display();
                state.screen_cleared = true;
                state.current_screen = Default::default();
                state.last_print_time = now;
                return;
            }

            // Unchanged text is a no-op; drop the claim and keep scanning.
            if line != RUMBLE_SLOT && state.current_screen[line] == state.next_buffer[line] {
                state.next_buffer[line] = None;
                continue;
            }

            let Some(value) = state.next_buffer[line].take() else {
                continue;
            };
            if line == RUMBLE_SLOT {
                hardware.rumble(&value);
            } else {
                hardware.write_line(line as u8, &format!("{:<width$}", value, width = LINE_WIDTH));
                state.current_screen[line] = Some(value);
            }
            state.last_printed_line = line as u8;
            state.last_print_time = now;
            return;
        }
    }
}
