//! Virtual screens and the buffer format they exchange with the compositor.
//!
//! The physical device exposes 4 output slots: 3 text lines plus one rumble
//! channel. A [`ScreenBuffer`] carries a candidate value for each slot. Any
//! number of virtual screens can compete for those slots; the compositor
//! arbitrates by priority each pass.
//!
//! Screens are shared objects (`Arc<dyn VirtualScreen>`): application code
//! keeps a handle to push content in while the compositor queries them, so
//! every screen type guards its own state with an internal mutex.

pub mod alert_screen;
pub mod default_screen;

use std::collections::BTreeSet;

use thiserror::Error;

use crate::hal::ButtonId;

/// Number of addressable output slots on the device.
pub const SCREEN_SLOTS: usize = 4;
/// Number of text lines; line indices are `0..TEXT_LINES`.
pub const TEXT_LINES: u8 = 3;
/// The slot carrying the rumble pattern instead of text.
pub const RUMBLE_SLOT: usize = 3;
/// Maximum rumble pattern length the device accepts.
pub const MAX_RUMBLE_LEN: usize = 8;

/// One full frame of desired output: slots 0-2 are text lines, slot 3 the
/// rumble pattern. Constructed fresh for every query and merged
/// non-destructively by the compositor.
pub type ScreenBuffer = [Option<String>; SCREEN_SLOTS];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScreenError {
    #[error("line index {0} is out of range (0-2)")]
    LineOutOfRange(u8),

    #[error("text spans {0} lines, at most 3 fit on the screen")]
    TooManyLines(usize),

    #[error("rumble pattern is {0} characters, the maximum is {MAX_RUMBLE_LEN}")]
    PatternTooLong(usize),

    #[error("rumble pattern contains invalid character {0:?} (allowed: '.', '-', ' ')")]
    InvalidPatternChar(char),
}

/// Capability interface every virtual screen implements.
pub trait VirtualScreen: Send + Sync {
    /// Fixed at construction. Higher priorities claim slots first.
    fn priority(&self) -> u32;

    /// Runs once per compositor pass regardless of slot availability; use
    /// this for internal timers such as alert expiry.
    fn on_tick(&self, _delta_ms: u32) {}

    /// Receives the set of buttons whose rising edge fired this tick.
    fn on_button_events(&self, _pressed: &BTreeSet<ButtonId>) {}

    /// Asked what the screen wants to display, given which slots are still
    /// unclaimed. Slots the screen returns outside `free_lines` are ignored
    /// by the compositor.
    fn query_lines(&self, free_lines: &BTreeSet<u8>) -> ScreenBuffer;
}

/// Splits `text` on embedded newlines across consecutive lines starting at
/// `line`. Empty segments leave their slot untouched so callers can skip
/// lines with `"\n"` runs.
pub(crate) fn split_text(line: u8, text: &str) -> Result<[Option<String>; 3], ScreenError> {
    if line >= TEXT_LINES {
        return Err(ScreenError::LineOutOfRange(line));
    }
    let newlines = text.matches('\n').count();
    if newlines > 2 {
        return Err(ScreenError::TooManyLines(newlines + 1));
    }

    let mut lines: [Option<String>; 3] = Default::default();
    for (offset, segment) in text.split('\n').enumerate() {
        let idx = line as usize + offset;
        if idx >= TEXT_LINES as usize {
            break;
        }
        if !segment.is_empty() {
            lines[idx] = Some(segment.to_string());
        }
    }
    Ok(lines)
}

/// Checks a rumble pattern against the device limits: at most
/// [`MAX_RUMBLE_LEN`] characters over the alphabet `.`/`-`/` `. Violations
/// are errors, never silent truncation.
pub(crate) fn validate_rumble(pattern: &str) -> Result<(), ScreenError> {
    if pattern.len() > MAX_RUMBLE_LEN {
        return Err(ScreenError::PatternTooLong(pattern.len()));
    }
    if let Some(c) = pattern.chars().find(|c| !matches!(c, '.' | '-' | ' ')) {
        return Err(ScreenError::InvalidPatternChar(c));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_rejects_out_of_range_line() {
        assert_eq!(split_text(3, "hi"), Err(ScreenError::LineOutOfRange(3)));
    }

    #[test]
    fn split_rejects_too_many_lines() {
        assert_eq!(split_text(0, "a\nb\nc\nd"), Err(ScreenError::TooManyLines(4)));
    }

    #[test]
    fn split_places_segments_from_start_line() {
        let lines = split_text(1, "mid\nlast").unwrap();
        assert_eq!(lines, [None, Some("mid".into()), Some("last".into())]);
    }

    #[test]
    fn split_skips_empty_segments() {
        let lines = split_text(0, "top\n\nbottom").unwrap();
        assert_eq!(lines, [Some("top".into()), None, Some("bottom".into())]);
    }

    #[test]
    fn rumble_validation() {
        assert!(validate_rumble(". -.-. -").is_ok());
        assert_eq!(validate_rumble(".........."), Err(ScreenError::PatternTooLong(10)));
        assert_eq!(validate_rumble(".-x"), Err(ScreenError::InvalidPatternChar('x')));
    }
}
