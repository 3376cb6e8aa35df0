//! Lowest-priority screen backing the frame's plain print/rumble calls.

use std::collections::BTreeSet;
use std::sync::Mutex;

use super::{split_text, validate_rumble, ScreenBuffer, ScreenError, VirtualScreen, RUMBLE_SLOT, TEXT_LINES};

/// Simple line/rumble sink. Content sits in an internal buffer until the
/// compositor hands the matching slot over, at which point it is consumed.
pub struct DefaultScreen {
    buffer: Mutex<ScreenBuffer>,
}

impl DefaultScreen {
    pub const PRIORITY: u32 = 1;

    pub fn new() -> Self {
        Self { buffer: Mutex::new(Default::default()) }
    }

    /// Queues `text` for display starting at `line`. Embedded newlines spill
    /// onto the following lines.
    pub fn print_line(&self, line: u8, text: &str) -> Result<(), ScreenError> {
        let lines = split_text(line, text)?;
        let mut buffer = self.buffer.lock().unwrap();
        if !text.contains('\n') {
            buffer[line as usize] = Some(text.to_string());
            return Ok(());
        }
        for (idx, value) in lines.into_iter().enumerate() {
            if value.is_some() {
                buffer[idx] = value;
            }
        }
        Ok(())
    }

    /// Queues a blank for every text line.
    pub fn clear(&self) {
        let mut buffer = self.buffer.lock().unwrap();
        for line in 0..TEXT_LINES as usize {
            buffer[line] = Some(" ".to_string());
        }
    }

    /// Queues a blank for one text line.
    pub fn clear_line(&self, line: u8) -> Result<(), ScreenError> {
        if line >= TEXT_LINES {
            return Err(ScreenError::LineOutOfRange(line));
        }
        self.buffer.lock().unwrap()[line as usize] = Some(" ".to_string());
        Ok(())
    }

    /// Queues a rumble pattern for the rumble slot.
    pub fn rumble(&self, pattern: &str) -> Result<(), ScreenError> {
        validate_rumble(pattern)?;
        self.buffer.lock().unwrap()[RUMBLE_SLOT] = Some(pattern.to_string());
        Ok(())
    }
}

impl Default for DefaultScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualScreen for DefaultScreen {
    fn priority(&self) -> u32 {
        Self::PRIORITY
    }

    fn query_lines(&self, free_lines: &BTreeSet<u8>) -> ScreenBuffer {
        let mut buffer = self.buffer.lock().unwrap();
        let mut output: ScreenBuffer = Default::default();
        for &line in free_lines {
            output[line as usize] = buffer[line as usize].take();
        }
        output
    }
}
