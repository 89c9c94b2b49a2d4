//! Paced critical reporting
//!
//! Every critical message is followed by a fixed gap so a rate-limited
//! log link gets the chance to forward it before the next one arrives.

use core::fmt::{self, Write};

use embedded_hal::delay::DelayNs;
use heapless::String;

use crate::traits::StatusLog;

/// Longest message the gate formats
pub const MAX_MESSAGE_LEN: usize = 64;

/// Formatted message buffer
pub type Message = String<MAX_MESSAGE_LEN>;

/// Render a message into a fixed buffer
///
/// Overlong text goes out truncated rather than not at all.
pub fn render(value: impl fmt::Display) -> Message {
    let mut message = Message::new();
    let _ = write!(Truncating(&mut message), "{}", value);
    message
}

struct Truncating<'a>(&'a mut Message);

impl Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Critical message writer that honours the inter-message gap
pub struct Reporter<'a, L: ?Sized, D: ?Sized> {
    log: &'a mut L,
    delay: &'a mut D,
    gap_ms: u32,
    sent: u16,
}

impl<'a, L, D> Reporter<'a, L, D>
where
    L: StatusLog + ?Sized,
    D: DelayNs + ?Sized,
{
    pub fn new(log: &'a mut L, delay: &'a mut D, gap_ms: u32) -> Self {
        Self {
            log,
            delay,
            gap_ms,
            sent: 0,
        }
    }

    /// Send a critical message, then block for the gap
    pub fn critical(&mut self, message: impl fmt::Display) {
        let text = render(message);
        self.log.critical(&text);
        self.delay.delay_ms(self.gap_ms);
        self.sent = self.sent.saturating_add(1);
    }

    /// Write a console line (not paced)
    pub fn console(&mut self, message: impl fmt::Display) {
        let text = render(message);
        self.log.console(&text);
    }

    /// Number of critical messages sent so far
    pub fn sent(&self) -> u16 {
        self.sent
    }
}
