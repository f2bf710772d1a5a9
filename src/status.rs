//! Diagnostic status line over the UART.
//!
//! Each report is the decimal brightness followed by a newline, e.g. `"128\n"`.
//! Writes are fire-and-forget: the transmitter is not flushed.

use core::fmt::Write as _;

use embedded_io::Write;
use heapless::String;

use crate::error::StatusError;

/// Longest line: three digits and the newline.
const LINE_CAPACITY: usize = 4;

pub struct StatusReporter<W> {
    tx: W,
}

impl<W: Write> StatusReporter<W> {
    pub fn new(tx: W) -> Self {
        Self { tx }
    }

    /// Emits one status line for `brightness`.
    pub fn report(&mut self, brightness: u8) -> Result<(), StatusError<W::Error>> {
        let mut line: String<LINE_CAPACITY> = String::new();
        writeln!(line, "{brightness}").map_err(|_| StatusError::Format)?;
        self.tx.write_all(line.as_bytes()).map_err(StatusError::Io)
    }

    pub fn release(self) -> W {
        self.tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_decimal_with_newline() {
        let mut buf = [0u8; 16];
        let mut reporter = StatusReporter::new(&mut buf[..]);
        reporter.report(0).unwrap();
        reporter.report(42).unwrap();
        reporter.report(255).unwrap();

        let unused = reporter.release().len();
        assert_eq!(&buf[..buf.len() - unused], b"0\n42\n255\n");
    }
}
