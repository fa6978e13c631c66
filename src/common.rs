// Licensed under the Apache-2.0 license

//! Crate-wide diagnostic logging.
//!
//! Drivers take a `Logger` type parameter so the sink is chosen by the board:
//! `NoOpLogger` compiles away entirely, `WriterLogger` forwards lines to any
//! `embedded_io::Write` implementation such as a UART.

use embedded_io::Write;

/// Line-oriented diagnostic sink.
///
/// Output is a side channel only. No driver decision depends on whether a
/// message was delivered.
pub trait Logger {
    fn debug(&mut self, msg: &str);
    fn error(&mut self, msg: &str);
}

/// Logger that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    fn debug(&mut self, _msg: &str) {}
    fn error(&mut self, _msg: &str) {}
}

/// Logger writing one `\r\n` terminated line per message to an
/// `embedded_io::Write` sink.
pub struct WriterLogger<W: Write> {
    writer: W,
    verbose: bool,
}

impl<W: Write> WriterLogger<W> {
    /// Create a logger that emits errors only.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            verbose: false,
        }
    }

    /// Also emit debug messages.
    #[must_use]
    pub fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    pub fn release(self) -> W {
        self.writer
    }

    fn line(&mut self, level: &str, msg: &str) {
        // Write failures are dropped: logging must not alter driver results.
        let _ = self.writer.write_all(level.as_bytes());
        let _ = self.writer.write_all(msg.as_bytes());
        let _ = self.writer.write_all(b"\r\n");
    }
}

impl<W: Write> Logger for WriterLogger<W> {
    fn debug(&mut self, msg: &str) {
        if self.verbose {
            self.line("[i2c] ", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        self.line("[i2c] error: ", msg);
    }
}
