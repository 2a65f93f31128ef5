//! candump text streams
//!
//! `CandumpSource` reads frames from a candump log (a file, or a live
//! `candump -L` piped to stdin). `CandumpSink` writes outbound frames in
//! the same format, ready for `canplayer` or `cansend`-style tooling.

use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::warn;
use tripmode_core::time::Instant;
use tripmode_core::traits::{Clock, FrameSink, FrameSource};
use tripmode_protocol::{parse_line, CanFrame, LogLine};

use crate::clock::CaptureClock;

/// Transport errors
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Frame source reading candump log lines
///
/// Blank lines and `#` comments are ignored. Lines that do not parse are
/// logged and skipped.
pub struct CandumpSource<R> {
    reader: R,
    clock: CaptureClock,
    line_no: usize,
    peeked: Option<LogLine>,
    skipped: usize,
}

impl<R: BufRead> CandumpSource<R> {
    /// Wrap `reader` and read ahead to the first frame
    ///
    /// The capture clock starts at the first frame's timestamp, so a session
    /// created right after this sees the log's own start time.
    pub fn open(reader: R) -> Result<Self, StreamError> {
        let mut source = Self {
            reader,
            clock: CaptureClock::new(),
            line_no: 0,
            peeked: None,
            skipped: 0,
        };

        source.peeked = source.next_line()?;
        if let Some(line) = &source.peeked {
            source
                .clock
                .advance_to(Instant::from_micros(line.timestamp_us));
        }
        Ok(source)
    }

    /// Clock following this log's timestamps
    pub fn capture_clock(&self) -> CaptureClock {
        self.clock.clone()
    }

    /// Number of malformed lines skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Next well-formed line, or `None` at end of input
    fn next_line(&mut self) -> Result<Option<LogLine>, StreamError> {
        let mut buf = String::new();
        loop {
            buf.clear();
            if self.reader.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let line = buf.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match parse_line(line) {
                Ok(parsed) => return Ok(Some(parsed)),
                Err(e) => {
                    self.skipped += 1;
                    warn!(line = self.line_no, error = %e, "Skipping malformed frame");
                }
            }
        }
    }
}

impl<R: BufRead> FrameSource for CandumpSource<R> {
    type Error = StreamError;

    fn receive(&mut self) -> Result<Option<CanFrame>, Self::Error> {
        let line = match self.peeked.take() {
            Some(line) => Some(line),
            None => self.next_line()?,
        };

        Ok(line.map(|line| {
            self.clock
                .advance_to(Instant::from_micros(line.timestamp_us));
            line.frame
        }))
    }
}

/// Frame sink writing candump log lines
///
/// Each batch is flushed as a whole so a downstream reader sees complete
/// clusters.
pub struct CandumpSink<W, C> {
    writer: W,
    clock: C,
}

impl<W: Write, C: Clock> CandumpSink<W, C> {
    /// Write to `writer`, stamping frames with `clock`
    pub fn new(writer: W, clock: C) -> Self {
        Self { writer, clock }
    }
}

impl<W: Write, C: Clock> FrameSink for CandumpSink<W, C> {
    type Error = StreamError;

    fn send_batch(&mut self, frames: &[CanFrame]) -> Result<(), Self::Error> {
        let timestamp_us = self.clock.now().as_micros();
        for frame in frames {
            writeln!(self.writer, "{}", LogLine::new(timestamp_us, frame.clone()))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
