//! The optional log sink: key-value text events,
//! ordered within a parse but with no other semantic contract.
//!
//! A zero-cost trait with an all-`#[inline(always)]`-empty no-op
//! implementation, the same shape as a bytecode VM's instruction tracer,
//! generalized from instruction-level tracing to a handful of
//! driver-level events.

use std::fmt;

/// One of the handful of driver-level events worth tracing (`shift
/// state:…`, `reduce sym:…`, ...). `Display` renders each as a
/// `key:value,…` line.
#[derive(Debug, Clone)]
pub enum LogEvent {
    Shift { state: u16 },
    Reduce { symbol: u16, child_count: u16 },
    Accept,
    RecoverToPrevious { state: u16, depth: u32 },
    SkipToken,
    MissingToken { symbol: u16 },
    DetectError,
    Condense { version_count: usize },
    Done,
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEvent::Shift { state } => write!(f, "shift state:{state}"),
            LogEvent::Reduce { symbol, child_count } => {
                write!(f, "reduce sym:{symbol},count:{child_count}")
            }
            LogEvent::Accept => write!(f, "accept"),
            LogEvent::RecoverToPrevious { state, depth } => {
                write!(f, "recover_to_previous state:{state},depth:{depth}")
            }
            LogEvent::SkipToken => write!(f, "skip_token"),
            LogEvent::MissingToken { symbol } => write!(f, "missing_token sym:{symbol}"),
            LogEvent::DetectError => write!(f, "detect_error"),
            LogEvent::Condense { version_count } => {
                write!(f, "condense version_count:{version_count}")
            }
            LogEvent::Done => write!(f, "done"),
        }
    }
}

/// Receives driver events. Implementations decide formatting, buffering,
/// and filtering; the driver calls this unconditionally and pays whatever
/// cost the implementation chooses to pay.
pub trait Logger {
    fn log(&mut self, event: LogEvent);
}

/// Gets optimized away completely.
pub struct NoopLogger;

impl Logger for NoopLogger {
    #[inline(always)]
    fn log(&mut self, _event: LogEvent) {}
}

/// Writes one `key:value,…` line per event to any `fmt::Write` sink.
pub struct TextLogger<W: fmt::Write> {
    sink: W,
}

impl<W: fmt::Write> TextLogger<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: fmt::Write> Logger for TextLogger<W> {
    fn log(&mut self, event: LogEvent) {
        let _ = writeln!(self.sink, "{event}");
    }
}

#[cfg(test)]
mod logger_tests {
    use super::*;

    #[test]
    fn text_logger_formats_shift() {
        let mut logger = TextLogger::new(String::new());
        logger.log(LogEvent::Shift { state: 7 });
        assert_eq!(logger.into_inner(), "shift state:7\n");
    }

    #[test]
    fn text_logger_formats_reduce() {
        let mut logger = TextLogger::new(String::new());
        logger.log(LogEvent::Reduce { symbol: 3, child_count: 2 });
        assert_eq!(logger.into_inner(), "reduce sym:3,count:2\n");
    }

    #[test]
    fn noop_logger_accepts_everything() {
        let mut logger = NoopLogger;
        logger.log(LogEvent::Done);
    }
}
