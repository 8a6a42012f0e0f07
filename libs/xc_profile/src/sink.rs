//! Trace line format and sinks

use core::fmt;

use crate::time::{Clock, NSECONDS_IN_SEC};

pub const PROFILE_PREFIX: &str = "CLONING_TRACE ";

/// Log target used by [`LogSink`]
pub const TRACE_TARGET: &str = "clone_trace";

/// One closed profiling scope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceRecord {
    pub elapsed_ms: f64,
    pub depth: u32,
    pub label: &'static str,
}

impl fmt::Display for TraceRecord {
    /// `CLONING_TRACE <ms> <depth> <2*depth spaces> <label>`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:11.6} {} {:indent$} {}",
            PROFILE_PREFIX,
            self.elapsed_ms,
            self.depth,
            "",
            self.label,
            indent = 2 * self.depth as usize
        )
    }
}

/// Console-friendly rendering: `CLONING_TRACE <ms>.<us> <depth> <label>`.
///
/// No padding and no indent; the fractional part is the microsecond
/// remainder, zero-padded to three digits.
pub struct CompactRecord<'a>(pub &'a TraceRecord);

impl fmt::Display for CompactRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.0.elapsed_ms;
        let whole = ms as i64;
        let frac = ((ms - whole as f64) * 1000.0) as i64;
        write!(
            f,
            "{}{}.{:03} {} {}",
            PROFILE_PREFIX, whole, frac, self.0.depth, self.0.label
        )
    }
}

impl TraceRecord {
    pub fn compact(&self) -> CompactRecord<'_> {
        CompactRecord(self)
    }
}

/// Wall-clock point rendered as `<sec>.<nsec:09>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub ns: u64,
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:09}",
            self.ns / NSECONDS_IN_SEC,
            self.ns % NSECONDS_IN_SEC
        )
    }
}

/// Logs `<sec>.<nsec> <message>` at the instant `clock` reports.
///
/// Meant for a wall clock (`WallClock` on the host) so lines from several
/// domains can be lined up afterwards.
pub fn stamp(clock: &dyn Clock, args: fmt::Arguments<'_>) {
    let at = Timestamp { ns: clock.now_ns() };
    log::info!(target: TRACE_TARGET, "{} {}", at, args);
}

/// Destination for closed scopes
pub trait TraceSink: Send + Sync {
    fn emit(&self, record: &TraceRecord);
}

/// Line layout used by [`LogSink`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TraceStyle {
    /// Aligned columns with a depth indent, for host stderr
    #[default]
    Padded,
    /// Single-space separated, for the Mini-OS console
    Compact,
}

/// Routes trace lines through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink {
    style: TraceStyle,
}

impl LogSink {
    pub const fn padded() -> Self {
        Self {
            style: TraceStyle::Padded,
        }
    }

    pub const fn compact() -> Self {
        Self {
            style: TraceStyle::Compact,
        }
    }

    pub fn style(&self) -> TraceStyle {
        self.style
    }
}

impl TraceSink for LogSink {
    fn emit(&self, record: &TraceRecord) {
        match self.style {
            TraceStyle::Padded => log::info!(target: TRACE_TARGET, "{}", record),
            TraceStyle::Compact => log::info!(target: TRACE_TARGET, "{}", record.compact()),
        }
    }
}

impl<S: TraceSink + ?Sized> TraceSink for &S {
    fn emit(&self, record: &TraceRecord) {
        (**self).emit(record)
    }
}

/// Fan-out to two sinks, e.g. `(LogSink, DurableLog)`
impl<A: TraceSink, B: TraceSink> TraceSink for (A, B) {
    fn emit(&self, record: &TraceRecord) {
        self.0.emit(record);
        self.1.emit(record);
    }
}
