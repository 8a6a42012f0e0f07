//! Scoped timing
//!
//! A [`ProfileScope`] samples the clock when opened and reports to its
//! profiler when dropped, so an early `return` or `?` still closes it.
//! Nesting depth only shapes the trace output.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::sink::{TraceRecord, TraceSink};
use crate::time::{diff_msec, Clock};

/// Opening state of one scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub start_ns: u64,
    pub depth: u32,
}

/// Instrumentation backend injected into the orchestrator
pub trait Profiler: Send + Sync {
    /// Opens a scope. `None` means nothing will be reported on exit.
    fn enter(&self) -> Option<Tick>;

    /// Closes a scope opened by [`Profiler::enter`].
    fn exit(&self, label: &'static str, tick: Tick);
}

/// Uninstrumented builds: no clock read, no output
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProfiler;

impl Profiler for NoopProfiler {
    #[inline(always)]
    fn enter(&self) -> Option<Tick> {
        None
    }

    #[inline(always)]
    fn exit(&self, _label: &'static str, _tick: Tick) {}
}

/// Emits one [`TraceRecord`] per closed scope
pub struct TraceProfiler<C: Clock, S: TraceSink> {
    clock: C,
    sink: S,
    depth: AtomicU32,
}

impl<C: Clock, S: TraceSink> TraceProfiler<C, S> {
    pub fn new(clock: C, sink: S) -> Self {
        Self {
            clock,
            sink,
            depth: AtomicU32::new(0),
        }
    }

    /// Number of scopes currently open
    pub fn depth(&self) -> u32 {
        self.depth.load(Ordering::Relaxed)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<C: Clock, S: TraceSink> Profiler for TraceProfiler<C, S> {
    fn enter(&self) -> Option<Tick> {
        let depth = self.depth.fetch_add(1, Ordering::Relaxed) + 1;
        Some(Tick {
            start_ns: self.clock.now_ns(),
            depth,
        })
    }

    fn exit(&self, label: &'static str, tick: Tick) {
        let end = self.clock.now_ns();
        self.sink.emit(&TraceRecord {
            elapsed_ms: diff_msec(tick.start_ns, end),
            depth: tick.depth,
            label,
        });
        self.depth.fetch_sub(1, Ordering::Relaxed);
    }
}

/// RAII guard returned by [`scope`]
#[must_use = "the scope closes as soon as the guard is dropped"]
pub struct ProfileScope<'a> {
    profiler: &'a dyn Profiler,
    label: &'static str,
    tick: Option<Tick>,
}

impl Drop for ProfileScope<'_> {
    fn drop(&mut self) {
        if let Some(tick) = self.tick.take() {
            self.profiler.exit(self.label, tick);
        }
    }
}

/// Opens a timing scope named `label`
pub fn scope<'a>(profiler: &'a dyn Profiler, label: &'static str) -> ProfileScope<'a> {
    ProfileScope {
        profiler,
        label,
        tick: profiler.enter(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;
    use std::sync::Mutex;
    use std::vec::Vec;

    #[derive(Default)]
    struct Capture(Mutex<Vec<TraceRecord>>);

    impl TraceSink for Capture {
        fn emit(&self, record: &TraceRecord) {
            self.0.lock().unwrap().push(*record);
        }
    }

    #[test]
    fn test_nested_scopes_report_depth() {
        let clock = ManualClock::new();
        let profiler = TraceProfiler::new(&clock, Capture::default());

        {
            let _outer = scope(&profiler, "outer");
            clock.advance(1_000_000);
            {
                let _inner = scope(&profiler, "inner");
                assert_eq!(profiler.depth(), 2);
                clock.advance(2_000_000);
            }
            clock.advance(1_000_000);
        }

        assert_eq!(profiler.depth(), 0);
        let records = profiler.sink().0.lock().unwrap();
        assert_eq!(records.len(), 2);
        // Inner closes first
        assert_eq!(records[0].label, "inner");
        assert_eq!(records[0].depth, 2);
        assert_eq!(records[0].elapsed_ms, 2.0);
        assert_eq!(records[1].label, "outer");
        assert_eq!(records[1].depth, 1);
        assert_eq!(records[1].elapsed_ms, 4.0);
    }

    #[test]
    fn test_scope_closes_on_early_return() {
        fn fallible(p: &dyn Profiler) -> Result<(), ()> {
            let _s = scope(p, "fallible");
            let failed: Result<(), ()> = Err(());
            failed?;
            Ok(())
        }

        let clock = ManualClock::new();
        let profiler = TraceProfiler::new(&clock, Capture::default());
        assert!(fallible(&profiler).is_err());
        assert_eq!(profiler.depth(), 0);
        assert_eq!(profiler.sink().0.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_noop_profiler_reports_nothing() {
        let noop = NoopProfiler;
        let s = scope(&noop, "ignored");
        assert!(s.tick.is_none());
    }
}
