//! # xc-profile
//!
//! Optional latency instrumentation for the clone path.
//!
//! Every instrumented phase opens a [`ProfileScope`]; when the scope drops the
//! elapsed time is emitted as a `CLONING_TRACE` line together with the current
//! nesting depth. The orchestrator holds a `dyn Profiler`, so an uninstrumented
//! build simply injects [`NoopProfiler`] and runs the exact same code path.

#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod scope;
pub mod sink;
pub mod time;

#[cfg(feature = "std")]
pub mod durable;

pub use scope::{scope, NoopProfiler, ProfileScope, Profiler, Tick, TraceProfiler};
pub use sink::{
    stamp, CompactRecord, LogSink, Timestamp, TraceRecord, TraceSink, TraceStyle, PROFILE_PREFIX,
};
pub use time::{Clock, ManualClock, Profile};

/// Default durable log location, shared with the toolstack-side measurements
pub const PROFILE_FILE: &str = "/root/xl.profile.out";

#[cfg(feature = "std")]
pub use durable::DurableLog;
#[cfg(feature = "std")]
pub use time::{MonotonicClock, WallClock};
