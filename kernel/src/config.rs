//! Clone library configuration
//!
//! Plain values set by the application before the first clone. The
//! profiler choice is made here once, so the orchestrator runs the same
//! code with or without tracing.

use alloc::boxed::Box;
use log::LevelFilter;
use xc_profile::{NoopProfiler, Profiler, PROFILE_FILE};
use xc_types::{CloneError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloneConfig {
    /// Optional application limit on `requested_child_count`. Unset, every
    /// nonzero count goes to the hypervisor, which refuses what it cannot grant.
    pub max_children: Option<u32>,
    /// Most domid entries the scratch buffer may reserve; beyond that the
    /// clone fails with `ResourceExhausted` before any hypercall.
    pub scratch_limit: Option<usize>,
    /// Emit CLONING_TRACE lines around each clone phase
    pub trace: bool,
    /// Also append per-scope latencies to `profile_log_path` (host builds)
    pub durable_log: bool,
    pub profile_log_path: &'static str,
    pub log_level: LevelFilter,
}

impl Default for CloneConfig {
    fn default() -> Self {
        Self {
            max_children: None,
            scratch_limit: None,
            trace: false,
            durable_log: false,
            profile_log_path: PROFILE_FILE,
            log_level: LevelFilter::Info,
        }
    }
}

impl CloneConfig {
    pub fn with_max_children(mut self, max: u32) -> Self {
        self.max_children = Some(max);
        self
    }

    pub fn with_scratch_limit(mut self, entries: usize) -> Self {
        self.scratch_limit = Some(entries);
        self
    }

    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }

    pub fn with_durable_log(mut self, path: &'static str) -> Self {
        self.durable_log = true;
        self.profile_log_path = path;
        self
    }

    pub fn with_log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = level;
        self
    }

    /// Rejects a child limit that no request could satisfy
    pub fn validate(&self) -> Result<()> {
        if self.max_children == Some(0) {
            return Err(CloneError::InvalidArgument {
                requested: 0,
                max: self.max_children,
            });
        }
        Ok(())
    }

    /// Local rejection of `requested`, before any allocation
    pub fn check_request(&self, requested: u32) -> Result<()> {
        let over_limit = self.max_children.is_some_and(|max| requested > max);
        if requested == 0 || over_limit {
            return Err(CloneError::InvalidArgument {
                requested,
                max: self.max_children,
            });
        }
        Ok(())
    }

    /// Instrumentation backend for this configuration
    pub fn profiler(&self) -> Box<dyn Profiler> {
        if !self.trace {
            return Box::new(NoopProfiler);
        }
        self.trace_profiler()
    }

    #[cfg(feature = "std")]
    fn trace_profiler(&self) -> Box<dyn Profiler> {
        use xc_profile::{DurableLog, LogSink, MonotonicClock, TraceProfiler};

        let durable = DurableLog::new(self.profile_log_path);
        durable.set_trigger(self.durable_log);
        Box::new(TraceProfiler::new(
            MonotonicClock::new(),
            (LogSink::padded(), durable),
        ))
    }

    #[cfg(all(not(feature = "std"), feature = "minios"))]
    fn trace_profiler(&self) -> Box<dyn Profiler> {
        use xc_profile::{LogSink, TraceProfiler};

        Box::new(TraceProfiler::new(MiniOsClock, LogSink::compact()))
    }

    #[cfg(all(not(feature = "std"), not(feature = "minios")))]
    fn trace_profiler(&self) -> Box<dyn Profiler> {
        log::warn!("clone tracing requested but no clock source is built in");
        Box::new(NoopProfiler)
    }
}

/// Mini-OS system time (`monotonic_clock()`, nanoseconds since boot)
#[cfg(feature = "minios")]
#[derive(Debug, Default, Clone, Copy)]
pub struct MiniOsClock;

#[cfg(feature = "minios")]
impl xc_profile::Clock for MiniOsClock {
    fn now_ns(&self) -> u64 {
        extern "C" {
            fn monotonic_clock() -> u64;
        }
        // SAFETY: reads the shared-info time, no preconditions.
        unsafe { monotonic_clock() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CloneConfig::default();
        assert_eq!(config.max_children, None);
        assert_eq!(config.scratch_limit, None);
        assert!(!config.trace);
        assert_eq!(config.profile_log_path, "/root/xl.profile.out");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let config = CloneConfig::default().with_max_children(0);
        assert_eq!(
            config.validate(),
            Err(CloneError::InvalidArgument {
                requested: 0,
                max: Some(0)
            })
        );
    }

    #[test]
    fn test_large_counts_pass_without_limit() {
        let config = CloneConfig::default();
        assert!(config.check_request(40_000).is_ok());
        assert!(config.check_request(u32::MAX).is_ok());
        assert_eq!(
            config.check_request(0),
            Err(CloneError::InvalidArgument {
                requested: 0,
                max: None
            })
        );
    }

    #[test]
    fn test_opt_in_limit() {
        let config = CloneConfig::default().with_max_children(4);
        assert!(config.check_request(4).is_ok());
        assert_eq!(
            config.check_request(5),
            Err(CloneError::InvalidArgument {
                requested: 5,
                max: Some(4)
            })
        );
    }

    #[test]
    fn test_builder() {
        let config = CloneConfig::default()
            .with_trace(true)
            .with_durable_log("/tmp/clone.profile")
            .with_log_level(LevelFilter::Debug)
            .with_scratch_limit(64);
        assert!(config.trace);
        assert_eq!(config.scratch_limit, Some(64));
        assert!(config.durable_log);
        assert_eq!(config.profile_log_path, "/tmp/clone.profile");
        assert_eq!(config.log_level, LevelFilter::Debug);
    }
}
