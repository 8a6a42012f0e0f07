//! Clone orchestration
//!
//! `clone_domain(n)` takes the caller from "running singly" to "running as
//! original + n children". The hypercall is not abortable and there is no
//! rollback once children run, so the sequence is kept short:
//!
//! 1. validate `n` locally (no allocation, no hypercall on failure)
//! 2. reserve the scratch domid buffer
//! 3. duplicate
//! 4. interpret the signal; a child revokes its fork permissions before
//!    returning
//!
//! The scratch buffer is released on every one of these paths.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use xc_profile::{scope, Profiler};
use xc_types::{CloneError, DomId, Result};

use super::flags::ForkPolicyHandle;
use super::hypercall::{DuplicateSignal, Duplicator};
use crate::config::CloneConfig;

/// Domids of the children created by one clone, in creation order
pub type ChildIdentitySet = Vec<DomId>;

/// Role of the executing instance after a clone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleOutcome {
    /// The issuing instance, now knowing all of its children
    ContinuingOriginal { children: ChildIdentitySet },
    /// A fresh copy; fork permissions have been revoked
    NewChild,
    /// No split happened, still the single original.
    ///
    /// Children may nonetheless be live on the hypervisor side; they are
    /// neither tracked nor reused by later attempts.
    Failed { reason: i32 },
}

impl RoleOutcome {
    pub fn is_original(&self) -> bool {
        matches!(self, Self::ContinuingOriginal { .. })
    }

    pub fn is_child(&self) -> bool {
        matches!(self, Self::NewChild)
    }

    /// Children spawned by this instance; empty unless original
    pub fn children(&self) -> &[DomId] {
        match self {
            Self::ContinuingOriginal { children } => children,
            _ => &[],
        }
    }

    /// Legacy return convention: 0 parent, 1 child, -1 error
    pub fn as_raw(&self) -> i32 {
        match self {
            Self::ContinuingOriginal { .. } => 0,
            Self::NewChild => 1,
            Self::Failed { .. } => -1,
        }
    }

    /// `Failed` as an error value, for callers that prefer `?`
    pub fn into_result(self) -> Result<Self> {
        match self {
            Self::Failed { reason } => Err(CloneError::DuplicationError { code: reason }),
            other => Ok(other),
        }
    }
}

/// Domid buffer handed to the hypervisor, accounted while alive
struct Scratch<'a> {
    ids: Vec<DomId>,
    live: &'a AtomicUsize,
}

impl<'a> Scratch<'a> {
    /// Fails with `ResourceExhausted` past `limit` entries or when the
    /// allocator refuses; nothing is accounted in either case.
    fn reserve(count: u32, limit: Option<usize>, live: &'a AtomicUsize) -> Result<Self> {
        let exhausted = CloneError::ResourceExhausted { requested: count };
        if limit.is_some_and(|limit| count as usize > limit) {
            return Err(exhausted);
        }
        let mut ids = Vec::new();
        ids.try_reserve_exact(count as usize).map_err(|_| exhausted)?;
        ids.resize(count as usize, DomId::default());
        live.fetch_add(1, Ordering::Relaxed);
        Ok(Self { ids, live })
    }

    fn take(&mut self) -> ChildIdentitySet {
        core::mem::take(&mut self.ids)
    }
}

impl Drop for Scratch<'_> {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::Relaxed);
    }
}

pub struct CloneOrchestrator<D: Duplicator> {
    duplicator: D,
    policy: ForkPolicyHandle,
    config: CloneConfig,
    profiler: Box<dyn Profiler>,
    live_scratch: AtomicUsize,
}

impl<D: Duplicator> CloneOrchestrator<D> {
    /// Orchestrator with default limits and no instrumentation
    pub fn new(duplicator: D, policy: ForkPolicyHandle) -> Self {
        let config = CloneConfig::default();
        let profiler = config.profiler();
        Self::with_profiler(duplicator, policy, config, profiler)
    }

    /// Orchestrator with the profiler selected by `config`
    pub fn from_config(
        duplicator: D,
        policy: ForkPolicyHandle,
        config: CloneConfig,
    ) -> Result<Self> {
        config.validate()?;
        let profiler = config.profiler();
        Ok(Self::with_profiler(duplicator, policy, config, profiler))
    }

    pub fn with_profiler(
        duplicator: D,
        policy: ForkPolicyHandle,
        config: CloneConfig,
        profiler: Box<dyn Profiler>,
    ) -> Self {
        Self {
            duplicator,
            policy,
            config,
            profiler,
            live_scratch: AtomicUsize::new(0),
        }
    }

    pub fn policy(&self) -> &ForkPolicyHandle {
        &self.policy
    }

    pub fn config(&self) -> &CloneConfig {
        &self.config
    }

    pub fn duplicator(&self) -> &D {
        &self.duplicator
    }

    /// Scratch buffers currently allocated; 0 whenever no clone is running
    pub fn live_scratch(&self) -> usize {
        self.live_scratch.load(Ordering::Relaxed)
    }

    /// Splits this domain into the original plus `requested` children.
    ///
    /// `Err` only for local rejections (`InvalidArgument`,
    /// `ResourceExhausted`); a hypervisor failure comes back as
    /// [`RoleOutcome::Failed`].
    pub fn clone_domain(&mut self, requested: u32) -> Result<RoleOutcome> {
        log::debug!("cloning children={}", requested);

        self.config.check_request(requested)?;

        let profiler: &dyn Profiler = &*self.profiler;
        let _clone_scope = scope(profiler, "clone");

        let mut scratch = {
            let _alloc_scope = scope(profiler, "clone.alloc");
            Scratch::reserve(requested, self.config.scratch_limit, &self.live_scratch)?
        };

        let signal = {
            let _dup_scope = scope(profiler, "clone.duplicate");
            self.duplicator.duplicate(&mut scratch.ids)
        };

        let outcome = match signal {
            DuplicateSignal::Original => RoleOutcome::ContinuingOriginal {
                children: scratch.take(),
            },
            DuplicateSignal::NewChild => {
                if self.policy.forbid_all() {
                    log::info!("running as a fresh clone, fork disabled");
                }
                RoleOutcome::NewChild
            }
            DuplicateSignal::Error(code) => {
                log::error!("Error calling clone() rc={}", code);
                RoleOutcome::Failed { reason: code }
            }
        };

        drop(scratch);
        Ok(outcome)
    }
}
