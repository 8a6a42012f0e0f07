//! Process-wide fork permissions
//!
//! Every instance starts with all fork-like mechanisms permitted. A domain
//! that discovers it is a fresh clone revokes them all, once and for good:
//! cloning is a single generation operation. Sibling subsystems (the
//! in-domain `fork` emulation, for one) hold a [`ForkPolicyHandle`] and
//! check it before forking.

use alloc::sync::Arc;
use bitflags::bitflags;
use core::sync::atomic::{AtomicU32, Ordering};

bitflags! {
    /// Fork-like mechanisms this instance may still start
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ForkFlags: u32 {
        /// In-domain process fork
        const FORK  = 0b0000_0001;
        /// Domain clone hypercall
        const CLONE = 0b0000_0010;
    }
}

/// Shared handle readable by sibling subsystems
pub type ForkPolicyHandle = Arc<ForkPolicy>;

/// Monotonic permission state: bits are only ever cleared
#[derive(Debug)]
pub struct ForkPolicy {
    bits: AtomicU32,
}

impl ForkPolicy {
    /// Fresh state, everything permitted
    pub const fn new() -> Self {
        Self {
            bits: AtomicU32::new(ForkFlags::all().bits()),
        }
    }

    pub fn new_handle() -> ForkPolicyHandle {
        Arc::new(Self::new())
    }

    /// Process-wide instance for production wiring
    pub fn global() -> &'static ForkPolicyHandle {
        static GLOBAL: spin::Once<ForkPolicyHandle> = spin::Once::new();
        GLOBAL.call_once(ForkPolicy::new_handle)
    }

    pub fn flags(&self) -> ForkFlags {
        ForkFlags::from_bits_truncate(self.bits.load(Ordering::Acquire))
    }

    /// True if every mechanism in `which` is still allowed
    pub fn is_permitted(&self, which: ForkFlags) -> bool {
        self.flags().contains(which)
    }

    /// True once this instance has been through [`ForkPolicy::forbid_all`]
    pub fn is_child(&self) -> bool {
        self.flags().is_empty()
    }

    /// Revokes every mechanism.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn forbid_all(&self) -> bool {
        let previous = self.bits.fetch_and(0, Ordering::AcqRel);
        previous != 0
    }
}

impl Default for ForkPolicy {
    fn default() -> Self {
        Self::new()
    }
}
