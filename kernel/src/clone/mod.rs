//! # Domain cloning
//!
//! A running domain asks the hypervisor for N copies of itself. After the
//! hypercall returns, the original and every child resume from the same
//! point; each learns its role from the [`hypercall::DuplicateSignal`].
//!
//! - [`identity`]: who am I (xenbus self-id)
//! - [`hypercall`]: the duplication primitive seam
//! - [`flags`]: process-wide fork permissions, revoked in children
//! - [`orchestrator`]: validation, scratch buffer, role interpretation

pub mod flags;
pub mod hypercall;
pub mod identity;
pub mod orchestrator;
