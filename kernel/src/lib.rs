// src/lib.rs
// Point d'entrée de la bibliothèque de clonage
#![no_std] // Pas de bibliothèque standard

// Import de alloc pour le tampon d'identifiants enfants
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

// Modules
pub mod clone;
pub mod config;
pub mod logger;

// Réexportations
pub use clone::flags::{ForkFlags, ForkPolicy, ForkPolicyHandle};
pub use clone::hypercall::{DuplicateSignal, Duplicator};
pub use clone::identity::{resolve_self_identity, IdentityChannel, XenbusIdentity};
pub use clone::orchestrator::{ChildIdentitySet, CloneOrchestrator, RoleOutcome};
pub use config::CloneConfig;
pub use xc_types::{CloneError, DomId, ErrorCode, Result};

#[cfg(feature = "minios")]
pub use clone::hypercall::MiniOsDuplicator;
#[cfg(feature = "minios")]
pub use config::MiniOsClock;
