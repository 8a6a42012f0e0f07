#![no_std]

pub mod domid;
pub mod error;

// Réexportations
pub use domid::DomId;
pub use error::{CloneError, ErrorCode, Result};
