//! Self identification
//!
//! Resolves the domid of the running instance through xenbus. Purely a
//! query: the clone hypercall itself does not need it.

use spin::Once;
use xc_types::{CloneError, DomId, Result};

/// Control-plane channel able to answer "who am I"
pub trait IdentityChannel {
    /// `None` while the channel is not up
    fn query_self_id(&self) -> Option<DomId>;
}

/// Identity cached from xenbus once the connection is established
pub struct XenbusIdentity {
    domid: Once<DomId>,
}

impl XenbusIdentity {
    pub const fn new() -> Self {
        Self { domid: Once::new() }
    }

    /// Records our domid. Later calls keep the first value.
    pub fn attach(&self, domid: DomId) -> DomId {
        *self.domid.call_once(|| domid)
    }

    pub fn is_attached(&self) -> bool {
        self.domid.is_completed()
    }

    /// Reads the self id from Mini-OS' xenbus driver
    #[cfg(feature = "minios")]
    pub fn from_xenbus() -> Self {
        extern "C" {
            fn xenbus_get_self_id() -> u32;
        }

        let identity = Self::new();
        // SAFETY: plain query into the xenbus driver, which is initialised
        // before any application code runs.
        let raw = unsafe { xenbus_get_self_id() };
        if let Ok(raw) = u16::try_from(raw) {
            identity.attach(DomId::new(raw));
        }
        identity
    }
}

impl Default for XenbusIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityChannel for XenbusIdentity {
    fn query_self_id(&self) -> Option<DomId> {
        self.domid.get().copied()
    }
}

/// Stable identifier of the running instance
pub fn resolve_self_identity(channel: &dyn IdentityChannel) -> Result<DomId> {
    channel
        .query_self_id()
        .ok_or(CloneError::IdentityUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unattached_is_unavailable() {
        let xenbus = XenbusIdentity::new();
        assert!(!xenbus.is_attached());
        assert_eq!(
            resolve_self_identity(&xenbus),
            Err(CloneError::IdentityUnavailable)
        );
    }

    #[test]
    fn test_attached_resolves() {
        let xenbus = XenbusIdentity::new();
        xenbus.attach(DomId::new(5));
        assert_eq!(resolve_self_identity(&xenbus), Ok(DomId::new(5)));
        // Query twice, same answer
        assert_eq!(resolve_self_identity(&xenbus), Ok(DomId::new(5)));
    }

    #[test]
    fn test_first_attach_wins() {
        let xenbus = XenbusIdentity::new();
        xenbus.attach(DomId::new(5));
        assert_eq!(xenbus.attach(DomId::new(9)), DomId::new(5));
    }
}
