//! Duplication primitive
//!
//! The hypervisor does the actual copy. From our side it is a single blocking
//! call that returns once in the original and once in every child.

use xc_types::DomId;

/// Outcome of one duplication, as seen by the instance it returns in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateSignal {
    /// Issuing instance; the id buffer is fully populated
    Original,
    /// Freshly created copy; the id buffer is meaningless here
    NewChild,
    /// Nothing usable happened; opaque code from the hypervisor side
    Error(i32),
}

impl DuplicateSignal {
    /// Decodes Mini-OS' `clone()` return value: 0 parent, 1 child, else error
    pub fn from_raw(rc: i32) -> Self {
        match rc {
            0 => Self::Original,
            1 => Self::NewChild,
            code => Self::Error(code),
        }
    }
}

/// Something able to duplicate the running domain
pub trait Duplicator {
    /// Creates `children.len()` copies of the caller.
    ///
    /// On [`DuplicateSignal::Original`] every slot of `children` holds a
    /// child domid, in creation order.
    fn duplicate(&mut self, children: &mut [DomId]) -> DuplicateSignal;
}

impl<D: Duplicator + ?Sized> Duplicator for &mut D {
    fn duplicate(&mut self, children: &mut [DomId]) -> DuplicateSignal {
        (**self).duplicate(children)
    }
}

/// Mini-OS `clone()` hypercall wrapper
#[cfg(feature = "minios")]
#[derive(Debug, Default, Clone, Copy)]
pub struct MiniOsDuplicator;

#[cfg(feature = "minios")]
impl Duplicator for MiniOsDuplicator {
    fn duplicate(&mut self, children: &mut [DomId]) -> DuplicateSignal {
        extern "C" {
            fn clone(nr_children: u32, child_domids: *mut u16) -> i32;
        }

        let Ok(count) = u32::try_from(children.len()) else {
            return DuplicateSignal::Error(-1);
        };
        // SAFETY: DomId is repr(transparent) over u16 and the buffer holds
        // exactly `count` entries for the hypervisor to fill.
        let rc = unsafe { clone(count, children.as_mut_ptr().cast::<u16>()) };
        DuplicateSignal::from_raw(rc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_convention() {
        assert_eq!(DuplicateSignal::from_raw(0), DuplicateSignal::Original);
        assert_eq!(DuplicateSignal::from_raw(1), DuplicateSignal::NewChild);
        assert_eq!(DuplicateSignal::from_raw(-12), DuplicateSignal::Error(-12));
        assert_eq!(DuplicateSignal::from_raw(7), DuplicateSignal::Error(7));
    }

    // Tag plus the raw rc, returned by value from every duplicate call
    static_assertions::assert_eq_size!(DuplicateSignal, u64);
    static_assertions::assert_impl_all!(DuplicateSignal: Copy, Send, Sync);
}
