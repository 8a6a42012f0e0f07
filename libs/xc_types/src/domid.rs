// libs/xc_types/src/domid.rs
use core::fmt;

/// Identifiant de domaine Xen (`domid_t`, 16 bits)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct DomId(u16);

impl DomId {
    /// Premier identifiant réservé par l'hyperviseur
    pub const FIRST_RESERVED: DomId = DomId(0x7FF0);

    /// Désigne le domaine appelant dans les hypercalls
    pub const SELF: DomId = DomId(0x7FF0);

    /// Domaine de contrôle
    pub const DOM0: DomId = DomId(0);

    /// Crée un identifiant à partir de sa valeur brute
    pub const fn new(raw: u16) -> Self {
        DomId(raw)
    }

    /// Retourne la valeur brute
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Vrai si l'identifiant tombe dans la plage réservée (DOMID_SELF, DOMID_IO, ...)
    pub const fn is_reserved(self) -> bool {
        self.0 >= Self::FIRST_RESERVED.0
    }
}

impl From<u16> for DomId {
    fn from(raw: u16) -> Self {
        DomId(raw)
    }
}

impl From<DomId> for u16 {
    fn from(id: DomId) -> Self {
        id.0
    }
}

impl fmt::Display for DomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
