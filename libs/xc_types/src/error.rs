// libs/xc_types/src/error.rs
use core::fmt;

/// Type de résultat standard pour xenclone
pub type Result<T> = core::result::Result<T, CloneError>;

/// errno Mini-OS utilisés par la bibliothèque de clonage
const EINVAL: i32 = 22;
const ENOMEM: i32 = 12;
const ENODEV: i32 = 19;

/// Codes d'erreur du clonage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Nombre d'enfants nul ou hors limites
    InvalidArgument = 1,

    /// Allocation du tampon d'identifiants impossible
    ResourceExhausted = 2,

    /// Canal xenbus non initialisé
    IdentityUnavailable = 3,

    /// L'hyperviseur a refusé ou raté la duplication
    DuplicationError = 4,
}

/// Erreurs de clonage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneError {
    /// Rejeté localement, avant toute allocation ou hypercall.
    ///
    /// `max` n'est renseigné que si l'application a fixé une limite.
    InvalidArgument { requested: u32, max: Option<u32> },

    /// Le tampon de `requested` identifiants n'a pas pu être réservé
    ResourceExhausted { requested: u32 },

    /// Impossible de savoir qui nous sommes
    IdentityUnavailable,

    /// Code opaque remonté tel quel par la primitive de duplication.
    ///
    /// Des domaines enfants peuvent malgré tout exister côté hyperviseur.
    DuplicationError { code: i32 },
}

impl CloneError {
    /// Retourne le code d'erreur
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Self::ResourceExhausted { .. } => ErrorCode::ResourceExhausted,
            Self::IdentityUnavailable => ErrorCode::IdentityUnavailable,
            Self::DuplicationError { .. } => ErrorCode::DuplicationError,
        }
    }

    /// Valeur de retour négative façon Mini-OS (`-EINVAL`, `-ENOMEM`, ...)
    pub fn errno(&self) -> i32 {
        match self {
            Self::InvalidArgument { .. } => -EINVAL,
            Self::ResourceExhausted { .. } => -ENOMEM,
            Self::IdentityUnavailable => -ENODEV,
            Self::DuplicationError { .. } => -1,
        }
    }

    /// L'appelant peut-il réessayer ?
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::IdentityUnavailable => false,
            _ => true,
        }
    }

    /// Conseil de reprise pour les logs
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::InvalidArgument { max: None, .. } => "Request at least one child",
            Self::InvalidArgument { .. } => "Request between 1 and max_children children",
            Self::ResourceExhausted { .. } => "Free memory or request fewer children",
            Self::IdentityUnavailable => "Wait for xenbus to come up before querying",
            Self::DuplicationError { .. } => {
                "Still running as the single original; orphaned children may exist"
            }
        }
    }
}

impl fmt::Display for CloneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { requested, max: None } => {
                write!(f, "Invalid child count: {}", requested)
            }
            Self::InvalidArgument { requested, max: Some(max) } => {
                write!(f, "Invalid child count: {} (allowed 1..={})", requested, max)
            }
            Self::ResourceExhausted { requested } => {
                write!(f, "Out of memory for {} child domids", requested)
            }
            Self::IdentityUnavailable => write!(f, "Domain identity unavailable"),
            Self::DuplicationError { code } => write!(f, "Duplication failed: rc={}", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errno_mapping() {
        assert_eq!(CloneError::InvalidArgument { requested: 0, max: None }.errno(), -22);
        assert_eq!(CloneError::ResourceExhausted { requested: 4 }.errno(), -12);
        assert_eq!(CloneError::IdentityUnavailable.errno(), -19);
        assert_eq!(CloneError::DuplicationError { code: 7 }.errno(), -1);
    }

    #[test]
    fn test_codes() {
        assert_eq!(
            CloneError::DuplicationError { code: -3 }.code(),
            ErrorCode::DuplicationError
        );
        assert!(!CloneError::IdentityUnavailable.is_recoverable());
        assert!(CloneError::DuplicationError { code: 7 }.is_recoverable());
    }
}
