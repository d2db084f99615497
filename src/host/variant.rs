//! Process-wide binary-variant fact
//!
//! Which dispatch interface the running host exposes is determined once at
//! startup (by build detection or configuration) and never changes.

use core::fmt;

use once_cell::sync::OnceCell;

/// The two dispatch interfaces shipped across host builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostVariant {
    /// The refactored interface: the VM object exposes dispatch calls that
    /// take an inline argument supplier.
    Current,
    /// The older interface: dispatch goes through fixed vtable slots and a
    /// staged argument object.
    Legacy,
}

impl fmt::Display for HostVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => write!(f, "current"),
            Self::Legacy => write!(f, "legacy"),
        }
    }
}

static ACTIVE: OnceCell<HostVariant> = OnceCell::new();

/// Record the detected variant. Callable once per process.
pub fn init(variant: HostVariant) -> Result<(), VariantError> {
    ACTIVE
        .set(variant)
        .map_err(|_| VariantError::AlreadyInitialized(active_or_current()))
}

/// The recorded variant, if initialization has happened.
pub fn active() -> Option<HostVariant> {
    ACTIVE.get().copied()
}

fn active_or_current() -> HostVariant {
    active().unwrap_or(HostVariant::Current)
}

/// Variant initialization errors
#[derive(Debug)]
pub enum VariantError {
    AlreadyInitialized(HostVariant),
}

impl fmt::Display for VariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInitialized(v) => {
                write!(f, "host variant already initialized as {}", v)
            }
        }
    }
}

impl std::error::Error for VariantError {}
