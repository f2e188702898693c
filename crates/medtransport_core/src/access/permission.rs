//! Named permissions consulted before scheduling reads.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Permission checked by the authorization collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Permission {
    /// Gate for every scheduling report (the hospital listing permission).
    ViewHospitals,
}

impl Permission {
    /// Stable permission name as stored by the authorization collaborator.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ViewHospitals => PERMISSION_VIEW_HOSPITALS,
        }
    }

    /// User-facing short description.
    pub fn description(self) -> &'static str {
        match self {
            Self::ViewHospitals => "Allow viewing hospitals and the transports scheduled to them.",
        }
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored name of [`Permission::ViewHospitals`].
pub const PERMISSION_VIEW_HOSPITALS: &str = "Pode_Visualizar_Hospitais";

const SUPPORTED_PERMISSION_NAMES: &[&str] = &[PERMISSION_VIEW_HOSPITALS];

/// Returns every permission name this crate understands.
pub fn supported_permission_names() -> &'static [&'static str] {
    SUPPORTED_PERMISSION_NAMES
}

/// Parses a stored permission name. Matching is exact and case-sensitive.
pub fn parse_permission(value: &str) -> Result<Permission, PermissionError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(PermissionError::EmptyName);
    }

    match normalized {
        PERMISSION_VIEW_HOSPITALS => Ok(Permission::ViewHospitals),
        other => Err(PermissionError::UnknownName(other.to_string())),
    }
}

/// Permission name parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    EmptyName,
    UnknownName(String),
}

impl Display for PermissionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "permission name must not be empty"),
            Self::UnknownName(value) => write!(f, "permission is unknown: {value}"),
        }
    }
}

impl Error for PermissionError {}
