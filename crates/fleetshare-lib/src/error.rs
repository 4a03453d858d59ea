use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the fleetshare library.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a reservation transition was refused by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    /// The vehicle is already reserved (by anyone, including the caller).
    AlreadyReserved,
    /// The vehicle is reserved, but not by the caller.
    HeldByAnotherHolder,
    /// The vehicle is not reserved at all.
    NotReserved,
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            ConflictReason::AlreadyReserved => "vehicle is unavailable",
            ConflictReason::HeldByAnotherHolder => "vehicle is held by another holder",
            ConflictReason::NotReserved => "vehicle is not reserved",
        };
        f.write_str(value)
    }
}

/// Caller-facing classification of an [`Error`].
///
/// Transport layers map these kinds to status codes; the variants of
/// [`Error`] carry the detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    EmptyArgument,
    InvalidArgument,
    NotFound,
    OperationNotAllowed,
    Storage,
}

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A required identifier or parameter was missing or blank.
    #[error("{field} must not be empty")]
    EmptyArgument { field: &'static str },

    /// A value was present but outside its contract.
    #[error("invalid {field}: {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    /// The referenced vehicle does not exist.
    #[error("vehicle {vehicle_id} not found")]
    NotFound { vehicle_id: String },

    /// Raised by the reservation store when a compare-and-set precondition fails.
    #[error("reservation conflict on vehicle {vehicle_id}: {reason}")]
    Conflict {
        vehicle_id: String,
        reason: ConflictReason,
    },

    /// Raised by the trip engine when the vehicle's current state forbids the operation.
    #[error("operation not allowed on vehicle {vehicle_id}: {reason}")]
    OperationNotAllowed {
        vehicle_id: String,
        reason: ConflictReason,
    },

    /// Raised when a fleet dataset lists the same vehicle twice.
    #[error("duplicate vehicle id {vehicle_id} in fleet dataset")]
    DuplicateVehicle { vehicle_id: String },

    /// Fleet dataset could not be located at the given path.
    #[error("fleet dataset not found at {path}")]
    DatasetNotFound { path: PathBuf },

    /// Raised when a SQLite dataset lacks the `vehicles` table.
    #[error("unsupported fleet dataset schema at {path}; expected a vehicles table")]
    UnsupportedSchema { path: PathBuf },

    /// The storage backend could not serve the request (e.g. a poisoned lock).
    #[error("storage unavailable: {message}")]
    StorageUnavailable { message: String },

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON dataset errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(vehicle_id: &str) -> Self {
        Error::NotFound {
            vehicle_id: vehicle_id.to_string(),
        }
    }

    /// Classify this error into one of the caller-facing kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyArgument { .. } => ErrorKind::EmptyArgument,
            Error::InvalidArgument { .. } | Error::DuplicateVehicle { .. } => {
                ErrorKind::InvalidArgument
            }
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Conflict { .. } | Error::OperationNotAllowed { .. } => {
                ErrorKind::OperationNotAllowed
            }
            _ => ErrorKind::Storage,
        }
    }
}

/// Reject blank identifiers before they reach storage.
pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::EmptyArgument { field });
    }
    Ok(())
}
