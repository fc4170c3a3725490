//! crates/gradebook_core/src/error.rs
//!
//! Error types returned by the core services. Storage faults are carried as
//! `PortError` and never classified further here.

use crate::ports::PortError;

/// Malformed input, rejected before storage is touched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Username must not be empty")]
    EmptyUsername,
    #[error("Username cannot contain the character {0:?}")]
    ForbiddenUsernameChar(char),
    #[error("Display name must not be empty")]
    EmptyDisplayName,
    #[error("Password must be at least {min} characters long")]
    PasswordTooShort { min: usize },
    #[error("Course code must not be empty")]
    EmptyCourseCode,
    #[error("Unsupported credit value: {0}")]
    UnsupportedCredit(f64),
    #[error("Unsupported grade point: {0}")]
    UnsupportedGrade(f64),
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Username already exists")]
    DuplicateUsername,
    #[error("Storage failure: {0}")]
    Storage(#[source] PortError),
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown username or wrong password; the two cases are not told apart.
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Storage failure: {0}")]
    Storage(#[from] PortError),
}

#[derive(Debug, thiserror::Error)]
pub enum CourseError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Account {0} not found")]
    AccountNotFound(crate::domain::AccountId),
    #[error("Storage failure: {0}")]
    Storage(#[from] PortError),
}
