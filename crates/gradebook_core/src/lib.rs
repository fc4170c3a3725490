pub mod aggregate;
pub mod credential;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod gradebook;
pub mod ports;
pub mod values;

#[cfg(test)]
mod testing;

pub use aggregate::{aggregate, GradeSummary, Weighted};
pub use credential::{Credential, MalformedCredential};
pub use credentials::{verify_login, CredentialManager, Registration};
pub use domain::{Account, AccountCredentials, AccountId, AccountProfile, CourseRecord, CourseRecordId};
pub use error::{AuthError, CourseError, RegistrationError, ValidationError};
pub use gradebook::Gradebook;
pub use ports::{AuthSessionStore, PortError, PortResult, RecordStore};
pub use values::{CourseInput, Credit, GradePoint, GradingScale};
