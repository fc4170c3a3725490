//! crates/gradebook_core/src/values.rs
//!
//! Validated value objects. Every constructor here runs before storage is
//! touched, so the services only ever see well-formed input.

use serde::Serialize;
use std::fmt;

use crate::error::ValidationError;

/// Characters that may not appear anywhere in a username.
pub const FORBIDDEN_USERNAME_CHARS: [char; 11] =
    [' ', '/', '\\', ':', '<', '>', '|', '?', '*', '"', '\''];

pub const MIN_PASSWORD_LEN: usize = 6;

/// Allowed credit weights.
pub const ALLOWED_CREDITS: [f64; 5] = [1.0, 2.0, 3.0, 4.0, 4.5];

/// Allowed grade points, highest first.
pub const ALLOWED_GRADES: [f64; 17] = [
    4.00, 3.75, 3.70, 3.50, 3.30, 3.25, 3.00, 2.75, 2.70, 2.50, 2.30, 2.25, 2.00, 1.70, 1.30,
    1.00, 0.00,
];

// Tolerance for matching floats coming off the wire or out of storage.
const SCALE_EPSILON: f64 = 1e-9;

fn lookup(allowed: &[f64], value: f64) -> Option<f64> {
    allowed
        .iter()
        .copied()
        .find(|candidate| (candidate - value).abs() < SCALE_EPSILON)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw.is_empty() {
            return Err(ValidationError::EmptyUsername);
        }
        if let Some(c) = raw.chars().find(|c| FORBIDDEN_USERNAME_CHARS.contains(c)) {
            return Err(ValidationError::ForbiddenUsernameChar(c));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw.trim().is_empty() {
            return Err(ValidationError::EmptyDisplayName);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A raw password that passed the length check. Deliberately not `Debug`.
pub struct Password<'a>(&'a str);

impl<'a> Password<'a> {
    pub fn parse(raw: &'a str) -> Result<Self, ValidationError> {
        if raw.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseCode(String);

impl CourseCode {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw.trim().is_empty() {
            return Err(ValidationError::EmptyCourseCode);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A credit weight drawn from [`ALLOWED_CREDITS`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Credit(f64);

impl Credit {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Credit {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        lookup(&ALLOWED_CREDITS, value)
            .map(Self)
            .ok_or(ValidationError::UnsupportedCredit(value))
    }
}

impl fmt::Display for Credit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A grade point drawn from [`ALLOWED_GRADES`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GradePoint(f64);

impl GradePoint {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for GradePoint {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        lookup(&ALLOWED_GRADES, value)
            .map(Self)
            .ok_or(ValidationError::UnsupportedGrade(value))
    }
}

impl fmt::Display for GradePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// The three mutable fields of a course record, validated together.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseInput {
    pub code: CourseCode,
    pub credit: Credit,
    pub grade: GradePoint,
}

impl CourseInput {
    pub fn parse(code: &str, credit: f64, grade: f64) -> Result<Self, ValidationError> {
        Ok(Self {
            code: CourseCode::parse(code)?,
            credit: Credit::try_from(credit)?,
            grade: GradePoint::try_from(grade)?,
        })
    }
}

/// The closed value sets a client may choose from.
#[derive(Debug, Clone, Serialize)]
pub struct GradingScale {
    pub credits: Vec<f64>,
    pub grades: Vec<f64>,
}

impl GradingScale {
    pub fn standard() -> Self {
        Self {
            credits: ALLOWED_CREDITS.to_vec(),
            grades: ALLOWED_GRADES.to_vec(),
        }
    }
}
