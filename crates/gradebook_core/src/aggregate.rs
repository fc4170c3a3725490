//! crates/gradebook_core/src/aggregate.rs
//!
//! Credit-weighted grade aggregation. Pure and deterministic: no rounding is
//! applied here, presentation decides how many decimals to show.

use serde::Serialize;

use crate::domain::CourseRecord;

/// Anything that carries a credit weight and a grade point.
///
/// The aggregator accepts any non-negative pair; the closed credit and grade
/// sets are enforced where records are created, not here.
pub trait Weighted {
    fn credit(&self) -> f64;
    fn grade_point(&self) -> f64;
}

impl Weighted for CourseRecord {
    fn credit(&self) -> f64 {
        self.credit.value()
    }

    fn grade_point(&self) -> f64 {
        self.grade.value()
    }
}

/// `(credit, grade)` pairs.
impl Weighted for (f64, f64) {
    fn credit(&self) -> f64 {
        self.0
    }

    fn grade_point(&self) -> f64 {
        self.1
    }
}

impl<T: Weighted + ?Sized> Weighted for &T {
    fn credit(&self) -> f64 {
        (**self).credit()
    }

    fn grade_point(&self) -> f64 {
        (**self).grade_point()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GradeSummary {
    pub total_points: f64,
    pub total_credits: f64,
    pub average_point: f64,
}

/// Sums `credit * grade` and `credit` over `records`.
///
/// The average is `total_points / total_credits`, or `0` when no credits were
/// recorded (including the empty input).
pub fn aggregate<I>(records: I) -> GradeSummary
where
    I: IntoIterator,
    I::Item: Weighted,
{
    let (total_points, total_credits) = records
        .into_iter()
        .fold((0.0, 0.0), |(points, credits), record| {
            let credit = record.credit();
            (points + credit * record.grade_point(), credits + credit)
        });

    let average_point = if total_credits > 0.0 {
        total_points / total_credits
    } else {
        0.0
    };

    GradeSummary {
        total_points,
        total_credits,
        average_point,
    }
}
