//! Pure functions turning task and finance records into statistics and scores. Nothing in here
//! performs I/O, and apart from [TaskRecord::complete](crate::records::entities::TaskRecord)
//! nothing mutates its input.
//!
//! A single efficiency convention is used across the engine: the efficiency ratio is
//! `actual / estimated` (lower is better). Scores that need a "higher is better" figure use the
//! [pace] of a ratio instead.

pub mod analysis;
pub mod completion;
pub mod dashboard;
pub mod finance;
pub mod session;
pub mod tasks;
pub mod validation;

/// `actual / estimated`. Only defined for a positive estimate.
pub fn efficiency_ratio(actual_minutes: f64, estimated_minutes: f64) -> Option<f64> {
    if estimated_minutes > 0. {
        Some(actual_minutes / estimated_minutes)
    } else {
        None
    }
}

/// How well a task kept to its estimate on a `[0, 1]` scale: `estimated / actual`, capped at 1.
pub fn pace(ratio: f64) -> f64 {
    if ratio > 0. {
        f64::min(1., 1. / ratio)
    } else {
        1.
    }
}
