use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    records::entities::{Rating, TaskRecord},
    utils::percentage::round_to,
};

use super::efficiency_ratio;

/// Ratio at or below which a task is rated [Rating::Excellent].
pub const EXCELLENT_RATIO: f64 = 0.8;
/// Ratio at or below which a task is rated [Rating::Good].
pub const GOOD_RATIO: f64 = 1.2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompletionError {
    #[error("task is already completed")]
    AlreadyCompleted,
    #[error("task has no start time")]
    NotStarted,
}

/// Everything a completion writes into a task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompletionScore {
    pub completed_at: NaiveDateTime,
    pub elapsed_seconds: f64,
    pub actual_minutes: f64,
    /// `actual / estimated`, absent without an estimate.
    pub ratio: Option<f64>,
    pub rating: Rating,
}

/// Maps an efficiency ratio onto a rating. No ratio means there was nothing to compare against,
/// which counts as [Rating::Good].
pub fn rate(ratio: Option<f64>) -> Rating {
    match ratio {
        Some(ratio) if ratio <= EXCELLENT_RATIO => Rating::Excellent,
        Some(ratio) if ratio <= GOOD_RATIO => Rating::Good,
        Some(_) => Rating::NeedsImprovement,
        None => Rating::Good,
    }
}

/// Scores a task finished at `completed_at`. A completion before the start counts as zero
/// elapsed time, the inverted timestamps are left for validation to report.
pub fn score_completion(
    started_at: NaiveDateTime,
    completed_at: NaiveDateTime,
    estimated_minutes: f64,
) -> CompletionScore {
    let elapsed = (completed_at - started_at).num_milliseconds().max(0) as f64 / 1000.;
    let actual_minutes = round_to(elapsed / 60., 1);
    let ratio = efficiency_ratio(actual_minutes, estimated_minutes);

    CompletionScore {
        completed_at,
        elapsed_seconds: round_to(elapsed, 1),
        actual_minutes,
        ratio,
        rating: rate(ratio),
    }
}

impl TaskRecord {
    /// Moves a pending task into the completed state. The score is computed before anything is
    /// written, so on error the task is left untouched.
    pub fn complete(&mut self, now: NaiveDateTime) -> Result<CompletionScore, CompletionError> {
        if self.completed {
            return Err(CompletionError::AlreadyCompleted);
        }
        let started_at = self.started_at.ok_or(CompletionError::NotStarted)?;

        let score = score_completion(started_at, now, self.estimated_minutes);

        debug!(
            "Completing {:?} after {} minutes, rated {}",
            self.description, score.actual_minutes, score.rating
        );

        self.completed = true;
        self.completed_at = Some(score.completed_at);
        self.elapsed_seconds = score.elapsed_seconds;
        self.actual_minutes = score.actual_minutes;
        self.rating = Some(score.rating);

        Ok(score)
    }
}
