use std::collections::BTreeMap;

use chrono::Timelike;
use serde::Serialize;

use crate::{records::entities::TaskRecord, utils::percentage::round_to};

use super::{efficiency_ratio, pace};

/// Used when no completed task carries an estimate. Missing signal is treated as being exactly
/// on time.
pub const NEUTRAL_EFFICIENCY: f64 = 1.0;

/// Used by [focus_score] when no completed task has both an estimate and a duration.
pub const NEUTRAL_PACE: f64 = 0.5;

const FOCUS_COMPLETION_WEIGHT: f64 = 0.6;
const FOCUS_PACE_WEIGHT: f64 = 0.4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TaskEfficiencySummary {
    pub total: usize,
    pub completed: usize,
    /// Share of completed tasks, `[0, 1]`.
    pub completion_rate: f64,
    /// Average minutes per completed task.
    pub avg_duration: f64,
    /// Minutes spent on completed tasks.
    pub total_time: f64,
    /// Inverse of the mean efficiency ratio. Above 1 means tasks finish faster than estimated.
    pub efficiency_score: f64,
}

/// Share of completed tasks, 0 for an empty collection.
pub fn completion_rate(tasks: &[TaskRecord]) -> f64 {
    if tasks.is_empty() {
        0.
    } else {
        completed(tasks).count() as f64 / tasks.len() as f64
    }
}

pub(super) fn completed(tasks: &[TaskRecord]) -> impl Iterator<Item = &TaskRecord> {
    tasks.iter().filter(|v| v.completed)
}

pub fn summarize_tasks(tasks: &[TaskRecord]) -> TaskEfficiencySummary {
    if tasks.is_empty() {
        return TaskEfficiencySummary::default();
    }

    let durations = completed(tasks)
        .map(TaskRecord::duration_minutes)
        .collect::<Vec<_>>();

    let ratios = completed(tasks)
        .filter_map(|v| efficiency_ratio(v.duration_minutes(), v.estimated_minutes))
        .collect::<Vec<_>>();

    let avg_efficiency = mean(&ratios).unwrap_or(NEUTRAL_EFFICIENCY);

    let total_time = durations.iter().sum::<f64>();

    TaskEfficiencySummary {
        total: tasks.len(),
        completed: durations.len(),
        completion_rate: completion_rate(tasks),
        avg_duration: mean(&durations).unwrap_or(0.),
        total_time,
        efficiency_score: if avg_efficiency > 0. {
            1. / avg_efficiency
        } else {
            0.
        },
    }
}

/// Blend of completion rate and pace on a `[0, 100]` scale, rounded to one decimal.
pub fn focus_score(tasks: &[TaskRecord]) -> f64 {
    let avg_pace = average_pace(tasks).unwrap_or(NEUTRAL_PACE);
    let score =
        (completion_rate(tasks) * FOCUS_COMPLETION_WEIGHT + avg_pace * FOCUS_PACE_WEIGHT) * 100.;
    round_to(score, 1)
}

/// Mean pace of completed tasks that have both an estimate and a recorded duration.
pub fn average_pace(tasks: &[TaskRecord]) -> Option<f64> {
    let paces = completed(tasks)
        .filter(|v| v.actual_minutes > 0.)
        .filter_map(|v| efficiency_ratio(v.actual_minutes, v.estimated_minutes))
        .map(pace)
        .collect::<Vec<_>>();
    mean(&paces)
}

/// Sum of every estimate divided by the time spent on completed tasks. 0 when nothing was
/// timed.
pub fn estimate_accuracy(tasks: &[TaskRecord]) -> f64 {
    let estimated = tasks.iter().map(|v| v.estimated_minutes).sum::<f64>();
    let actual = completed(tasks).map(|v| v.actual_minutes).sum::<f64>();
    if actual > 0. {
        estimated / actual
    } else {
        0.
    }
}

/// Average minutes per completed task, rounded to one decimal.
pub fn average_focus_minutes(tasks: &[TaskRecord]) -> f64 {
    let durations = completed(tasks)
        .map(TaskRecord::duration_minutes)
        .collect::<Vec<_>>();
    round_to(mean(&durations).unwrap_or(0.), 1)
}

/// Number of tasks started during each hour of the day. Tasks without a start are skipped.
pub fn start_hour_distribution(tasks: &[TaskRecord]) -> BTreeMap<u32, usize> {
    let mut distribution = BTreeMap::new();
    for start in tasks.iter().filter_map(|v| v.started_at) {
        *distribution.entry(start.hour()).or_insert(0) += 1;
    }
    distribution
}

pub(super) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
