use serde::Serialize;

use crate::{
    records::entities::{FinanceRecord, TaskRecord, Urgency},
    utils::percentage::round_to,
};

use super::{
    finance::{total_expense, total_income},
    tasks::{average_focus_minutes, average_pace, completed, completion_rate},
};

const COMPLETION_WEIGHT: f64 = 40.;
const PACE_WEIGHT: f64 = 30.;
/// Pace part of the score when no completed task can be compared to its estimate.
const NEUTRAL_PACE_POINTS: f64 = 15.;
const BASE_POINTS: f64 = 15.;
const HIGH_URGENCY_WEIGHT: f64 = 15.;

/// Overview of a period of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dashboard {
    /// `[0, 100]`, one decimal.
    pub completion_percent: f64,
    pub avg_focus_minutes: f64,
    pub income: f64,
    pub expense: f64,
    pub score: f64,
}

pub fn dashboard(tasks: &[TaskRecord], finance: &[FinanceRecord]) -> Dashboard {
    Dashboard {
        completion_percent: round_to(completion_rate(tasks) * 100., 1),
        avg_focus_minutes: average_focus_minutes(tasks),
        income: total_income(finance),
        expense: total_expense(finance),
        score: dashboard_score(tasks),
    }
}

/// Productivity score on a `[0, 100]` scale, rounded to a whole number. A period without
/// completed tasks scores 0. The urgency part is the completed share of high urgency tasks.
pub fn dashboard_score(tasks: &[TaskRecord]) -> f64 {
    if completed(tasks).next().is_none() {
        return 0.;
    }

    let pace_points = average_pace(tasks)
        .map(|v| v * PACE_WEIGHT)
        .unwrap_or(NEUTRAL_PACE_POINTS);

    let high_total = tasks.iter().filter(|v| v.urgency == Urgency::High).count();
    let high_completed = completed(tasks)
        .filter(|v| v.urgency == Urgency::High)
        .count();
    let urgency_points = if high_total == 0 {
        0.
    } else {
        high_completed as f64 / high_total as f64 * HIGH_URGENCY_WEIGHT
    };

    let score =
        completion_rate(tasks) * COMPLETION_WEIGHT + pace_points + BASE_POINTS + urgency_points;
    score.clamp(0., 100.).round()
}
