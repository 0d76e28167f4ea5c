use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::records::entities::{FinanceRecord, TaskRecord};

use super::{
    finance::{risk_score, spending_pattern, total_expense, total_income, SpendingPattern},
    tasks::{
        completed, completion_rate, estimate_accuracy, focus_score, mean,
        start_hour_distribution,
    },
};

const LOW_COMPLETION_RATE: f64 = 0.5;
const HEAVY_SPENDING: f64 = 500.;
const LONG_SESSION_MINUTES: f64 = 120.;
const POMODORO_COMPLETION_RATE: f64 = 0.7;
const COOLING_OFF_RISK: f64 = 0.7;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DayTaskAnalysis {
    pub total: usize,
    pub completed: usize,
    pub completion_rate: f64,
    /// Estimated minutes per minute actually spent. Above 1 means estimates were generous.
    pub estimate_accuracy: f64,
    pub focus_score: f64,
    /// Tasks started per hour of the day.
    pub start_hours: BTreeMap<u32, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DayFinanceAnalysis {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
    pub risk_score: f64,
    pub spending: SpendingPattern,
}

/// Observations about a day, left to the presentation layer to put into words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Signal {
    /// Less than half of the tasks got done.
    LowCompletion,
    HeavySpending,
    /// Completed tasks averaged more than two hours.
    LongSessions,
    /// Work in short timed blocks with breaks.
    Pomodoro,
    /// Wait before any large purchase.
    CoolingOff,
    /// Most tasks were started at this hour, it's a good slot for the important ones.
    PeakHour(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayAnalysis {
    pub date: NaiveDate,
    pub tasks: DayTaskAnalysis,
    pub finance: DayFinanceAnalysis,
    pub signals: Vec<Signal>,
}

/// Analyzes records of a single day. Records are expected to be already filtered to `date`.
pub fn analyze_day(date: NaiveDate, tasks: &[TaskRecord], finance: &[FinanceRecord]) -> DayAnalysis {
    let tasks_analysis = analyze_tasks(tasks);
    let finance_analysis = analyze_finance(finance);
    let signals = signals(tasks, &tasks_analysis, &finance_analysis);

    DayAnalysis {
        date,
        tasks: tasks_analysis,
        finance: finance_analysis,
        signals,
    }
}

fn analyze_tasks(tasks: &[TaskRecord]) -> DayTaskAnalysis {
    DayTaskAnalysis {
        total: tasks.len(),
        completed: completed(tasks).count(),
        completion_rate: completion_rate(tasks),
        estimate_accuracy: estimate_accuracy(tasks),
        focus_score: focus_score(tasks),
        start_hours: start_hour_distribution(tasks),
    }
}

fn analyze_finance(finance: &[FinanceRecord]) -> DayFinanceAnalysis {
    let income = total_income(finance);
    let expense = total_expense(finance);
    DayFinanceAnalysis {
        income,
        expense,
        balance: income - expense,
        risk_score: risk_score(finance),
        spending: spending_pattern(finance),
    }
}

fn signals(
    tasks: &[TaskRecord],
    task_analysis: &DayTaskAnalysis,
    finance_analysis: &DayFinanceAnalysis,
) -> Vec<Signal> {
    let mut signals = vec![];

    if task_analysis.total > 0 && task_analysis.completion_rate < LOW_COMPLETION_RATE {
        signals.push(Signal::LowCompletion);
    }
    if finance_analysis.expense > HEAVY_SPENDING {
        signals.push(Signal::HeavySpending);
    }
    let durations = completed(tasks)
        .map(TaskRecord::duration_minutes)
        .collect::<Vec<_>>();
    if mean(&durations).is_some_and(|v| v > LONG_SESSION_MINUTES) {
        signals.push(Signal::LongSessions);
    }

    if task_analysis.completion_rate < POMODORO_COMPLETION_RATE {
        signals.push(Signal::Pomodoro);
    }
    if finance_analysis.risk_score > COOLING_OFF_RISK {
        signals.push(Signal::CoolingOff);
    }
    if let Some(hour) = peak_hour(&task_analysis.start_hours) {
        signals.push(Signal::PeakHour(hour));
    }

    signals
}

/// Busiest hour, the earliest one wins a tie.
fn peak_hour(start_hours: &BTreeMap<u32, usize>) -> Option<u32> {
    start_hours
        .iter()
        .fold(None, |peak: Option<(u32, usize)>, (&hour, &count)| match peak {
            Some((_, best)) if best >= count => peak,
            _ => Some((hour, count)),
        })
        .map(|(hour, _)| hour)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

    use crate::records::entities::{EntryKind, FinanceRecord, TaskRecord, Urgency};

    use super::{analyze_day, Signal};

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2024, 4, 5).unwrap();

    fn at(hour: u32) -> NaiveDateTime {
        TEST_DATE.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap())
    }

    fn task(hour: u32, minutes: Option<i64>) -> TaskRecord {
        let mut task = TaskRecord::started("task", "work", Urgency::Medium, 60., at(hour));
        if let Some(minutes) = minutes {
            task.complete(at(hour) + Duration::minutes(minutes)).unwrap();
        }
        task
    }

    #[test]
    fn test_empty_day() {
        let analysis = analyze_day(TEST_DATE, &[], &[]);

        assert_eq!(analysis.tasks.total, 0);
        assert_eq!(analysis.finance.risk_score, 0.);
        // nothing was done, so the completion advice still applies
        assert_eq!(analysis.signals, vec![Signal::Pomodoro]);
    }

    #[test]
    fn test_productive_day() {
        let tasks = [task(9, Some(50)), task(9, Some(40)), task(14, Some(60))];
        let finance = [FinanceRecord::new(EntryKind::Expense, 20., "food", at(12))];

        let analysis = analyze_day(TEST_DATE, &tasks, &finance);

        assert_eq!(analysis.tasks.completed, 3);
        assert_eq!(analysis.tasks.completion_rate, 1.);
        assert_eq!(analysis.tasks.focus_score, 100.);
        assert_eq!(analysis.finance.balance, -20.);
        assert_eq!(analysis.signals, vec![Signal::PeakHour(9)]);
    }

    #[test]
    fn test_rough_day() {
        let tasks = [
            task(8, Some(200)),
            task(10, None),
            task(13, None),
            task(15, None),
        ];
        let finance = [
            FinanceRecord::new(EntryKind::Expense, 450., "shopping", at(18)),
            FinanceRecord::new(EntryKind::Expense, 120., "entertainment", at(20)),
            FinanceRecord::new(EntryKind::Income, 50., "salary", at(9)),
        ];

        let analysis = analyze_day(TEST_DATE, &tasks, &finance);

        assert_eq!(analysis.tasks.completion_rate, 0.25);
        assert_eq!(analysis.finance.expense, 570.);
        assert_eq!(analysis.finance.risk_score, 1.);
        assert_eq!(
            analysis.signals,
            vec![
                Signal::LowCompletion,
                Signal::HeavySpending,
                Signal::LongSessions,
                Signal::Pomodoro,
                Signal::CoolingOff,
                Signal::PeakHour(8),
            ]
        );
    }
}
