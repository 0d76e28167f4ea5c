//! Turns records and engine results into the text shown to the user.

use ansi_term::Colour;

use crate::{
    engine::{analysis::Signal, efficiency_ratio, validation::IssueKind},
    records::entities::{FinanceRecord, Rating, TaskRecord},
};

pub fn money(currency: &str, amount: f64) -> String {
    format!("{currency}{amount:.2}")
}

pub fn minutes(value: f64) -> String {
    format!("{value:.1} min")
}

pub fn colored_rating(rating: Rating) -> String {
    let colour = match rating {
        Rating::Excellent => Colour::Green,
        Rating::Good => Colour::Yellow,
        Rating::NeedsImprovement => Colour::Red,
    };
    colour.paint(rating.to_string()).to_string()
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

/// Short form of a task used by listings.
pub fn task_row(position: usize, task: &TaskRecord) -> String {
    let status = if task.completed {
        match task.rating {
            Some(rating) => format!(
                "done in {}, {}",
                minutes(task.duration_minutes()),
                colored_rating(rating)
            ),
            None => format!("done in {}", minutes(task.duration_minutes())),
        }
    } else {
        match task.started_at {
            Some(start) => format!("running since {}", start.format("%H:%M")),
            None => "pending".to_string(),
        }
    };
    format!(
        "{position}\t[{}]\t{}\t{} urgency\t{} estimated\t{status}",
        or_dash(&task.category),
        task.description,
        task.urgency,
        minutes(task.estimated_minutes),
    )
}

/// Long form of a task, one line with every detail. Used in the prompt.
pub fn task_details(task: &TaskRecord) -> String {
    let efficiency = match efficiency_ratio(task.actual_minutes, task.estimated_minutes) {
        Some(ratio) => format!("{ratio:.2}x"),
        None => "N/A".to_string(),
    };
    format!(
        "Task: {} | Category: {} | Status: {} | Time: {} | Efficiency: {efficiency} | Rating: {} | Urgency: {}",
        or_dash(&task.description),
        or_dash(&task.category),
        if task.completed { "completed" } else { "not completed" },
        minutes(task.duration_minutes()),
        task.rating.map(|v| v.to_string()).unwrap_or("-".to_string()),
        task.urgency,
    )
}

pub fn finance_row(position: usize, record: &FinanceRecord, currency: &str) -> String {
    format!(
        "{position}\t{}\t{}\t[{}]\t{}\t{}",
        record.kind.map(|v| v.to_string()).unwrap_or("?".to_string()),
        money(currency, record.amount),
        or_dash(&record.category),
        or_dash(&record.payment_method),
        or_dash(&record.notes),
    )
}

pub fn finance_details(record: &FinanceRecord, currency: &str) -> String {
    format!(
        "Type: {} | Amount: {} | Category: {} | Payment: {} | Notes: {}",
        record.kind.map(|v| v.to_string()).unwrap_or("-".to_string()),
        money(currency, record.amount),
        or_dash(&record.category),
        or_dash(&record.payment_method),
        or_dash(&record.notes),
    )
}

pub fn describe_signal(signal: Signal) -> String {
    match signal {
        Signal::LowCompletion => "Less than half of the tasks were completed".into(),
        Signal::HeavySpending => "Spending was unusually high".into(),
        Signal::LongSessions => "Tasks averaged more than two hours, consider splitting them".into(),
        Signal::Pomodoro => "Try working in 25 minute pomodoro blocks with short breaks".into(),
        Signal::CoolingOff => {
            "Wait 24 hours before any non essential purchase over a moderate amount".into()
        }
        Signal::PeakHour(hour) => {
            format!("Most tasks were started around {hour:02}:00, keep that slot for important work")
        }
    }
}

pub fn describe_issue(kind: IssueKind) -> String {
    match kind {
        IssueKind::CompletionBeforeStart => "completed before it was started".into(),
        IssueKind::MissingCompletionTime => "marked as completed without a completion time".into(),
        IssueKind::SlowTask { ratio } => format!("took {ratio:.1}x its estimate"),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use crate::{
        engine::{analysis::Signal, validation::IssueKind},
        records::entities::{EntryKind, FinanceRecord, TaskRecord, Urgency},
    };

    use super::{describe_issue, describe_signal, finance_details, money, task_details};

    #[test]
    fn test_money() {
        assert_eq!(money("RM", 12.5), "RM12.50");
    }

    #[test]
    fn test_task_details() {
        let task = TaskRecord {
            description: "report".into(),
            completed: true,
            estimated_minutes: 20.,
            actual_minutes: 30.,
            urgency: Urgency::High,
            ..Default::default()
        };
        assert_eq!(
            task_details(&task),
            "Task: report | Category: - | Status: completed | Time: 30.0 min | Efficiency: 1.50x | Rating: - | Urgency: high"
        );
    }

    #[test]
    fn test_finance_details() {
        let at = NaiveDate::from_ymd_opt(2024, 4, 5)
            .unwrap()
            .and_time(NaiveTime::MIN);
        let record = FinanceRecord::new(EntryKind::Expense, 7., "food", at);
        assert_eq!(
            finance_details(&record, "$"),
            "Type: expense | Amount: $7.00 | Category: food | Payment: - | Notes: -"
        );
    }

    #[test]
    fn test_descriptions() {
        assert!(describe_signal(Signal::PeakHour(9)).contains("09:00"));
        assert_eq!(
            describe_issue(IssueKind::SlowTask { ratio: 2.5 }),
            "took 2.5x its estimate"
        );
    }
}
