use serde::Serialize;

use crate::records::entities::TaskRecord;

use super::efficiency_ratio;

/// Tasks that took more than this multiple of their estimate get reported.
pub const SLOW_TASK_RATIO: f64 = 2.;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum IssueKind {
    CompletionBeforeStart,
    MissingCompletionTime,
    SlowTask { ratio: f64 },
}

/// A data quality warning about the task at `index` of the validated slice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DataIssue {
    pub index: usize,
    pub kind: IssueKind,
}

/// Looks for records that are inconsistent or suspicious. Nothing here is fatal, the metrics
/// work on these records regardless.
pub fn validate_tasks(tasks: &[TaskRecord]) -> Vec<DataIssue> {
    let mut issues = vec![];
    for (index, task) in tasks.iter().enumerate() {
        match (task.started_at, task.completed_at) {
            (Some(start), Some(end)) if end < start => issues.push(DataIssue {
                index,
                kind: IssueKind::CompletionBeforeStart,
            }),
            (_, None) if task.completed => issues.push(DataIssue {
                index,
                kind: IssueKind::MissingCompletionTime,
            }),
            _ => {}
        }

        if task.actual_minutes > 0. {
            if let Some(ratio) = efficiency_ratio(task.actual_minutes, task.estimated_minutes)
                .filter(|ratio| *ratio > SLOW_TASK_RATIO)
            {
                issues.push(DataIssue {
                    index,
                    kind: IssueKind::SlowTask { ratio },
                });
            }
        }
    }
    issues
}
