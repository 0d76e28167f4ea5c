use std::io::Write;

use anyhow::Result;
use clap::Subcommand;
use tracing::{info, warn};

use crate::{
    records::{
        entities::{TaskRecord, Urgency},
        record_storage::RecordStorage,
    },
    utils::clock::Clock,
};

use super::{
    date::DATE_HELP,
    format::{colored_rating, minutes, task_row},
    invalid_value, position_to_index, CommandContext,
};

const DEFAULT_ESTIMATE_MINUTES: f64 = 30.;

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    #[command(about = "Add a task and start its timer")]
    Add {
        description: String,
        #[arg(short, long, default_value = "work")]
        category: String,
        #[arg(short, long, value_enum, default_value_t = Urgency::Medium)]
        urgency: Urgency,
        #[arg(short, long = "estimate", help = "Estimated minutes", default_value_t = DEFAULT_ESTIMATE_MINUTES)]
        estimate: f64,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long, help = DATE_HELP)]
        date: Option<String>,
    },
    #[command(about = "Complete tasks, stopping their timers")]
    Done {
        #[arg(required = true, help = "Positions of the tasks as shown by `task list`")]
        positions: Vec<usize>,
        #[arg(long, help = DATE_HELP)]
        date: Option<String>,
    },
    #[command(about = "Remove a task")]
    Rm {
        position: usize,
        #[arg(long, help = DATE_HELP)]
        date: Option<String>,
    },
    #[command(about = "List tasks of a day")]
    List {
        #[arg(long, help = DATE_HELP)]
        date: Option<String>,
    },
}

pub async fn process_task_command<S: RecordStorage, C: Clock>(
    command: TaskCommand,
    context: &CommandContext<S, C>,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        TaskCommand::Add {
            description,
            category,
            urgency,
            estimate,
            notes,
            date,
        } => {
            if description.trim().is_empty() {
                return Err(invalid_value("Task description can't be empty".into()));
            }
            if !estimate.is_finite() || estimate < 0. {
                return Err(invalid_value(format!(
                    "Estimate should be a positive number of minutes, got {estimate}"
                )));
            }
            let date = context.day(date.as_deref())?;
            let existing = context.storage.get_data_for::<TaskRecord>(date).await?;

            let mut task =
                TaskRecord::started(description, category, urgency, estimate, context.clock.now());
            task.date = Some(date);
            task.notes = notes.unwrap_or_default();

            context.storage.append(date, &task).await?;
            info!("Added task {:?} for {date}", task.description);
            writeln!(
                out,
                "Started #{} {} ({} estimated)",
                existing.len() + 1,
                task.description,
                minutes(task.estimated_minutes)
            )?;
        }
        TaskCommand::Done { positions, date } => {
            let date = context.day(date.as_deref())?;
            let mut tasks = context.storage.get_data_for::<TaskRecord>(date).await?;
            let indices = positions
                .iter()
                .map(|v| position_to_index(*v, tasks.len()))
                .collect::<Result<Vec<_>>>()?;

            let now = context.clock.now();
            let mut changed = false;
            for (position, index) in positions.iter().zip(indices) {
                let task = &mut tasks[index];
                match task.complete(now) {
                    Ok(score) => {
                        changed = true;
                        let ratio = score
                            .ratio
                            .map(|v| format!(", {v:.2}x the estimate"))
                            .unwrap_or_default();
                        writeln!(
                            out,
                            "Completed #{position} {} in {}{ratio}, {}",
                            task.description,
                            minutes(score.actual_minutes),
                            colored_rating(score.rating)
                        )?;
                    }
                    Err(e) => {
                        warn!("Skipped task #{position} on {date}: {e}");
                        writeln!(out, "Skipped #{position} {}: {e}", task.description)?;
                    }
                }
            }

            if changed {
                context.storage.replace_day(date, &tasks).await?;
            }
        }
        TaskCommand::Rm { position, date } => {
            let date = context.day(date.as_deref())?;
            let mut tasks = context.storage.get_data_for::<TaskRecord>(date).await?;
            let index = position_to_index(position, tasks.len())?;

            let removed = tasks.remove(index);
            context.storage.replace_day(date, &tasks).await?;
            info!("Removed task {:?} from {date}", removed.description);
            writeln!(out, "Removed #{position} {}", removed.description)?;
        }
        TaskCommand::List { date } => {
            let date = context.day(date.as_deref())?;
            let tasks = context.storage.get_data_for::<TaskRecord>(date).await?;
            if tasks.is_empty() {
                writeln!(out, "No tasks for {date}")?;
            }
            for (index, task) in tasks.iter().enumerate() {
                writeln!(out, "{}", task_row(index + 1, task))?;
            }
        }
    }
    Ok(())
}
