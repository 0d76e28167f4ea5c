use std::{io::Write, pin::pin};

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;
use futures::StreamExt;
use tracing::debug;

use crate::{
    engine::{
        analysis::analyze_day,
        dashboard::dashboard,
        finance::summarize_finance,
        tasks::summarize_tasks,
        validation::validate_tasks,
    },
    records::{
        entities::{FinanceRecord, TaskRecord},
        extract::{collect_between, extract_days},
        record_storage::RecordStorage,
    },
    utils::{clock::Clock, percentage::Percentage, time::Period},
};

use super::{
    date::DATE_HELP,
    format::{describe_issue, describe_signal, finance_details, minutes, money, task_details},
    CommandContext,
};

const PERIOD_HELP: &str = "Period around the date that gets included";

#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    #[command(about = "Task and finance statistics for a period")]
    Summary {
        #[arg(long, help = DATE_HELP)]
        date: Option<String>,
        #[arg(long, value_enum, default_value_t = Period::Day, help = PERIOD_HELP)]
        period: Period,
    },
    #[command(about = "Detailed analysis of a day with advice")]
    Analyze {
        #[arg(long, help = DATE_HELP)]
        date: Option<String>,
    },
    #[command(about = "Overview with a productivity score")]
    Dashboard {
        #[arg(long, help = DATE_HELP)]
        date: Option<String>,
        #[arg(long, value_enum, default_value_t = Period::Week, help = PERIOD_HELP)]
        period: Period,
    },
    #[command(about = "Report inconsistent or suspicious task records")]
    Validate {
        #[arg(long, help = DATE_HELP)]
        date: Option<String>,
        #[arg(long, value_enum, default_value_t = Period::Month, help = PERIOD_HELP)]
        period: Period,
    },
    #[command(about = "Print a daily review prompt for an AI assistant")]
    Prompt {
        #[arg(long, help = DATE_HELP)]
        date: Option<String>,
    },
}

pub async fn process_report_command<S: RecordStorage, C: Clock>(
    command: ReportCommand,
    context: &CommandContext<S, C>,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        ReportCommand::Summary { date, period } => {
            let (start, end) = period.bounds(context.day(date.as_deref())?);
            print_summary(context, start, end, out).await
        }
        ReportCommand::Analyze { date } => {
            let date = context.day(date.as_deref())?;
            print_analysis(context, date, out).await
        }
        ReportCommand::Dashboard { date, period } => {
            let (start, end) = period.bounds(context.day(date.as_deref())?);
            print_dashboard(context, start, end, out).await
        }
        ReportCommand::Validate { date, period } => {
            let (start, end) = period.bounds(context.day(date.as_deref())?);
            print_issues(context, start, end, out).await
        }
        ReportCommand::Prompt { date } => {
            let date = context.day(date.as_deref())?;
            print_prompt(context, date, out).await
        }
    }
}

fn range_title(start: NaiveDate, end: NaiveDate) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{start} - {end}")
    }
}

async fn print_summary<S: RecordStorage, C>(
    context: &CommandContext<S, C>,
    start: NaiveDate,
    end: NaiveDate,
    out: &mut impl Write,
) -> Result<()> {
    let tasks = collect_between::<TaskRecord>(&context.storage, start, end).await?;
    let finance = collect_between::<FinanceRecord>(&context.storage, start, end).await?;
    debug!(
        "Summarizing {} tasks and {} finance records",
        tasks.len(),
        finance.len()
    );

    let task_summary = summarize_tasks(&tasks);
    let finance_summary = summarize_finance(&finance);
    let currency = &context.settings.currency;

    writeln!(out, "Summary for {}", range_title(start, end))?;
    writeln!(out)?;
    writeln!(out, "Tasks")?;
    writeln!(
        out,
        "  completed\t{}/{} ({})",
        task_summary.completed,
        task_summary.total,
        Percentage::from_rate(task_summary.completion_rate)
    )?;
    writeln!(out, "  total time\t{}", minutes(task_summary.total_time))?;
    writeln!(out, "  average\t{}", minutes(task_summary.avg_duration))?;
    writeln!(out, "  efficiency\t{:.2}", task_summary.efficiency_score)?;
    writeln!(out)?;
    writeln!(out, "Finance")?;
    writeln!(out, "  income\t{}", money(currency, finance_summary.total_income))?;
    writeln!(out, "  expense\t{}", money(currency, finance_summary.total_expense))?;
    writeln!(out, "  balance\t{}", money(currency, finance_summary.net_balance))?;
    writeln!(
        out,
        "  daily expense\t{}",
        money(currency, finance_summary.avg_daily_expense)
    )?;
    for (category, amount) in &finance_summary.expense_by_category {
        writeln!(out, "  - {category}\t{}", money(currency, *amount))?;
    }
    Ok(())
}

async fn print_analysis<S: RecordStorage, C>(
    context: &CommandContext<S, C>,
    date: NaiveDate,
    out: &mut impl Write,
) -> Result<()> {
    let tasks = context.storage.get_data_for::<TaskRecord>(date).await?;
    let finance = context.storage.get_data_for::<FinanceRecord>(date).await?;
    let analysis = analyze_day(date, &tasks, &finance);
    let currency = &context.settings.currency;

    writeln!(out, "Analysis for {date}")?;
    writeln!(out)?;
    writeln!(
        out,
        "Tasks\t{}/{} completed ({}), focus score {:.1}, estimate accuracy {:.2}",
        analysis.tasks.completed,
        analysis.tasks.total,
        Percentage::from_rate(analysis.tasks.completion_rate),
        analysis.tasks.focus_score,
        analysis.tasks.estimate_accuracy,
    )?;
    for (hour, count) in &analysis.tasks.start_hours {
        writeln!(out, "  {hour:02}:00\t{}", "#".repeat(*count))?;
    }
    writeln!(
        out,
        "Finance\tincome {}, expense {}, balance {}, risk {:.2}",
        money(currency, analysis.finance.income),
        money(currency, analysis.finance.expense),
        money(currency, analysis.finance.balance),
        analysis.finance.risk_score,
    )?;
    let spending = &analysis.finance.spending;
    if let Some((category, amount)) = &spending.top_category {
        writeln!(
            out,
            "  most spent on {category} ({}) over {} expenses{}{}",
            money(currency, *amount),
            spending.expense_count,
            if spending.frequent { ", frequent spending" } else { "" },
            if spending.large_top_category { ", large" } else { "" },
        )?;
    }

    if !analysis.signals.is_empty() {
        writeln!(out)?;
        for signal in analysis.signals {
            writeln!(out, "* {}", describe_signal(signal))?;
        }
    }
    Ok(())
}

async fn print_dashboard<S: RecordStorage, C>(
    context: &CommandContext<S, C>,
    start: NaiveDate,
    end: NaiveDate,
    out: &mut impl Write,
) -> Result<()> {
    let tasks = collect_between::<TaskRecord>(&context.storage, start, end).await?;
    let finance = collect_between::<FinanceRecord>(&context.storage, start, end).await?;
    let overview = dashboard(&tasks, &finance);
    let currency = &context.settings.currency;

    writeln!(out, "Dashboard for {}", range_title(start, end))?;
    writeln!(out, "  completion\t{:.1}%", overview.completion_percent)?;
    writeln!(out, "  focus\t{}", minutes(overview.avg_focus_minutes))?;
    writeln!(out, "  income\t{}", money(currency, overview.income))?;
    writeln!(out, "  expense\t{}", money(currency, overview.expense))?;
    writeln!(out, "  score\t{:.0}/100", overview.score)?;
    Ok(())
}

async fn print_issues<S: RecordStorage, C>(
    context: &CommandContext<S, C>,
    start: NaiveDate,
    end: NaiveDate,
    out: &mut impl Write,
) -> Result<()> {
    let mut found = 0;
    let mut days = pin!(extract_days::<TaskRecord>(&context.storage, start, end));
    while let Some(day) = days.next().await {
        let (date, tasks) = day?;
        for issue in validate_tasks(&tasks) {
            found += 1;
            writeln!(
                out,
                "{date} #{} {}: {}",
                issue.index + 1,
                tasks[issue.index].description,
                describe_issue(issue.kind)
            )?;
        }
    }

    if found == 0 {
        writeln!(out, "No issues found in {}", range_title(start, end))?;
    }
    Ok(())
}

async fn print_prompt<S: RecordStorage, C>(
    context: &CommandContext<S, C>,
    date: NaiveDate,
    out: &mut impl Write,
) -> Result<()> {
    let currency = &context.settings.currency;
    let tasks = context.storage.get_data_for::<TaskRecord>(date).await?;
    let finance = context.storage.get_data_for::<FinanceRecord>(date).await?;
    let (previous_tasks, previous_finance) = match date.pred_opt() {
        Some(previous) => (
            context.storage.get_data_for::<TaskRecord>(previous).await?,
            context.storage.get_data_for::<FinanceRecord>(previous).await?,
        ),
        None => (vec![], vec![]),
    };

    let task_summary = summarize_tasks(&tasks);
    let finance_summary = summarize_finance(&finance);

    writeln!(out, "{}", context.settings.persona)?;
    writeln!(out)?;
    writeln!(out, "Task statistics for {date}:")?;
    writeln!(out, "- Total tasks: {}", task_summary.total)?;
    writeln!(
        out,
        "- Completion rate: {}",
        Percentage::from_rate(task_summary.completion_rate)
    )?;
    writeln!(out, "- Total time: {}", minutes(task_summary.total_time))?;
    writeln!(out, "- Efficiency score: {:.2}", task_summary.efficiency_score)?;
    writeln!(out)?;
    writeln!(out, "Finance statistics for {date}:")?;
    writeln!(out, "- Income: {}", money(currency, finance_summary.total_income))?;
    writeln!(out, "- Expense: {}", money(currency, finance_summary.total_expense))?;
    writeln!(out, "- Balance: {}", money(currency, finance_summary.net_balance))?;
    writeln!(
        out,
        "- Average daily expense: {}",
        money(currency, finance_summary.avg_daily_expense)
    )?;

    for (title, tasks, finance) in [
        ("Yesterday", &previous_tasks, &previous_finance),
        ("Today", &tasks, &finance),
    ] {
        writeln!(out)?;
        writeln!(out, "{title} tasks:")?;
        if tasks.is_empty() {
            writeln!(out, "No tasks")?;
        }
        for task in tasks {
            writeln!(out, "{}", task_details(task))?;
        }
        writeln!(out)?;
        writeln!(out, "{title} finance:")?;
        if finance.is_empty() {
            writeln!(out, "No records")?;
        }
        for record in finance {
            writeln!(out, "{}", finance_details(record, currency))?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "Review my day: compare it with yesterday, point out where time and money leaked, and give me three concrete actions for tomorrow."
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
    use tempfile::tempdir;

    use crate::{
        cli::test_context::{at, output},
        records::{
            entities::{EntryKind, FinanceRecord, TaskRecord, Urgency},
            record_storage::RecordStorage,
        },
        utils::{logging::TEST_LOGGING, time::Period},
    };

    use super::{process_report_command, ReportCommand};

    const TEST_NOW: NaiveDateTime = NaiveDateTime::new(
        NaiveDate::from_ymd_opt(2024, 4, 5).unwrap(),
        NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
    );

    fn at_hour(date: NaiveDate, hour: u32) -> NaiveDateTime {
        date.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap())
    }

    /// Two days of records: a finished and a pending task with an expense today, one finished
    /// task and an income yesterday.
    async fn seed(storage: &impl RecordStorage) -> Result<()> {
        let today = TEST_NOW.date();
        let yesterday = today.pred_opt().unwrap();

        let mut done = TaskRecord::started("write", "work", Urgency::High, 30., at_hour(today, 9));
        done.complete(at_hour(today, 9) + Duration::minutes(30))?;
        let pending = TaskRecord::started("read", "study", Urgency::Low, 60., at_hour(today, 14));
        storage.replace_day(today, &[done, pending]).await?;
        storage
            .append(
                today,
                &FinanceRecord::new(EntryKind::Expense, 40., "shopping", at_hour(today, 12)),
            )
            .await?;

        let mut old = TaskRecord::started("plan", "work", Urgency::Medium, 20., at_hour(yesterday, 10));
        old.complete(at_hour(yesterday, 10) + Duration::minutes(20))?;
        storage.append(yesterday, &old).await?;
        storage
            .append(
                yesterday,
                &FinanceRecord::new(EntryKind::Income, 200., "salary", at_hour(yesterday, 8)),
            )
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_summary_week() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let context = at(dir.path(), TEST_NOW);
        seed(&context.storage).await?;

        let mut out = vec![];
        process_report_command(
            ReportCommand::Summary {
                date: None,
                period: Period::Week,
            },
            &context,
            &mut out,
        )
        .await?;
        let out = output(out);
        assert!(out.contains("Summary for 2024-04-01 - 2024-04-07"));
        assert!(out.contains("completed\t2/3 (66.7%)"));
        assert!(out.contains("balance\tRM160.00"));
        assert!(out.contains("- shopping\tRM40.00"));
        Ok(())
    }

    #[tokio::test]
    async fn test_analyze() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let context = at(dir.path(), TEST_NOW);
        seed(&context.storage).await?;

        let mut out = vec![];
        process_report_command(ReportCommand::Analyze { date: None }, &context, &mut out).await?;
        let out = output(out);
        assert!(out.contains("1/2 completed (50.0%)"));
        assert!(out.contains("09:00\t#"));
        assert!(out.contains("pomodoro"));
        assert!(out.contains("around 09:00"));
        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let context = at(dir.path(), TEST_NOW);
        seed(&context.storage).await?;

        let mut out = vec![];
        process_report_command(
            ReportCommand::Dashboard {
                date: None,
                period: Period::Day,
            },
            &context,
            &mut out,
        )
        .await?;
        // completion 0.5 -> 20, pace 1 -> 30, base 15, the only high urgency task is completed -> 15
        assert!(output(out).contains("score\t80/100"));
        Ok(())
    }

    #[tokio::test]
    async fn test_validate() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let context = at(dir.path(), TEST_NOW);
        seed(&context.storage).await?;

        let mut out = vec![];
        process_report_command(
            ReportCommand::Validate {
                date: None,
                period: Period::Month,
            },
            &context,
            &mut out,
        )
        .await?;
        assert!(output(out).contains("No issues found in 2024-04-01 - 2024-04-30"));

        let broken = TaskRecord {
            description: "ghost".into(),
            completed: true,
            ..Default::default()
        };
        context.storage.append(TEST_NOW.date(), &broken).await?;

        let mut out = vec![];
        process_report_command(
            ReportCommand::Validate {
                date: None,
                period: Period::Day,
            },
            &context,
            &mut out,
        )
        .await?;
        assert_eq!(
            output(out),
            "2024-04-05 #3 ghost: marked as completed without a completion time\n"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_prompt() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let context = at(dir.path(), TEST_NOW);
        seed(&context.storage).await?;

        let mut out = vec![];
        process_report_command(ReportCommand::Prompt { date: None }, &context, &mut out).await?;
        let out = output(out);

        assert!(out.starts_with(&context.settings.persona));
        assert!(out.contains("- Total tasks: 2"));
        assert!(out.contains("- Completion rate: 50.0%"));
        assert!(out.contains("- Expense: RM40.00"));
        assert!(out.contains("- Average daily expense: RM40.00"));

        let yesterday = out.find("Yesterday tasks:").unwrap();
        let today = out.find("Today tasks:").unwrap();
        assert!(yesterday < today);
        assert!(out[yesterday..today].contains("Task: plan"));
        assert!(out[yesterday..today].contains("Type: income | Amount: RM200.00"));
        assert!(out[today..].contains("Task: read | Category: study | Status: not completed"));
        Ok(())
    }
}
