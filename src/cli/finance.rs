use std::io::Write;

use anyhow::Result;
use clap::Subcommand;
use tracing::info;

use crate::{
    engine::finance::{total_expense, total_income},
    records::{
        entities::{EntryKind, FinanceRecord},
        record_storage::RecordStorage,
    },
    utils::clock::Clock,
};

use super::{
    date::DATE_HELP,
    format::{finance_row, money},
    invalid_value, position_to_index, CommandContext,
};

#[derive(Debug, Subcommand)]
pub enum FinanceCommand {
    #[command(about = "Record an income or an expense")]
    Add {
        #[arg(value_enum)]
        kind: EntryKind,
        amount: f64,
        #[arg(short, long, default_value = "other")]
        category: String,
        #[arg(short, long = "payment", default_value = "cash")]
        payment_method: String,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long, help = DATE_HELP)]
        date: Option<String>,
    },
    #[command(about = "Remove a record")]
    Rm {
        position: usize,
        #[arg(long, help = DATE_HELP)]
        date: Option<String>,
    },
    #[command(about = "List records of a day")]
    List {
        #[arg(long, help = DATE_HELP)]
        date: Option<String>,
    },
}

pub async fn process_finance_command<S: RecordStorage, C: Clock>(
    command: FinanceCommand,
    context: &CommandContext<S, C>,
    out: &mut impl Write,
) -> Result<()> {
    let currency = &context.settings.currency;
    match command {
        FinanceCommand::Add {
            kind,
            amount,
            category,
            payment_method,
            notes,
            date,
        } => {
            if !amount.is_finite() || amount <= 0. {
                return Err(invalid_value(format!(
                    "Amount should be greater than 0, got {amount}"
                )));
            }
            let date = context.day(date.as_deref())?;

            let mut record = FinanceRecord::new(kind, amount, category, context.clock.now());
            record.date = Some(date);
            record.payment_method = payment_method;
            record.notes = notes.unwrap_or_default();

            context.storage.append(date, &record).await?;
            info!("Added {kind} of {amount} for {date}");
            writeln!(out, "Recorded {kind} of {}", money(currency, amount))?;
        }
        FinanceCommand::Rm { position, date } => {
            let date = context.day(date.as_deref())?;
            let mut records = context.storage.get_data_for::<FinanceRecord>(date).await?;
            let index = position_to_index(position, records.len())?;

            let removed = records.remove(index);
            context.storage.replace_day(date, &records).await?;
            info!("Removed finance record {position} from {date}");
            writeln!(
                out,
                "Removed #{position} {}",
                money(currency, removed.amount)
            )?;
        }
        FinanceCommand::List { date } => {
            let date = context.day(date.as_deref())?;
            let records = context.storage.get_data_for::<FinanceRecord>(date).await?;
            if records.is_empty() {
                writeln!(out, "No finance records for {date}")?;
                return Ok(());
            }
            for (index, record) in records.iter().enumerate() {
                writeln!(out, "{}", finance_row(index + 1, record, currency))?;
            }
            writeln!(
                out,
                "Income {}, expense {}",
                money(currency, total_income(&records)),
                money(currency, total_expense(&records))
            )?;
        }
    }
    Ok(())
}
