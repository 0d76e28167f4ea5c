pub mod date;
pub mod finance;
pub mod focus;
pub mod format;
pub mod report;
pub mod task;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use date::{parse_day, DateStyle};
use finance::{process_finance_command, FinanceCommand};
use focus::{process_focus_command, FocusCommand};
use report::{process_report_command, ReportCommand};
use task::{process_task_command, TaskCommand};
use tracing::level_filters::LevelFilter;

use crate::{
    records::record_storage::RecordStorageImpl,
    utils::{
        clock::{Clock, DefaultClock},
        config::Settings,
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, LOG_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Daytally", version, long_about = None)]
#[command(about = "Daily task and money tracker", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Start, complete and list tasks")]
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
    #[command(about = "Record and list income and expenses")]
    Finance {
        #[command(subcommand)]
        command: FinanceCommand,
    },
    #[command(flatten)]
    Report(ReportCommand),
    #[command(about = "Pomodoro and deep work timer")]
    Focus {
        #[command(subcommand)]
        command: FocusCommand,
    },
}

/// Everything a command needs apart from its own arguments.
pub struct CommandContext<S, C> {
    pub storage: S,
    pub clock: C,
    pub settings: Settings,
    pub app_dir: PathBuf,
    pub date_style: DateStyle,
}

impl<S, C: Clock> CommandContext<S, C> {
    /// Day given on the command line, today when absent.
    pub fn day(&self, input: Option<&str>) -> Result<NaiveDate> {
        parse_day(input, self.date_style, self.clock.now())
    }
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = match args.dir {
        Some(dir) => ensure_dir(dir)?,
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(LOG_PREFIX, &app_dir.join("logs"), logging_level, args.log)?;

    let context = CommandContext {
        storage: RecordStorageImpl::new(app_dir.join("records"))?,
        clock: DefaultClock,
        settings: Settings::load(&app_dir)?,
        app_dir,
        date_style: args.date_style,
    };
    let mut out = std::io::stdout().lock();

    match args.commands {
        Commands::Task { command } => process_task_command(command, &context, &mut out).await,
        Commands::Finance { command } => {
            process_finance_command(command, &context, &mut out).await
        }
        Commands::Report(command) => process_report_command(command, &context, &mut out).await,
        Commands::Focus { command } => process_focus_command(command, &context, &mut out),
    }
}

/// Converts a 1-based position shown to the user into an index of a day's records.
pub fn position_to_index(position: usize, len: usize) -> Result<usize> {
    if position == 0 || position > len {
        return Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("There is no record at position {position}, the day has {len}"),
            )
            .into());
    }
    Ok(position - 1)
}

/// Rejects values that clap can't validate by itself.
pub fn invalid_value(message: String) -> anyhow::Error {
    Args::command()
        .error(clap::error::ErrorKind::ValueValidation, message)
        .into()
}


#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::{position_to_index, Args};

    #[test]
    fn test_args_are_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_position_to_index() {
        assert_eq!(position_to_index(1, 3).unwrap(), 0);
        assert_eq!(position_to_index(3, 3).unwrap(), 2);
        assert!(position_to_index(0, 3).is_err());
        assert!(position_to_index(4, 3).is_err());
    }
}
