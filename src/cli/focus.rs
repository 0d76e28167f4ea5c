use std::{io::ErrorKind, io::Write, path::Path};

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::{debug, info};

use crate::{
    engine::session::{FocusKind, FocusTimer},
    utils::clock::Clock,
};

use super::{format::minutes, invalid_value, CommandContext};

pub const FOCUS_FILE: &str = "focus.json";

#[derive(Debug, Subcommand)]
pub enum FocusCommand {
    #[command(about = "Start a focus session. A pomodoro unless --deep is given")]
    Start {
        #[arg(long, help = "Deep work session of 90 minutes")]
        deep: bool,
        #[arg(long, help = "Length of the session in minutes")]
        minutes: Option<u32>,
    },
    #[command(about = "Show the running session")]
    Status,
    #[command(about = "Finish the running session")]
    Stop,
}

/// Timer state is kept between invocations in [FOCUS_FILE].
pub fn load_timer(app_dir: &Path) -> Result<FocusTimer> {
    let path = app_dir.join(FOCUS_FILE);
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse focus state in {path:?}")),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No focus state at {path:?}");
            Ok(FocusTimer::default())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to read {path:?}")),
    }
}

pub fn save_timer(app_dir: &Path, timer: &FocusTimer) -> Result<()> {
    let path = app_dir.join(FOCUS_FILE);
    std::fs::write(&path, serde_json::to_string(timer)?)
        .with_context(|| format!("Failed to write {path:?}"))
}

pub fn process_focus_command<S, C: Clock>(
    command: FocusCommand,
    context: &CommandContext<S, C>,
    out: &mut impl Write,
) -> Result<()> {
    let mut timer = load_timer(&context.app_dir)?;
    let now = context.clock.now();

    match command {
        FocusCommand::Start { deep, minutes } => {
            if minutes == Some(0) {
                return Err(invalid_value(
                    "Session length should be at least 1 minute".into(),
                ));
            }
            let kind = if deep {
                FocusKind::DeepWork
            } else {
                FocusKind::Pomodoro
            };
            let session = timer.start(kind, minutes, now)?;
            info!("Started {kind:?} session for {} minutes", session.planned_minutes);
            writeln!(
                out,
                "Started a {} minute {} session, ends at {}",
                session.planned_minutes,
                kind_name(kind),
                session.ends_at().format("%H:%M")
            )?;
            save_timer(&context.app_dir, &timer)?;
        }
        FocusCommand::Status => match timer.active() {
            Some(session) => {
                let remaining = timer.remaining(now)?;
                if remaining.is_zero() {
                    writeln!(
                        out,
                        "The {} session is over, run `focus stop` and take a break",
                        kind_name(session.kind)
                    )?;
                } else {
                    writeln!(
                        out,
                        "{} session, {:02}:{:02} left",
                        kind_name(session.kind),
                        remaining.num_minutes(),
                        remaining.num_seconds() % 60
                    )?;
                }
            }
            None => {
                writeln!(
                    out,
                    "No session running, {} finished so far",
                    timer.history().len()
                )?;
            }
        },
        FocusCommand::Stop => {
            let finished = timer.finish(now)?;
            info!("Finished {:?} session", finished.kind);
            writeln!(
                out,
                "Finished the {} session after {} of {} planned",
                kind_name(finished.kind),
                minutes(finished.actual_minutes),
                finished.planned_minutes
            )?;
            save_timer(&context.app_dir, &timer)?;
        }
    }
    Ok(())
}

fn kind_name(kind: FocusKind) -> &'static str {
    match kind {
        FocusKind::Pomodoro => "pomodoro",
        FocusKind::DeepWork => "deep work",
    }
}
