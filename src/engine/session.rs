use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::percentage::round_to;

pub const POMODORO_MINUTES: u32 = 25;
pub const DEEP_WORK_MINUTES: u32 = 90;
/// Finished sessions kept in the history, oldest are dropped first.
pub const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusKind {
    Pomodoro,
    DeepWork,
}

impl FocusKind {
    pub fn default_minutes(self) -> u32 {
        match self {
            FocusKind::Pomodoro => POMODORO_MINUTES,
            FocusKind::DeepWork => DEEP_WORK_MINUTES,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("a focus session is already running")]
    AlreadyActive,
    #[error("no focus session is running")]
    NotActive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSession {
    pub kind: FocusKind,
    pub started_at: NaiveDateTime,
    pub planned_minutes: u32,
}

impl ActiveSession {
    pub fn ends_at(&self) -> NaiveDateTime {
        self.started_at + Duration::minutes(self.planned_minutes as i64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishedSession {
    pub kind: FocusKind,
    pub started_at: NaiveDateTime,
    pub ended_at: NaiveDateTime,
    pub planned_minutes: u32,
    pub actual_minutes: f64,
}

/// At most one running focus session plus the history of finished ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FocusTimer {
    #[serde(default)]
    active: Option<ActiveSession>,
    #[serde(default)]
    history: Vec<FinishedSession>,
}

impl FocusTimer {
    /// Starts a session of `kind`, lasting `minutes` or the kind's default length.
    pub fn start(
        &mut self,
        kind: FocusKind,
        minutes: Option<u32>,
        now: NaiveDateTime,
    ) -> Result<&ActiveSession, SessionError> {
        if self.active.is_some() {
            return Err(SessionError::AlreadyActive);
        }
        Ok(&*self.active.insert(ActiveSession {
            kind,
            started_at: now,
            planned_minutes: minutes.unwrap_or(kind.default_minutes()),
        }))
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    pub fn history(&self) -> &[FinishedSession] {
        &self.history
    }

    /// Time left in the running session. Never negative.
    pub fn remaining(&self, now: NaiveDateTime) -> Result<Duration, SessionError> {
        let active = self.active.as_ref().ok_or(SessionError::NotActive)?;
        Ok((active.ends_at() - now).max(Duration::zero()))
    }

    /// Ends the running session, whether or not its planned time is up.
    pub fn finish(&mut self, now: NaiveDateTime) -> Result<&FinishedSession, SessionError> {
        let active = self.active.take().ok_or(SessionError::NotActive)?;
        let elapsed = (now - active.started_at).num_seconds().max(0) as f64;

        self.history.push(FinishedSession {
            kind: active.kind,
            started_at: active.started_at,
            ended_at: now,
            planned_minutes: active.planned_minutes,
            actual_minutes: round_to(elapsed / 60., 1),
        });
        if self.history.len() > HISTORY_LIMIT {
            self.history.drain(..self.history.len() - HISTORY_LIMIT);
        }
        Ok(&self.history[self.history.len() - 1])
    }
}
