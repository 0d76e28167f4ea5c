use std::fmt::Display;

use chrono::{NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Implemented by every kind of record that gets stored in day files. `KIND` is used as the name
/// of the directory holding the day files.
pub trait Record: Serialize + DeserializeOwned + Send + 'static {
    const KIND: &'static str;
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

impl Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Urgency::Low => write!(f, "low"),
            Urgency::Medium => write!(f, "medium"),
            Urgency::High => write!(f, "high"),
        }
    }
}

/// Label given to a task once it is completed. Derived from how long the task took compared to
/// its estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Excellent,
    Good,
    NeedsImprovement,
}

impl Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rating::Excellent => write!(f, "excellent"),
            Rating::Good => write!(f, "good"),
            Rating::NeedsImprovement => write!(f, "needs improvement"),
        }
    }
}

/// A single unit of tracked work.
///
/// Every field is optional on disk. Values that are missing or can't be interpreted fall back
/// to a default instead of failing the whole file: `false` for flags, `0` for numbers, empty
/// text and no date/timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(default, deserialize_with = "lenient::date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub notes: String,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub completed: bool,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub started_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub completed_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub elapsed_seconds: f64,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub rating: Option<Rating>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub urgency: Urgency,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub estimated_minutes: f64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub actual_minutes: f64,
}

impl TaskRecord {
    /// Creates a pending task whose timer starts at `started_at`.
    pub fn started(
        description: impl Into<String>,
        category: impl Into<String>,
        urgency: Urgency,
        estimated_minutes: f64,
        started_at: NaiveDateTime,
    ) -> Self {
        Self {
            date: Some(started_at.date()),
            created_at: Some(started_at),
            description: description.into(),
            category: category.into(),
            started_at: Some(started_at),
            urgency,
            estimated_minutes: estimated_minutes.max(0.),
            ..Default::default()
        }
    }

    /// Minutes spent on the task. Actual minutes take precedence, elapsed seconds are used when
    /// actual minutes were never filled in.
    pub fn duration_minutes(&self) -> f64 {
        if self.actual_minutes > 0. {
            self.actual_minutes
        } else {
            self.elapsed_seconds / 60.
        }
    }
}

impl Record for TaskRecord {
    const KIND: &'static str = "tasks";
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Income,
    Expense,
}

impl Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::Income => write!(f, "income"),
            EntryKind::Expense => write!(f, "expense"),
        }
    }
}

/// One income or expense transaction. Defaults follow the same rules as [TaskRecord]. An entry
/// with an unknown kind is kept but counts neither as income nor as expense.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinanceRecord {
    #[serde(default, deserialize_with = "lenient::date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(rename = "type", default, deserialize_with = "lenient::or_default")]
    pub kind: Option<EntryKind>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub notes: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub payment_method: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub category: String,
}

impl FinanceRecord {
    pub fn new(
        kind: EntryKind,
        amount: f64,
        category: impl Into<String>,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            date: Some(created_at.date()),
            created_at: Some(created_at),
            kind: Some(kind),
            amount: amount.max(0.),
            category: category.into(),
            ..Default::default()
        }
    }

    pub fn is_expense(&self) -> bool {
        self.kind == Some(EntryKind::Expense)
    }

    pub fn is_income(&self) -> bool {
        self.kind == Some(EntryKind::Income)
    }
}

impl Record for FinanceRecord {
    const KIND: &'static str = "finance";
}

/// Deserializers that never fail. Records are often edited by hand, so a single bad value
/// shouldn't make the rest of the record unreadable.
mod lenient {
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::{de::DeserializeOwned, Deserialize, Deserializer};
    use serde_json::Value;

    const DATE_FORMAT: &str = "%Y-%m-%d";
    const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

    pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(T::deserialize(value).unwrap_or_default())
    }

    pub fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(number.filter(|v| v.is_finite() && *v >= 0.).unwrap_or(0.))
    }

    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Bool(v) => v,
            Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"),
            Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.),
            _ => false,
        })
    }

    pub fn date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()))
    }

    pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().and_then(|s| {
            TIMESTAMP_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(s.trim(), format).ok())
        }))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{NaiveDate, NaiveTime};

    use super::{EntryKind, FinanceRecord, Rating, TaskRecord, Urgency};

    #[test]
    fn test_task_missing_fields_default() -> Result<()> {
        let task: TaskRecord = serde_json::from_str(r#"{"description": "write report"}"#)?;

        assert_eq!(task.description, "write report");
        assert!(!task.completed);
        assert_eq!(task.estimated_minutes, 0.);
        assert_eq!(task.urgency, Urgency::Medium);
        assert_eq!(task.rating, None);
        assert_eq!(task.date, None);
        Ok(())
    }

    #[test]
    fn test_task_malformed_values_default() -> Result<()> {
        let task: TaskRecord = serde_json::from_str(
            r#"{
                "date": "not a date",
                "completed": "True",
                "started_at": "2024-04-05 09:30:00",
                "completed_at": 17,
                "estimated_minutes": "45",
                "actual_minutes": "soon",
                "elapsed_seconds": -5,
                "urgency": "whenever",
                "rating": "fantastic"
            }"#,
        )?;

        assert_eq!(task.date, None);
        assert!(task.completed);
        assert_eq!(
            task.started_at,
            Some(NaiveDate::from_ymd_opt(2024, 4, 5).unwrap().and_hms_opt(9, 30, 0).unwrap())
        );
        assert_eq!(task.completed_at, None);
        assert_eq!(task.estimated_minutes, 45.);
        assert_eq!(task.actual_minutes, 0.);
        assert_eq!(task.elapsed_seconds, 0.);
        assert_eq!(task.urgency, Urgency::Medium);
        assert_eq!(task.rating, None);
        Ok(())
    }

    #[test]
    fn test_task_survives_serialization() -> Result<()> {
        let start = NaiveDate::from_ymd_opt(2024, 4, 5)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        let mut task = TaskRecord::started("read", "study", Urgency::High, 30., start);
        task.rating = Some(Rating::NeedsImprovement);

        let restored: TaskRecord = serde_json::from_str(&serde_json::to_string(&task)?)?;
        assert_eq!(restored, task);
        Ok(())
    }

    #[test]
    fn test_duration_prefers_actual_minutes() {
        let mut task = TaskRecord {
            elapsed_seconds: 600.,
            ..Default::default()
        };
        assert_eq!(task.duration_minutes(), 10.);

        task.actual_minutes = 12.5;
        assert_eq!(task.duration_minutes(), 12.5);
    }

    #[test]
    fn test_finance_unknown_kind_is_kept() -> Result<()> {
        let record: FinanceRecord =
            serde_json::from_str(r#"{"type": "refund", "amount": "12.5", "category": "food"}"#)?;
        assert_eq!(record.kind, None);
        assert_eq!(record.amount, 12.5);
        assert!(!record.is_expense());
        assert!(!record.is_income());

        let record: FinanceRecord = serde_json::from_str(r#"{"type": "expense", "amount": 3}"#)?;
        assert_eq!(record.kind, Some(EntryKind::Expense));
        Ok(())
    }
}
