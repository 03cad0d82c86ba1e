use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
    Cancelled,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid task status: {0}")]
pub struct ParseTaskStatusError(String);

impl FromStr for TaskStatus {
    type Err = ParseTaskStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "completed" => Ok(TaskStatus::Completed),
            "cancelled" => Ok(TaskStatus::Cancelled),
            _ => Err(ParseTaskStatusError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    None,
    Low,
    Medium,
    High,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid task priority: {0}")]
pub struct ParseTaskPriorityError(String);

impl FromStr for TaskPriority {
    type Err = ParseTaskPriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(TaskPriority::None),
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => Err(ParseTaskPriorityError(s.to_string())),
        }
    }
}

/// Selects the reference date for the next occurrence of a recurring task:
/// the task's due date, or its actual completion timestamp.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RecurringMode {
    DueDate,
    CompletedAt,
}

impl Default for RecurringMode {
    fn default() -> Self {
        RecurringMode::DueDate
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid recurring mode: {0}")]
pub struct ParseRecurringModeError(String);

impl FromStr for RecurringMode {
    type Err = ParseRecurringModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dueDate" => Ok(RecurringMode::DueDate),
            "completedAt" => Ok(RecurringMode::CompletedAt),
            _ => Err(ParseRecurringModeError(s.to_string())),
        }
    }
}

/// Recurrence frequency. A closed set: the calculator and matcher match on
/// it exhaustively, so an unhandled frequency is a compile error rather than
/// a silently skipped branch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid frequency: {0}")]
pub struct ParseFrequencyError(String);

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    // Exact uppercase tokens only. Anything else leaves FREQ unset and the
    // whole rule unparseable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            _ => Err(ParseFrequencyError(s.to_string())),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::Daily => write!(f, "DAILY"),
            Frequency::Weekly => write!(f, "WEEKLY"),
            Frequency::Monthly => write!(f, "MONTHLY"),
            Frequency::Yearly => write!(f, "YEARLY"),
        }
    }
}

/// A parsed recurrence rule. Immutable value: derived fresh from a task's
/// `recurring` string on every calculation, never cached or edited in place.
///
/// `until` and `by_day` are kept as raw tokens; both are validated at the
/// point of use, not at parse time. `by_set_pos` is parsed but never
/// consulted by the calculator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// Gap between occurrences in units of `frequency`. Always positive.
    pub interval: u32,
    /// Occurrences remaining, inclusive of the current one.
    pub count: Option<u32>,
    /// Raw 8-character `YYYYMMDD` token, inclusive upper bound.
    pub until: Option<String>,
    /// Raw 2-letter weekday tokens (`SU`..`SA`).
    pub by_day: Vec<String>,
    /// Days of month, 1-31, or -1 for the last day of the month.
    pub by_month_day: Vec<i32>,
    /// Months, 1-12.
    pub by_month: Vec<u32>,
    /// Parsed for round-tripping only; the calculator does not apply it.
    pub by_set_pos: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
}

/// A task record as the engine sees it. Only the recurrence-relevant fields
/// are interpreted; everything else is copied verbatim onto the next
/// instance. The engine never mutates a task it was given.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub project_id: Option<Uuid>,
    pub labels: Vec<String>,
    /// Raw recurrence rule string (`RRULE:...`), if the task recurs.
    pub recurring: Option<String>,
    #[serde(default)]
    pub recurring_mode: RecurringMode,
    pub subtasks: Vec<Subtask>,
    /// Opaque payloads passed through to the next instance uninterpreted.
    #[serde(default)]
    pub attachments: Vec<serde_json::Value>,
    #[serde(default)]
    pub comments: Vec<serde_json::Value>,
}

impl Default for Task {
    fn default() -> Self {
        Self {
            id: Uuid::now_v7(),
            title: "".to_string(),
            description: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::None,
            due_date: None,
            completed_at: None,
            created_at: Utc::now(),
            project_id: None,
            labels: Vec::new(),
            recurring: None,
            recurring_mode: RecurringMode::DueDate,
            subtasks: Vec::new(),
            attachments: Vec::new(),
            comments: Vec::new(),
        }
    }
}
