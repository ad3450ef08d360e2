use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::Frequency;
use uuid::Uuid;

/// Domain model of a recurring care task.
///
/// `next_date` is a canonical `YYYY-MM-DD` string, the sole comparison key
/// for scheduling. `completed` means "acknowledged but not yet rolled over",
/// never "retired": completion resets it to false with a new `next_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub pet_id: String,
    pub name: String,
    pub frequency: Frequency,
    /// Resolved recurrence interval in days, always > 0
    pub frequency_days: u32,
    pub next_date: String,
    pub time: Option<String>,
    pub last_completed: Option<DateTime<Utc>>,
    pub color: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Where a task sits in its due cycle relative to a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Past due and still unacknowledged
    Overdue,
    /// Due on the given day
    DueToday,
    /// Due after the given day
    Upcoming,
    /// `completed == true`: acknowledged, excluded from pending projections
    Acknowledged,
}

impl Task {
    /// Generate a unique ID for a task
    pub fn generate_id() -> String {
        format!("task::{}", Uuid::new_v4())
    }

    /// A task is pending until its completion is acknowledged, regardless of
    /// how far in the past its due date lies.
    pub fn is_pending(&self) -> bool {
        !self.completed
    }

    /// Derive the task's status for the given canonical date. Lexicographic
    /// comparison is valid because both sides are zero-padded `YYYY-MM-DD`.
    pub fn status(&self, today: &str) -> TaskStatus {
        if self.completed {
            TaskStatus::Acknowledged
        } else if self.next_date.as_str() < today {
            TaskStatus::Overdue
        } else if self.next_date == today {
            TaskStatus::DueToday
        } else {
            TaskStatus::Upcoming
        }
    }
}

impl From<Task> for shared::Task {
    fn from(task: Task) -> Self {
        shared::Task {
            id: task.id,
            pet_id: task.pet_id,
            name: task.name,
            frequency: task.frequency,
            frequency_days: task.frequency_days,
            next_date: task.next_date,
            time: task.time,
            last_completed: task.last_completed.map(|t| t.to_rfc3339()),
            color: task.color,
            completed: task.completed,
            created_at: task.created_at.to_rfc3339(),
        }
    }
}
