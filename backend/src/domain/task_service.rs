use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::sync::Arc;

use crate::domain::commands::tasks::{
    CompleteTaskCommand, CompleteTaskResult, CreateTaskCommand, CreateTaskResult, DeleteTaskCommand,
    DeleteTaskResult, ListTasksResult,
};
use crate::domain::dates;
use crate::domain::models::{Task as DomainTask, TaskStatus};
use crate::domain::user_service::UserService;
use crate::storage::csv::{CsvConnection, PetRepository, TaskRepository};
use crate::storage::traits::{PetStorage, TaskStorage};
use shared::{CareHistory, DashboardSummary, Frequency};

/// Resolve a frequency category to its recurrence interval in days.
///
/// An explicit per-task override wins when positive. Monthly is a fixed
/// 30-day approximation, deliberately not calendar-month arithmetic. An
/// unrecognized combination falls back to 1 so a task can never stall.
pub fn resolve_frequency_days(frequency: Frequency, explicit: Option<u32>) -> u32 {
    if let Some(days) = explicit {
        if days > 0 {
            return days;
        }
    }

    match frequency {
        Frequency::Daily => 1,
        Frequency::Weekly => 7,
        Frequency::Monthly => 30,
        _ => 1,
    }
}

/// Service for managing recurring care tasks and their completion lifecycle
#[derive(Clone)]
pub struct TaskService {
    task_repository: TaskRepository,
    pet_repository: PetRepository,
    user_service: UserService,
}

impl TaskService {
    /// Create a new TaskService
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            task_repository: TaskRepository::new(csv_conn.clone()),
            pet_repository: PetRepository::new(csv_conn.clone()),
            user_service: UserService::new(csv_conn),
        }
    }

    /// Create a new recurring task
    pub fn create_task(&self, command: CreateTaskCommand) -> Result<CreateTaskResult> {
        info!("Creating task: name={}, pet={}", command.name, command.pet_id);

        if command.name.trim().is_empty() {
            return Err(anyhow::anyhow!("Task name cannot be empty"));
        }

        let user_id = self.user_service.resolve_user_id(command.user_id)?;

        // The pet reference must exist before anything is written
        if self.pet_repository.get_pet(&user_id, &command.pet_id)?.is_none() {
            return Err(anyhow::anyhow!("Pet not found: {}", command.pet_id));
        }

        let task = DomainTask {
            id: DomainTask::generate_id(),
            pet_id: command.pet_id,
            name: command.name.trim().to_string(),
            frequency: command.frequency,
            frequency_days: resolve_frequency_days(command.frequency, command.frequency_days),
            next_date: dates::to_calendar_date(&command.next_date),
            time: command.time,
            last_completed: None,
            color: command.color,
            completed: false,
            created_at: Utc::now(),
        };

        self.task_repository.store_task(&user_id, &task)?;

        info!("Created task: {} with ID: {}", task.name, task.id);

        Ok(CreateTaskResult { task })
    }

    /// List all tasks
    pub fn list_tasks(&self, user_id: Option<String>) -> Result<ListTasksResult> {
        let user_id = self.user_service.resolve_user_id(user_id)?;
        let tasks = self.task_repository.list_tasks(&user_id)?;
        Ok(ListTasksResult { tasks })
    }

    /// Acknowledge a task's current occurrence and roll it over to its next
    /// due date. The sole state change a task undergoes besides create and
    /// delete.
    pub fn complete_task(&self, command: CompleteTaskCommand) -> Result<CompleteTaskResult> {
        info!("Completing task: {}", command.task_id);

        let user_id = self.user_service.resolve_user_id(command.user_id)?;

        let task = self
            .task_repository
            .get_task(&user_id, &command.task_id)?
            .ok_or_else(|| anyhow::anyhow!("Task not found: {}", command.task_id))?;

        let task = rollover(task, &dates::today(), Utc::now())?;
        self.task_repository.update_task(&user_id, &task)?;

        info!("Completed task {}: next due {}", task.id, task.next_date);

        Ok(CompleteTaskResult { task })
    }

    /// Delete a task
    pub fn delete_task(&self, command: DeleteTaskCommand) -> Result<DeleteTaskResult> {
        info!("Deleting task: {}", command.task_id);

        let user_id = self.user_service.resolve_user_id(command.user_id)?;

        if !self.task_repository.delete_task(&user_id, &command.task_id)? {
            warn!("Attempted to delete a non-existent task: {}", command.task_id);
            return Err(anyhow::anyhow!("Task not found: {}", command.task_id));
        }

        Ok(DeleteTaskResult {
            success_message: "Task deleted successfully".to_string(),
        })
    }

    /// Dashboard counters for the current day
    pub fn dashboard_summary(&self, user_id: Option<String>) -> Result<DashboardSummary> {
        let user_id = self.user_service.resolve_user_id(user_id)?;
        let tasks = self.task_repository.list_tasks(&user_id)?;
        let pet_count = self.pet_repository.list_pets(&user_id)?.len();
        Ok(summarize_dashboard(&tasks, pet_count, &dates::today()))
    }

    /// Care history projection: completion counters plus recent completions
    pub fn care_history(&self, user_id: Option<String>) -> Result<CareHistory> {
        let user_id = self.user_service.resolve_user_id(user_id)?;
        let tasks = self.task_repository.list_tasks(&user_id)?;
        Ok(summarize_history(&tasks))
    }
}

/// Apply a completion to a task: stamp it, and schedule the next occurrence
/// `frequency_days` after the real current date. Basing the rollover on
/// `today` rather than the stored due date keeps a long-overdue task from
/// generating a backlog of already-past occurrences.
fn rollover(mut task: DomainTask, today: &str, now: DateTime<Utc>) -> Result<DomainTask> {
    let next_date = dates::add_days(today, task.frequency_days as i64)
        .ok_or_else(|| anyhow::anyhow!("Cannot compute next due date from '{}'", today))?;

    task.next_date = next_date;
    task.last_completed = Some(now);
    task.completed = false;
    Ok(task)
}

/// Count pending, overdue and due-today tasks for the dashboard
fn summarize_dashboard(tasks: &[DomainTask], pet_count: usize, today: &str) -> DashboardSummary {
    let pending: Vec<&DomainTask> = tasks.iter().filter(|t| t.is_pending()).collect();
    DashboardSummary {
        active_tasks: pending.len(),
        overdue_tasks: pending.iter().filter(|t| t.status(today) == TaskStatus::Overdue).count(),
        due_today: pending.iter().filter(|t| t.status(today) == TaskStatus::DueToday).count(),
        pet_count,
    }
}

/// Completion counters over the whole task collection. A task counts as
/// completed once it carries a completion stamp; the `completed` flag itself
/// resets on every rollover.
fn summarize_history(tasks: &[DomainTask]) -> CareHistory {
    let total_count = tasks.len();
    let mut recent: Vec<&DomainTask> = tasks.iter().filter(|t| t.last_completed.is_some()).collect();
    recent.sort_by(|a, b| b.last_completed.cmp(&a.last_completed));

    let completed_count = recent.len();
    let completion_rate = if total_count == 0 {
        0
    } else {
        ((completed_count as f64 / total_count as f64) * 100.0).round() as u32
    };

    CareHistory {
        completed_count,
        total_count,
        completion_rate,
        recent: recent.into_iter().map(|t| t.clone().into()).collect(),
    }
}
