use anyhow::{Context, Result};
use csv::{Reader, Writer};
use log::warn;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::sync::Arc;

use super::connection::CsvConnection;
use crate::domain::models::Task;
use crate::storage::traits::TaskStorage;
use shared::Frequency;

const TASKS_FILE: &str = "tasks.csv";
const TASKS_HEADER: &str = "id,pet_id,name,frequency,frequency_days,next_date,time,last_completed,color,completed,created_at";

/// CSV-based task repository
#[derive(Clone)]
pub struct TaskRepository {
    connection: Arc<CsvConnection>,
}

fn frequency_to_str(frequency: Frequency) -> &'static str {
    match frequency {
        Frequency::Daily => "daily",
        Frequency::Weekly => "weekly",
        Frequency::Biweekly => "biweekly",
        Frequency::Monthly => "monthly",
        Frequency::Custom => "custom",
    }
}

fn parse_frequency(raw: &str) -> Frequency {
    match raw {
        "daily" => Frequency::Daily,
        "weekly" => Frequency::Weekly,
        "biweekly" => Frequency::Biweekly,
        "monthly" => Frequency::Monthly,
        "custom" => Frequency::Custom,
        other => {
            warn!("Unknown frequency '{}' in tasks file, treating as custom", other);
            Frequency::Custom
        }
    }
}

impl TaskRepository {
    /// Create a new CSV task repository
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self { connection }
    }

    /// Read all tasks for a user from their CSV file
    fn read_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        let file_path = self
            .connection
            .ensure_csv_file_exists(user_id, TASKS_FILE, TASKS_HEADER)?;

        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut tasks = Vec::new();

        for result in csv_reader.records() {
            let record = result?;

            let last_completed = match record.get(7).unwrap_or("") {
                "" => None,
                raw => Some(
                    chrono::DateTime::parse_from_rfc3339(raw)
                        .context("Failed to parse last_completed timestamp")?
                        .with_timezone(&chrono::Utc),
                ),
            };
            let created_at = chrono::DateTime::parse_from_rfc3339(record.get(10).unwrap_or(""))
                .context("Failed to parse created_at timestamp")?
                .with_timezone(&chrono::Utc);

            let task = Task {
                id: record.get(0).unwrap_or("").to_string(),
                pet_id: record.get(1).unwrap_or("").to_string(),
                name: record.get(2).unwrap_or("").to_string(),
                frequency: parse_frequency(record.get(3).unwrap_or("")),
                frequency_days: record.get(4).unwrap_or("1").parse::<u32>().unwrap_or(1).max(1),
                next_date: record.get(5).unwrap_or("").to_string(),
                time: match record.get(6).unwrap_or("") {
                    "" => None,
                    raw => Some(raw.to_string()),
                },
                last_completed,
                color: record.get(8).unwrap_or("").to_string(),
                completed: record.get(9).unwrap_or("false") == "true",
                created_at,
            };

            tasks.push(task);
        }

        Ok(tasks)
    }

    /// Write all tasks for a user to their CSV file
    fn write_tasks(&self, user_id: &str, tasks: &[Task]) -> Result<()> {
        let file_path = self
            .connection
            .ensure_csv_file_exists(user_id, TASKS_FILE, TASKS_HEADER)?;

        // Atomic write using temp file
        let temp_path = file_path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;

            let writer = BufWriter::new(file);
            let mut csv_writer = Writer::from_writer(writer);

            csv_writer.write_record(TASKS_HEADER.split(','))?;

            for task in tasks {
                csv_writer.write_record(&[
                    task.id.as_str(),
                    task.pet_id.as_str(),
                    task.name.as_str(),
                    frequency_to_str(task.frequency),
                    &task.frequency_days.to_string(),
                    task.next_date.as_str(),
                    task.time.as_deref().unwrap_or(""),
                    &task.last_completed.map(|t| t.to_rfc3339()).unwrap_or_default(),
                    task.color.as_str(),
                    if task.completed { "true" } else { "false" },
                    &task.created_at.to_rfc3339(),
                ])?;
            }

            csv_writer.flush()?;
        }

        std::fs::rename(&temp_path, &file_path)?;

        Ok(())
    }
}

impl TaskStorage for TaskRepository {
    fn store_task(&self, user_id: &str, task: &Task) -> Result<()> {
        let mut tasks = self.read_tasks(user_id)?;
        tasks.push(task.clone());
        self.write_tasks(user_id, &tasks)
    }

    fn get_task(&self, user_id: &str, task_id: &str) -> Result<Option<Task>> {
        let tasks = self.read_tasks(user_id)?;
        Ok(tasks.into_iter().find(|t| t.id == task_id))
    }

    fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        let mut tasks = self.read_tasks(user_id)?;
        tasks.sort_by(|a, b| a.next_date.cmp(&b.next_date));
        Ok(tasks)
    }

    fn update_task(&self, user_id: &str, task: &Task) -> Result<()> {
        let mut tasks = self.read_tasks(user_id)?;
        let slot = tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| anyhow::anyhow!("Task not found for update: {}", task.id))?;
        *slot = task.clone();
        self.write_tasks(user_id, &tasks)
    }

    fn delete_task(&self, user_id: &str, task_id: &str) -> Result<bool> {
        let mut tasks = self.read_tasks(user_id)?;
        let before = tasks.len();
        tasks.retain(|t| t.id != task_id);
        if tasks.len() == before {
            return Ok(false);
        }
        self.write_tasks(user_id, &tasks)?;
        Ok(true)
    }

    fn delete_tasks_for_pet(&self, user_id: &str, pet_id: &str) -> Result<usize> {
        let mut tasks = self.read_tasks(user_id)?;
        let before = tasks.len();
        tasks.retain(|t| t.pet_id != pet_id);
        let deleted = before - tasks.len();
        if deleted > 0 {
            self.write_tasks(user_id, &tasks)?;
        }
        Ok(deleted)
    }
}
