use anyhow::Result;
use chrono::{Duration, Utc};
use log::info;
use std::sync::Arc;

use crate::domain::commands::reports::{PurgeOldDataResult, ReportDataQuery};
use crate::domain::dates;
use crate::domain::user_service::UserService;
use crate::storage::csv::{CsvConnection, EventRepository, PetRepository, TaskRepository, VaccineRepository};
use crate::storage::traits::{EventStorage, PetStorage, TaskStorage, VaccineStorage};
use shared::ReportData;

/// How long records are kept before the purge removes them.
const RETENTION_DAYS: i64 = 365;

/// Service assembling report data and enforcing the retention window
#[derive(Clone)]
pub struct ReportService {
    pet_repository: PetRepository,
    task_repository: TaskRepository,
    event_repository: EventRepository,
    vaccine_repository: VaccineRepository,
    user_service: UserService,
}

impl ReportService {
    /// Create a new ReportService
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            pet_repository: PetRepository::new(csv_conn.clone()),
            task_repository: TaskRepository::new(csv_conn.clone()),
            event_repository: EventRepository::new(csv_conn.clone()),
            vaccine_repository: VaccineRepository::new(csv_conn.clone()),
            user_service: UserService::new(csv_conn),
        }
    }

    /// Select the entity snapshots a report covers: optionally one pet, and
    /// records restricted to an inclusive date range. Tasks filter on their
    /// creation day, events and vaccines on their own date.
    pub fn report_data(&self, query: ReportDataQuery) -> Result<ReportData> {
        let user_id = self.user_service.resolve_user_id(query.user_id.clone())?;

        let in_range = |date: &str| -> bool {
            let date = dates::to_calendar_date(date);
            if let Some(start) = &query.start_date {
                if date.as_str() < start.as_str() {
                    return false;
                }
            }
            if let Some(end) = &query.end_date {
                if date.as_str() > end.as_str() {
                    return false;
                }
            }
            true
        };
        let pet_matches = |pet_id: &str| -> bool {
            query.pet_id.as_deref().map_or(true, |wanted| wanted == pet_id)
        };

        let pets = self
            .pet_repository
            .list_pets(&user_id)?
            .into_iter()
            .filter(|p| pet_matches(&p.id))
            .map(Into::into)
            .collect();
        let tasks = self
            .task_repository
            .list_tasks(&user_id)?
            .into_iter()
            .filter(|t| pet_matches(&t.pet_id))
            .filter(|t| in_range(&t.created_at.to_rfc3339()))
            .map(Into::into)
            .collect();
        let events = self
            .event_repository
            .list_events(&user_id)?
            .into_iter()
            .filter(|e| pet_matches(&e.pet_id) && in_range(&e.date))
            .collect();
        let vaccines = self
            .vaccine_repository
            .list_vaccines(&user_id)?
            .into_iter()
            .filter(|v| pet_matches(&v.pet_id) && in_range(&v.date))
            .collect();

        Ok(ReportData {
            pets,
            tasks,
            events,
            vaccines,
        })
    }

    /// Delete records older than the retention window: tasks created more
    /// than a year ago, and events/vaccines dated more than a year ago.
    pub fn purge_old_data(&self, user_id: Option<String>) -> Result<PurgeOldDataResult> {
        let user_id = self.user_service.resolve_user_id(user_id)?;
        let cutoff_ts = Utc::now() - Duration::days(RETENTION_DAYS);
        let cutoff_date = dates::add_days(&dates::today(), -RETENTION_DAYS)
            .ok_or_else(|| anyhow::anyhow!("Cannot compute retention cutoff"))?;

        info!("Purging records older than {}", cutoff_date);

        let mut deleted_tasks = 0;
        for task in self.task_repository.list_tasks(&user_id)? {
            if task.created_at < cutoff_ts && self.task_repository.delete_task(&user_id, &task.id)? {
                deleted_tasks += 1;
            }
        }

        let mut deleted_events = 0;
        for event in self.event_repository.list_events(&user_id)? {
            let date = dates::to_calendar_date(&event.date);
            if date.as_str() < cutoff_date.as_str()
                && self.event_repository.delete_event(&user_id, &event.id)?
            {
                deleted_events += 1;
            }
        }

        let mut deleted_vaccines = 0;
        for vaccine in self.vaccine_repository.list_vaccines(&user_id)? {
            let date = dates::to_calendar_date(&vaccine.date);
            if date.as_str() < cutoff_date.as_str()
                && self.vaccine_repository.delete_vaccine(&user_id, &vaccine.id)?
            {
                deleted_vaccines += 1;
            }
        }

        info!(
            "Purged {} tasks, {} events, {} vaccines",
            deleted_tasks, deleted_events, deleted_vaccines
        );

        Ok(PurgeOldDataResult {
            deleted_tasks,
            deleted_events,
            deleted_vaccines,
        })
    }
}
