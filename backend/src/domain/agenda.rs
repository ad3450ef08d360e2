//! Agenda domain logic for the pet care tracker.
//!
//! This module contains all business logic related to calendar operations,
//! date calculations, and the organization of tasks and events by date. The
//! UI only handles presentation concerns; all calendar computations and
//! scheduling rules live here.

use anyhow::Result;
use chrono::Datelike;
use log::{debug, info};
use shared::{AgendaItem, AgendaItemKind, CalendarDay, CalendarDayType, CalendarFocusDate, CalendarMonth, Event, Task};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::dates;

/// How many entries the merged upcoming list shows.
const UPCOMING_LIMIT: usize = 5;

/// Agenda service that handles all calendar and scheduling projection logic
#[derive(Clone)]
pub struct AgendaService {
    /// Current focus date for calendar navigation (month/year only).
    /// Kept in memory, never persisted.
    current_focus_date: Arc<Mutex<CalendarFocusDate>>,
}

impl Default for AgendaService {
    fn default() -> Self {
        Self::new()
    }
}

impl AgendaService {
    /// Create a new AgendaService instance
    pub fn new() -> Self {
        Self {
            current_focus_date: Arc::new(Mutex::new(CalendarFocusDate::default())),
        }
    }

    /// Pending tasks: everything not yet acknowledged. No date filter, an
    /// overdue task stays pending indefinitely.
    pub fn pending_tasks(tasks: &[Task]) -> Vec<Task> {
        tasks.iter().filter(|t| !t.completed).cloned().collect()
    }

    /// Upcoming events: today or later, by normalized calendar date.
    pub fn upcoming_events(events: &[Event], today: &str) -> Vec<Event> {
        events
            .iter()
            .filter(|e| dates::to_calendar_date(&e.date).as_str() >= today)
            .cloned()
            .collect()
    }

    /// Generate a calendar month view from pending tasks and upcoming events
    pub fn generate_calendar_month(
        &self,
        month: u32,
        year: u32,
        tasks: Vec<Task>,
        events: Vec<Event>,
    ) -> CalendarMonth {
        let days_in_month = self.days_in_month(month, year);
        let first_day = self.first_day_of_month(month, year);

        debug!("Generating calendar for {}/{}: {} days, first weekday {}", month, year, days_in_month, first_day);

        let tasks_by_day = Self::group_by_day(month, year, &tasks, |t| &t.next_date);
        let events_by_day = Self::group_by_day(month, year, &events, |e| &e.date);

        let mut calendar_days = Vec::new();

        // Empty cells for days before the first day of month
        for _ in 0..first_day {
            calendar_days.push(CalendarDay {
                day: 0,
                tasks: Vec::new(),
                events: Vec::new(),
                day_type: CalendarDayType::PaddingBefore,
            });
        }

        for day in 1..=days_in_month {
            calendar_days.push(CalendarDay {
                day,
                tasks: tasks_by_day.get(&day).cloned().unwrap_or_default(),
                events: events_by_day.get(&day).cloned().unwrap_or_default(),
                day_type: CalendarDayType::MonthDay,
            });
        }

        CalendarMonth {
            month,
            year,
            days: calendar_days,
            first_day_of_week: first_day,
        }
    }

    /// Merge pending tasks due today or later with upcoming events into a
    /// single short list, ordered by date. The sort is stable, so items
    /// sharing a date keep insertion order (tasks before events).
    pub fn upcoming_agenda(&self, tasks: &[Task], events: &[Event], today: &str) -> Vec<AgendaItem> {
        let mut items: Vec<AgendaItem> = Vec::new();

        for task in tasks {
            if task.completed {
                continue;
            }
            let date = dates::to_calendar_date(&task.next_date);
            if date.as_str() >= today {
                items.push(AgendaItem {
                    kind: AgendaItemKind::Task,
                    date,
                    id: task.id.clone(),
                    pet_id: task.pet_id.clone(),
                    name: task.name.clone(),
                    color: Some(task.color.clone()),
                });
            }
        }

        for event in events {
            let date = dates::to_calendar_date(&event.date);
            if date.as_str() >= today {
                items.push(AgendaItem {
                    kind: AgendaItemKind::Event,
                    date,
                    id: event.id.clone(),
                    pet_id: event.pet_id.clone(),
                    name: event.name.clone(),
                    color: None,
                });
            }
        }

        items.sort_by(|a, b| a.date.cmp(&b.date));
        items.truncate(UPCOMING_LIMIT);

        info!("Upcoming agenda: {} items", items.len());
        items
    }

    /// Get the number of days in a given month and year
    pub fn days_in_month(&self, month: u32, year: u32) -> u32 {
        match month {
            2 => if self.is_leap_year(year) { 29 } else { 28 },
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    /// Check if a year is a leap year
    pub fn is_leap_year(&self, year: u32) -> bool {
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    /// Get the first day of month (0 = Sunday, 1 = Monday, etc.)
    pub fn first_day_of_month(&self, month: u32, year: u32) -> u32 {
        if let Some(date) = chrono::NaiveDate::from_ymd_opt(year as i32, month, 1) {
            date.weekday().num_days_from_sunday()
        } else {
            // Invalid date, fallback to Sunday
            0
        }
    }

    /// Get the human-readable name for a month number
    pub fn month_name(&self, month: u32) -> &'static str {
        match month {
            1 => "January", 2 => "February", 3 => "March", 4 => "April",
            5 => "May", 6 => "June", 7 => "July", 8 => "August",
            9 => "September", 10 => "October", 11 => "November", 12 => "December",
            _ => "Invalid Month",
        }
    }

    /// Navigate to the previous month
    pub fn previous_month(&self, current_month: u32, current_year: u32) -> (u32, u32) {
        if current_month == 1 {
            (12, current_year - 1)
        } else {
            (current_month - 1, current_year)
        }
    }

    /// Navigate to the next month
    pub fn next_month(&self, current_month: u32, current_year: u32) -> (u32, u32) {
        if current_month == 12 {
            (1, current_year + 1)
        } else {
            (current_month + 1, current_year)
        }
    }

    /// Get the current focus date for calendar navigation
    pub fn get_focus_date(&self) -> CalendarFocusDate {
        self.current_focus_date.lock().unwrap().clone()
    }

    /// Set the focus date for calendar navigation
    pub fn set_focus_date(&self, month: u32, year: u32) -> Result<CalendarFocusDate> {
        if !(1..=12).contains(&month) {
            return Err(anyhow::anyhow!("Invalid month: {}. Must be between 1 and 12", month));
        }

        let new_focus_date = CalendarFocusDate { month, year };
        {
            let mut focus_date = self.current_focus_date.lock().unwrap();
            *focus_date = new_focus_date.clone();
        }

        Ok(new_focus_date)
    }

    /// Move the focus date one month back and return the new focus
    pub fn navigate_previous_month(&self) -> CalendarFocusDate {
        let current = self.get_focus_date();
        let (month, year) = self.previous_month(current.month, current.year);
        let mut focus_date = self.current_focus_date.lock().unwrap();
        *focus_date = CalendarFocusDate { month, year };
        focus_date.clone()
    }

    /// Move the focus date one month forward and return the new focus
    pub fn navigate_next_month(&self) -> CalendarFocusDate {
        let current = self.get_focus_date();
        let (month, year) = self.next_month(current.month, current.year);
        let mut focus_date = self.current_focus_date.lock().unwrap();
        *focus_date = CalendarFocusDate { month, year };
        focus_date.clone()
    }

    /// Group items by day-of-month for a specific month and year, keyed on
    /// a normalized date field
    fn group_by_day<T: Clone>(
        month: u32,
        year: u32,
        items: &[T],
        date_of: impl Fn(&T) -> &str,
    ) -> HashMap<u32, Vec<T>> {
        let mut by_day: HashMap<u32, Vec<T>> = HashMap::new();

        for item in items {
            let normalized = dates::to_calendar_date(date_of(item));
            if let Some((i_year, i_month, i_day)) = dates::split_calendar_date(&normalized) {
                if i_month == month && i_year == year as i32 {
                    by_day.entry(i_day).or_default().push(item.clone());
                }
            }
        }

        by_day
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Frequency;

    fn task(id: &str, next_date: &str, completed: bool) -> Task {
        Task {
            id: id.to_string(),
            pet_id: "pet::1".to_string(),
            name: format!("Task {}", id),
            frequency: Frequency::Daily,
            frequency_days: 1,
            next_date: next_date.to_string(),
            time: None,
            last_completed: None,
            color: "#8B5CF6".to_string(),
            completed,
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    fn event(id: &str, date: &str) -> Event {
        Event {
            id: id.to_string(),
            pet_id: "pet::1".to_string(),
            name: format!("Event {}", id),
            date: date.to_string(),
            location: None,
            description: None,
        }
    }

    #[test]
    fn test_days_in_month() {
        let service = AgendaService::new();
        assert_eq!(service.days_in_month(2, 2024), 29); // Leap year
        assert_eq!(service.days_in_month(2, 2023), 28);
        assert_eq!(service.days_in_month(2, 1900), 28); // Century, not leap
        assert_eq!(service.days_in_month(2, 2000), 29); // 400-year rule
        assert_eq!(service.days_in_month(4, 2024), 30);
        assert_eq!(service.days_in_month(12, 2024), 31);
    }

    #[test]
    fn test_first_day_of_month() {
        let service = AgendaService::new();
        // May 1st 2024 was a Wednesday
        assert_eq!(service.first_day_of_month(5, 2024), 3);
        // September 1st 2024 was a Sunday
        assert_eq!(service.first_day_of_month(9, 2024), 0);
    }

    #[test]
    fn test_calendar_month_padding_and_buckets() {
        let service = AgendaService::new();

        let tasks = vec![task("a", "2024-05-02", false), task("b", "2024-05-02", false)];
        let events = vec![event("e", "2024-05-15"), event("other-month", "2024-06-15")];

        let calendar = service.generate_calendar_month(5, 2024, tasks, events);

        assert_eq!(calendar.first_day_of_week, 3);
        // 3 padding cells + 31 days
        assert_eq!(calendar.days.len(), 34);
        assert_eq!(calendar.days[0].day_type, CalendarDayType::PaddingBefore);
        assert!(!calendar.days[0].has_items());

        // Padding offset: day N sits at index first_day + N - 1
        let day2 = &calendar.days[3 + 1];
        assert_eq!(day2.day, 2);
        assert_eq!(day2.tasks.len(), 2);
        assert!(day2.has_items());

        let day15 = &calendar.days[3 + 14];
        assert_eq!(day15.events.len(), 1);

        // The June event must not leak into May
        let total_events: usize = calendar.days.iter().map(|d| d.events.len()).sum();
        assert_eq!(total_events, 1);
    }

    #[test]
    fn test_calendar_buckets_timestamped_dates() {
        let service = AgendaService::new();

        // A timestamped event date is reduced to its calendar day
        let events = vec![event("e", "2024-05-10T09:00:00+00:00")];
        let calendar = service.generate_calendar_month(5, 2024, Vec::new(), events);

        let with_items: Vec<u32> = calendar
            .days
            .iter()
            .filter(|d| d.has_items())
            .map(|d| d.day)
            .collect();
        assert_eq!(with_items.len(), 1);
        // Local-timezone reduction keeps it on the 9th, 10th or 11th
        assert!((9..=11).contains(&with_items[0]));
    }

    #[test]
    fn test_upcoming_agenda_merge_ordering() {
        let service = AgendaService::new();
        let today = "2024-05-01";

        let tasks = vec![task("t1", "2024-05-03", false), task("t2", "2024-05-01", false)];
        let events = vec![event("e1", "2024-05-02")];

        let agenda = service.upcoming_agenda(&tasks, &events, today);

        let ids: Vec<&str> = agenda.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["t2", "e1", "t1"]);
        assert_eq!(agenda[0].kind, AgendaItemKind::Task);
        assert_eq!(agenda[1].kind, AgendaItemKind::Event);
        assert_eq!(agenda[0].color.as_deref(), Some("#8B5CF6"));
        assert!(agenda[1].color.is_none());
    }

    #[test]
    fn test_upcoming_agenda_ties_keep_tasks_before_events() {
        let service = AgendaService::new();
        let today = "2024-05-01";

        let tasks = vec![task("t1", "2024-05-02", false)];
        let events = vec![event("e1", "2024-05-02")];

        let agenda = service.upcoming_agenda(&tasks, &events, today);
        assert_eq!(agenda[0].id, "t1");
        assert_eq!(agenda[1].id, "e1");
    }

    #[test]
    fn test_upcoming_agenda_excludes_past_and_completed() {
        let service = AgendaService::new();
        let today = "2024-05-01";

        let tasks = vec![
            task("overdue", "2024-04-20", false), // pending, but not upcoming
            task("done", "2024-05-03", true),
            task("ok", "2024-05-02", false),
        ];
        let events = vec![event("past", "2024-04-30")];

        let agenda = service.upcoming_agenda(&tasks, &events, today);
        assert_eq!(agenda.len(), 1);
        assert_eq!(agenda[0].id, "ok");
    }

    #[test]
    fn test_upcoming_agenda_truncates_to_five() {
        let service = AgendaService::new();
        let today = "2024-05-01";

        let tasks: Vec<Task> = (1..=8)
            .map(|i| task(&format!("t{}", i), &format!("2024-05-{:02}", i), false))
            .collect();

        let agenda = service.upcoming_agenda(&tasks, &[], today);
        assert_eq!(agenda.len(), 5);
        assert_eq!(agenda[0].date, "2024-05-01");
        assert_eq!(agenda[4].date, "2024-05-05");
    }

    #[test]
    fn test_month_navigation_with_year_rollover() {
        let service = AgendaService::new();
        assert_eq!(service.previous_month(1, 2024), (12, 2023));
        assert_eq!(service.next_month(12, 2024), (1, 2025));
        assert_eq!(service.next_month(6, 2024), (7, 2024));
    }

    #[test]
    fn test_focus_date_navigation() {
        let service = AgendaService::new();
        service.set_focus_date(1, 2024).unwrap();

        let focus = service.navigate_previous_month();
        assert_eq!((focus.month, focus.year), (12, 2023));

        let focus = service.navigate_next_month();
        assert_eq!((focus.month, focus.year), (1, 2024));

        assert!(service.set_focus_date(13, 2024).is_err());
    }

    #[test]
    fn test_pending_and_upcoming_filters() {
        let tasks = vec![task("a", "2020-01-01", false), task("b", "2024-05-02", true)];
        let pending = AgendaService::pending_tasks(&tasks);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "a");

        let events = vec![event("past", "2024-04-30"), event("today", "2024-05-01")];
        let upcoming = AgendaService::upcoming_events(&events, "2024-05-01");
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].id, "today");
    }
}
