use anyhow::Result;
use csv::{Reader, Writer};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::sync::Arc;

use super::connection::CsvConnection;
use crate::storage::traits::EventStorage;
use shared::Event;

const EVENTS_FILE: &str = "events.csv";
const EVENTS_HEADER: &str = "id,pet_id,name,date,location,description";

/// CSV-based event repository
#[derive(Clone)]
pub struct EventRepository {
    connection: Arc<CsvConnection>,
}

impl EventRepository {
    /// Create a new CSV event repository
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self { connection }
    }

    fn read_events(&self, user_id: &str) -> Result<Vec<Event>> {
        let file_path = self
            .connection
            .ensure_csv_file_exists(user_id, EVENTS_FILE, EVENTS_HEADER)?;

        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut events = Vec::new();

        for result in csv_reader.records() {
            let record = result?;

            let event = Event {
                id: record.get(0).unwrap_or("").to_string(),
                pet_id: record.get(1).unwrap_or("").to_string(),
                name: record.get(2).unwrap_or("").to_string(),
                date: record.get(3).unwrap_or("").to_string(),
                location: match record.get(4).unwrap_or("") {
                    "" => None,
                    raw => Some(raw.to_string()),
                },
                description: match record.get(5).unwrap_or("") {
                    "" => None,
                    raw => Some(raw.to_string()),
                },
            };

            events.push(event);
        }

        Ok(events)
    }

    fn write_events(&self, user_id: &str, events: &[Event]) -> Result<()> {
        let file_path = self
            .connection
            .ensure_csv_file_exists(user_id, EVENTS_FILE, EVENTS_HEADER)?;

        let temp_path = file_path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;

            let writer = BufWriter::new(file);
            let mut csv_writer = Writer::from_writer(writer);

            csv_writer.write_record(EVENTS_HEADER.split(','))?;

            for event in events {
                csv_writer.write_record(&[
                    event.id.as_str(),
                    event.pet_id.as_str(),
                    event.name.as_str(),
                    event.date.as_str(),
                    event.location.as_deref().unwrap_or(""),
                    event.description.as_deref().unwrap_or(""),
                ])?;
            }

            csv_writer.flush()?;
        }

        std::fs::rename(&temp_path, &file_path)?;

        Ok(())
    }
}

impl EventStorage for EventRepository {
    fn store_event(&self, user_id: &str, event: &Event) -> Result<()> {
        let mut events = self.read_events(user_id)?;
        events.push(event.clone());
        self.write_events(user_id, &events)
    }

    fn list_events(&self, user_id: &str) -> Result<Vec<Event>> {
        let mut events = self.read_events(user_id)?;
        events.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(events)
    }

    fn delete_event(&self, user_id: &str, event_id: &str) -> Result<bool> {
        let mut events = self.read_events(user_id)?;
        let before = events.len();
        events.retain(|e| e.id != event_id);
        if events.len() == before {
            return Ok(false);
        }
        self.write_events(user_id, &events)?;
        Ok(true)
    }

    fn delete_events_for_pet(&self, user_id: &str, pet_id: &str) -> Result<usize> {
        let mut events = self.read_events(user_id)?;
        let before = events.len();
        events.retain(|e| e.pet_id != pet_id);
        let deleted = before - events.len();
        if deleted > 0 {
            self.write_events(user_id, &events)?;
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_repo() -> (EventRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        let repo = EventRepository::new(Arc::new(connection));
        (repo, temp_dir)
    }

    fn sample_event(id: &str, pet_id: &str, date: &str) -> Event {
        Event {
            id: id.to_string(),
            pet_id: pet_id.to_string(),
            name: "Vet visit".to_string(),
            date: date.to_string(),
            location: Some("Happy Paws Clinic".to_string()),
            description: None,
        }
    }

    #[test]
    fn test_store_and_list_events_sorted() {
        let (repo, _temp_dir) = setup_test_repo();

        repo.store_event("user-1", &sample_event("event::2", "pet::1", "2024-07-01")).unwrap();
        repo.store_event("user-1", &sample_event("event::1", "pet::1", "2024-06-01")).unwrap();

        let events = repo.list_events("user-1").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "event::1");
        assert_eq!(events[0].location.as_deref(), Some("Happy Paws Clinic"));
        assert!(events[0].description.is_none());
    }

    #[test]
    fn test_delete_events_for_pet() {
        let (repo, _temp_dir) = setup_test_repo();

        repo.store_event("user-1", &sample_event("event::1", "pet::1", "2024-06-01")).unwrap();
        repo.store_event("user-1", &sample_event("event::2", "pet::2", "2024-06-02")).unwrap();

        assert_eq!(repo.delete_events_for_pet("user-1", "pet::1").unwrap(), 1);
        let remaining = repo.list_events("user-1").unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].pet_id, "pet::2");
    }
}
