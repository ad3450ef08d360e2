use anyhow::Result;
use csv::{Reader, Writer};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::sync::Arc;

use super::connection::CsvConnection;
use crate::storage::traits::VaccineStorage;
use shared::Vaccine;

const VACCINES_FILE: &str = "vaccines.csv";
const VACCINES_HEADER: &str = "id,pet_id,name,brand,date,veterinarian,clinic";

/// CSV-based vaccine record repository
#[derive(Clone)]
pub struct VaccineRepository {
    connection: Arc<CsvConnection>,
}

impl VaccineRepository {
    /// Create a new CSV vaccine repository
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self { connection }
    }

    fn read_vaccines(&self, user_id: &str) -> Result<Vec<Vaccine>> {
        let file_path = self
            .connection
            .ensure_csv_file_exists(user_id, VACCINES_FILE, VACCINES_HEADER)?;

        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut vaccines = Vec::new();

        for result in csv_reader.records() {
            let record = result?;

            let vaccine = Vaccine {
                id: record.get(0).unwrap_or("").to_string(),
                pet_id: record.get(1).unwrap_or("").to_string(),
                name: record.get(2).unwrap_or("").to_string(),
                brand: match record.get(3).unwrap_or("") {
                    "" => None,
                    raw => Some(raw.to_string()),
                },
                date: record.get(4).unwrap_or("").to_string(),
                veterinarian: match record.get(5).unwrap_or("") {
                    "" => None,
                    raw => Some(raw.to_string()),
                },
                clinic: match record.get(6).unwrap_or("") {
                    "" => None,
                    raw => Some(raw.to_string()),
                },
            };

            vaccines.push(vaccine);
        }

        Ok(vaccines)
    }

    fn write_vaccines(&self, user_id: &str, vaccines: &[Vaccine]) -> Result<()> {
        let file_path = self
            .connection
            .ensure_csv_file_exists(user_id, VACCINES_FILE, VACCINES_HEADER)?;

        let temp_path = file_path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;

            let writer = BufWriter::new(file);
            let mut csv_writer = Writer::from_writer(writer);

            csv_writer.write_record(VACCINES_HEADER.split(','))?;

            for vaccine in vaccines {
                csv_writer.write_record(&[
                    vaccine.id.as_str(),
                    vaccine.pet_id.as_str(),
                    vaccine.name.as_str(),
                    vaccine.brand.as_deref().unwrap_or(""),
                    vaccine.date.as_str(),
                    vaccine.veterinarian.as_deref().unwrap_or(""),
                    vaccine.clinic.as_deref().unwrap_or(""),
                ])?;
            }

            csv_writer.flush()?;
        }

        std::fs::rename(&temp_path, &file_path)?;

        Ok(())
    }
}

impl VaccineStorage for VaccineRepository {
    fn store_vaccine(&self, user_id: &str, vaccine: &Vaccine) -> Result<()> {
        let mut vaccines = self.read_vaccines(user_id)?;
        vaccines.push(vaccine.clone());
        self.write_vaccines(user_id, &vaccines)
    }

    fn list_vaccines(&self, user_id: &str) -> Result<Vec<Vaccine>> {
        let mut vaccines = self.read_vaccines(user_id)?;
        vaccines.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(vaccines)
    }

    fn delete_vaccine(&self, user_id: &str, vaccine_id: &str) -> Result<bool> {
        let mut vaccines = self.read_vaccines(user_id)?;
        let before = vaccines.len();
        vaccines.retain(|v| v.id != vaccine_id);
        if vaccines.len() == before {
            return Ok(false);
        }
        self.write_vaccines(user_id, &vaccines)?;
        Ok(true)
    }

    fn delete_vaccines_for_pet(&self, user_id: &str, pet_id: &str) -> Result<usize> {
        let mut vaccines = self.read_vaccines(user_id)?;
        let before = vaccines.len();
        vaccines.retain(|v| v.pet_id != pet_id);
        let deleted = before - vaccines.len();
        if deleted > 0 {
            self.write_vaccines(user_id, &vaccines)?;
        }
        Ok(deleted)
    }
}
