use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AcademicYear {
    pub id: String,
    pub label: String, // e.g. "2025-2026"
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub is_current: bool,
}

impl AcademicYear {
    pub fn new(label: &str, starts_on: NaiveDate, ends_on: NaiveDate) -> Self {
        AcademicYear {
            id: Uuid::new_v4().to_string(),
            label: label.trim().to_string(),
            starts_on,
            ends_on,
            is_current: false,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.starts_on <= date && date <= self.ends_on
    }
}
