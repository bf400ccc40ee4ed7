use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    errors::{AppError, AppResult},
    models::domain::AcademicYear,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AcademicYearRepository: Send + Sync {
    async fn create(&self, year: AcademicYear) -> AppResult<AcademicYear>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<AcademicYear>>;
    async fn find_current(&self) -> AppResult<Option<AcademicYear>>;
    async fn list(&self) -> AppResult<Vec<AcademicYear>>;
    /// Marks one year current and clears the flag on every other year.
    async fn set_current(&self, id: &str) -> AppResult<AcademicYear>;
}

#[derive(Default)]
pub struct InMemoryAcademicYearRepository {
    years: Arc<RwLock<HashMap<String, AcademicYear>>>,
}

impl InMemoryAcademicYearRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AcademicYearRepository for InMemoryAcademicYearRepository {
    async fn create(&self, year: AcademicYear) -> AppResult<AcademicYear> {
        let mut years = self.years.write().await;
        if years.values().any(|y| y.label == year.label) {
            return Err(AppError::AlreadyExists(format!(
                "Academic year '{}' already exists",
                year.label
            )));
        }

        years.insert(year.id.clone(), year.clone());
        Ok(year)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<AcademicYear>> {
        let years = self.years.read().await;
        Ok(years.get(id).cloned())
    }

    async fn find_current(&self) -> AppResult<Option<AcademicYear>> {
        let years = self.years.read().await;
        Ok(years.values().find(|y| y.is_current).cloned())
    }

    async fn list(&self) -> AppResult<Vec<AcademicYear>> {
        let years = self.years.read().await;
        let mut items: Vec<_> = years.values().cloned().collect();
        items.sort_by(|a, b| b.starts_on.cmp(&a.starts_on));
        Ok(items)
    }

    async fn set_current(&self, id: &str) -> AppResult<AcademicYear> {
        let mut years = self.years.write().await;
        if !years.contains_key(id) {
            return Err(AppError::NotFound(format!(
                "Academic year with id '{}' not found",
                id
            )));
        }

        for year in years.values_mut() {
            year.is_current = year.id == id;
        }
        years
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::InternalError("Academic year vanished".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn year(label: &str, start_year: i32) -> AcademicYear {
        AcademicYear::new(
            label,
            NaiveDate::from_ymd_opt(start_year, 9, 1).expect("valid date"),
            NaiveDate::from_ymd_opt(start_year + 1, 6, 30).expect("valid date"),
        )
    }

    #[tokio::test]
    async fn only_one_year_is_current() {
        let repo = InMemoryAcademicYearRepository::new();
        let first = repo.create(year("2024-2025", 2024)).await.expect("created");
        let second = repo.create(year("2025-2026", 2025)).await.expect("created");

        repo.set_current(&first.id).await.expect("set current");
        repo.set_current(&second.id).await.expect("set current");

        let current = repo.find_current().await.expect("lookup").expect("one is current");
        assert_eq!(current.id, second.id);
        let listed = repo.list().await.expect("list");
        assert_eq!(listed.iter().filter(|y| y.is_current).count(), 1);
        assert_eq!(listed[0].label, "2025-2026", "newest first");
    }

    #[tokio::test]
    async fn duplicate_label_and_missing_id() {
        let repo = InMemoryAcademicYearRepository::new();
        repo.create(year("2024-2025", 2024)).await.expect("created");

        assert!(matches!(
            repo.create(year("2024-2025", 2024)).await,
            Err(AppError::AlreadyExists(_))
        ));
        assert!(matches!(
            repo.set_current("missing").await,
            Err(AppError::NotFound(_))
        ));
    }
}
