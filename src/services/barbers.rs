//! Barber directory: profile management for the shop's staff.

use std::sync::Arc;

use super::error::{ServiceError, ServiceResult};
use crate::db::{BarberRepository, FullRepository};
use crate::models::{Barber, BarberId};

pub struct BarberDirectory {
    repo: Arc<dyn FullRepository>,
}

impl BarberDirectory {
    pub fn new(repo: Arc<dyn FullRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Barber>> {
        Ok(self.repo.list_barbers().await?)
    }

    pub async fn get(&self, id: BarberId) -> ServiceResult<Barber> {
        Ok(self.repo.get_barber(id).await?)
    }

    /// Register a new barber profile. Identity-provider enrollment happens
    /// outside this backend; only the profile row is written here.
    pub async fn create(&self, name: &str, email: &str, phone: &str) -> ServiceResult<Barber> {
        let name = name.trim();
        let email = email.trim();
        let phone = phone.trim();

        if name.is_empty() {
            return Err(ServiceError::validation("name is required"));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(ServiceError::validation("a valid email is required"));
        }
        if phone.is_empty() {
            return Err(ServiceError::validation("phone is required"));
        }

        let barber = Barber {
            id: BarberId::random(),
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        };
        self.repo.insert_barber(&barber).await?;
        Ok(barber)
    }

    /// Delete a barber. The shop must always keep at least one barber, so
    /// removing the final remaining profile is rejected.
    pub async fn delete(&self, id: BarberId) -> ServiceResult<()> {
        self.repo.get_barber(id).await?;
        if self.repo.count_barbers().await? <= 1 {
            return Err(ServiceError::validation(
                "at least one barber must remain in the shop",
            ));
        }
        self.repo.delete_barber(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LocalRepository;

    fn directory() -> BarberDirectory {
        BarberDirectory::new(Arc::new(LocalRepository::new()))
    }

    #[tokio::test]
    async fn test_create_validates_fields() {
        let directory = directory();
        assert!(matches!(
            directory.create("", "a@b.com", "555").await.unwrap_err(),
            ServiceError::Validation(_)
        ));
        assert!(matches!(
            directory.create("Carlos", "not-an-email", "555").await.unwrap_err(),
            ServiceError::Validation(_)
        ));
        assert!(matches!(
            directory.create("Carlos", "a@b.com", "  ").await.unwrap_err(),
            ServiceError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_deleting_last_barber_is_rejected() {
        let directory = directory();
        let only = directory
            .create("Carlos", "carlos@example.com", "5551234")
            .await
            .unwrap();

        let err = directory.delete(only.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(directory.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deleting_one_of_two_barbers_succeeds() {
        let directory = directory();
        let carlos = directory
            .create("Carlos", "carlos@example.com", "5551234")
            .await
            .unwrap();
        let miguel = directory
            .create("Miguel", "miguel@example.com", "5559876")
            .await
            .unwrap();

        directory.delete(carlos.id).await.unwrap();

        let remaining = directory.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, miguel.id, "the other barber remains selectable");
    }

    #[tokio::test]
    async fn test_delete_unknown_barber_is_not_found() {
        let directory = directory();
        directory
            .create("Carlos", "carlos@example.com", "5551234")
            .await
            .unwrap();

        let err = directory.delete(BarberId::random()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
