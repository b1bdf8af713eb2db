//! Service catalog management (cuts, beard trims, combos...).

use std::sync::Arc;

use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::db::{CatalogRepository, FullRepository};
use crate::models::{ServiceItem, DURATION_OPTIONS_MIN};

pub struct CatalogService {
    repo: Arc<dyn FullRepository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn FullRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> ServiceResult<Vec<ServiceItem>> {
        Ok(self.repo.list_services().await?)
    }

    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        duration_min: u16,
        price_cents: i64,
    ) -> ServiceResult<ServiceItem> {
        validate(name, duration_min, price_cents)?;
        let item = ServiceItem {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            description: description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
            duration_min,
            price_cents,
        };
        self.repo.insert_service(&item).await?;
        Ok(item)
    }

    pub async fn update(&self, item: ServiceItem) -> ServiceResult<ServiceItem> {
        validate(&item.name, item.duration_min, item.price_cents)?;
        self.repo.update_service(&item).await?;
        Ok(item)
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        self.repo.delete_service(id).await?;
        Ok(())
    }
}

fn validate(name: &str, duration_min: u16, price_cents: i64) -> ServiceResult<()> {
    if name.trim().is_empty() {
        return Err(ServiceError::validation("name is required"));
    }
    if !DURATION_OPTIONS_MIN.contains(&duration_min) {
        return Err(ServiceError::validation(format!(
            "duration {} min is not offered (allowed: {:?})",
            duration_min, DURATION_OPTIONS_MIN
        )));
    }
    if price_cents <= 0 {
        return Err(ServiceError::validation("price must be positive"));
    }
    Ok(())
}
