use std::sync::Arc;

use taskdeck_core::{AppError, AppResult};
use taskdeck_domain::{EndpointRoute, EndpointStatusEntry, EndpointStatusUpdate};
use tracing::info;

use crate::traffic_ports::{EndpointStatusRecord, EndpointStatusRepository};


/// Application service for operator-managed endpoint status.
#[derive(Clone)]
pub struct EndpointStatusService {
    repository: Arc<dyn EndpointStatusRepository>,
}

impl EndpointStatusService {
    /// Creates a service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn EndpointStatusRepository>) -> Self {
        Self { repository }
    }

    /// Returns the status of a route; unknown routes are active.
    pub async fn get(&self, method: &str, path: &str) -> AppResult<EndpointStatusEntry> {
        let route = EndpointRoute::new(method, path)?;
        Ok(self.repository.find(&route).await?.unwrap_or_default())
    }

    /// Lists every stored status ordered by path then method.
    pub async fn list(&self) -> AppResult<Vec<EndpointStatusRecord>> {
        let mut records = self.repository.list().await?;
        records.sort_by(|left, right| {
            left.route
                .path()
                .cmp(right.route.path())
                .then_with(|| left.route.method().cmp(right.route.method()))
        });
        Ok(records)
    }

    /// Applies a partial update on top of the current status of a route.
    pub async fn update(
        &self,
        method: &str,
        path: &str,
        update: EndpointStatusUpdate,
    ) -> AppResult<EndpointStatusEntry> {
        if update.rate_limit == Some(0) {
            return Err(AppError::Validation(
                "endpoint rate limit must be greater than zero".to_owned(),
            ));
        }

        let route = EndpointRoute::new(method, path)?;
        let current = self.repository.find(&route).await?.unwrap_or_default();
        let updated = current.merged(&update);
        self.repository.save(route.clone(), updated).await?;

        info!(
            endpoint = %route,
            status = updated.status.as_str(),
            rate_limit = updated.rate_limit,
            requires_auth = updated.requires_auth,
            "endpoint status updated"
        );

        Ok(updated)
    }
}
