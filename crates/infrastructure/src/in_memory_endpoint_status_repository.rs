use std::collections::HashMap;

use async_trait::async_trait;
use taskdeck_application::{EndpointStatusRecord, EndpointStatusRepository};
use taskdeck_core::AppResult;
use taskdeck_domain::{EndpointAvailability, EndpointRoute, EndpointStatusEntry};
use tokio::sync::RwLock;

/// In-memory endpoint status registry.
#[derive(Debug, Default)]
pub struct InMemoryEndpointStatusRepository {
    entries: RwLock<HashMap<EndpointRoute, EndpointStatusEntry>>,
}

impl InMemoryEndpointStatusRepository {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the dashboard's built-in endpoints.
    pub fn seeded() -> AppResult<Self> {
        let seeds = [
            ("GET", "/api/tasks", 100, true),
            ("POST", "/api/tasks", 50, true),
            ("POST", "/api/auth/register", 10, false),
            ("POST", "/api/auth/login", 20, false),
        ];

        let mut entries = HashMap::with_capacity(seeds.len());
        for (method, path, rate_limit, requires_auth) in seeds {
            entries.insert(
                EndpointRoute::new(method, path)?,
                EndpointStatusEntry {
                    status: EndpointAvailability::Active,
                    rate_limit,
                    requires_auth,
                },
            );
        }

        Ok(Self {
            entries: RwLock::new(entries),
        })
    }
}

#[async_trait]
impl EndpointStatusRepository for InMemoryEndpointStatusRepository {
    async fn find(&self, route: &EndpointRoute) -> AppResult<Option<EndpointStatusEntry>> {
        Ok(self.entries.read().await.get(route).copied())
    }

    async fn save(&self, route: EndpointRoute, entry: EndpointStatusEntry) -> AppResult<()> {
        self.entries.write().await.insert(route, entry);
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<EndpointStatusRecord>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .map(|(route, entry)| EndpointStatusRecord {
                route: route.clone(),
                entry: *entry,
            })
            .collect())
    }
}
