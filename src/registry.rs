use async_graphql::{Executor, Request, Response};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Notify, RwLock};
use tracing::{debug, info};

/// Object-safe view of an executable GraphQL schema
#[async_trait]
pub trait GraphQLEngine: Send + Sync {
    /// Validate and execute a request against the schema
    async fn execute(&self, request: Request) -> Response;
}

#[async_trait]
impl<E: Executor> GraphQLEngine for E {
    async fn execute(&self, request: Request) -> Response {
        Executor::execute(self, request).await
    }
}

/// Shared, read-only handle to a registered schema
pub type SharedSchema = Arc<dyn GraphQLEngine>;

/// Named schemas that endpoints can bind to
#[derive(Clone, Default)]
pub struct SchemaRegistry {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    schemas: RwLock<HashMap<String, SharedSchema>>,
    registered: Notify,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema under `name`, replacing any previous one
    pub async fn register<E: GraphQLEngine + 'static>(&self, name: impl Into<String>, schema: E) {
        let name = name.into();
        info!("Registering GraphQL schema {:?}", name);

        self.inner
            .schemas
            .write()
            .await
            .insert(name, Arc::new(schema));
        self.inner.registered.notify_waiters();
    }

    /// Look up a schema without waiting
    pub async fn get(&self, name: &str) -> Option<SharedSchema> {
        self.inner.schemas.read().await.get(name).cloned()
    }

    /// Wait until a schema named `name` has been registered
    pub async fn wait_for(&self, name: &str) -> SharedSchema {
        loop {
            let notified = self.inner.registered.notified();
            tokio::pin!(notified);
            // Must be enabled before the lookup or a registration in between is missed.
            notified.as_mut().enable();

            if let Some(schema) = self.get(name).await {
                return schema;
            }

            debug!("Waiting for GraphQL schema {:?} to be registered", name);
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::create_schema;
    use std::time::Duration;

    #[tokio::test]
    async fn test_get_returns_registered_schema() {
        let registry = SchemaRegistry::new();
        assert!(registry.get("demo").await.is_none());

        registry.register("demo", create_schema()).await;

        let schema = registry.get("demo").await.unwrap();
        let response = schema.execute(Request::new("{ test }")).await;
        assert!(response.is_ok());
    }

    #[tokio::test]
    async fn test_wait_for_resolves_after_late_registration() {
        let registry = SchemaRegistry::new();

        let waiter = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.wait_for("late").await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        registry.register("other", create_schema()).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        registry.register("late", create_schema()).await;

        let schema = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(schema.execute(Request::new("{ test }")).await.is_ok());
    }
}
