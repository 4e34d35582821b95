use async_graphql::{Context, EmptySubscription, Json, Object, Result, Schema};
use serde_json::Value;

use crate::api::RootValue;

/// Type alias for the hello-world schema served by the binary
#[allow(clippy::module_name_repetitions)]
pub type DemoSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Greet `who`, or the world
    async fn test(&self, who: Option<String>) -> String {
        format!("Hello {}", who.as_deref().unwrap_or("World"))
    }

    /// Always fails
    async fn thrower(&self) -> Result<String> {
        Err("Throws!".into())
    }

    /// The root value configured for the endpoint
    async fn root_value(&self, ctx: &Context<'_>) -> Option<Json<Value>> {
        ctx.data_opt::<RootValue>().map(|root| Json(root.0.clone()))
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn write_test(&self) -> QueryRoot {
        QueryRoot
    }
}

#[must_use]
pub fn create_schema() -> DemoSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription).finish()
}
