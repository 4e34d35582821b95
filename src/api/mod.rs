pub mod error;
pub mod handlers;
pub mod params;
pub mod router;

pub use error::{ErrorDetail, RequestError};
pub use handlers::{GraphQLEndpoint, RootValue};
pub use router::{graphql_routes, register};
