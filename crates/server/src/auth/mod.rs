pub mod middleware;

pub use middleware::{ApiToken, AuthError};
