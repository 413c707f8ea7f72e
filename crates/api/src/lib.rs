//! HTTP API layer for koinonia.
//!
//! - **Endpoints**: JSON routes for the mobile client
//! - **Extractors**: Authentication
//! - **Middleware**: Bearer-token verification, application state
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
pub use response::ApiResponse;
