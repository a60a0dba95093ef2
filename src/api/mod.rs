//! API layer - HTTP endpoints and middleware

pub mod analytics;
pub mod features;
pub mod health;
pub mod middleware;
pub mod predict;
pub mod router;
pub mod state;
pub mod types;

pub use router::{create_api_routes, create_router};
pub use state::AppState;
