//! HTTP API for the gateway endpoints.

mod handlers;
mod types;

pub use handlers::{create_router, AppState};
pub use types::*;
