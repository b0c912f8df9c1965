//! HTTP API module for the VR/VA benefit engine.
//!
//! This module provides the REST endpoints for triggering a benefit run
//! (`POST /runs`) and asking the policy document assistant (`POST /ask`).

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::AskRequest;
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
