#![forbid(unsafe_code)]

//! HTTP surface for the exercise tracker.

pub mod error;
pub mod handlers;
pub mod request;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use server::{router, ExtrackServer};
