//! Shared building blocks for the workspace: the JSON response envelope,
//! health payload and tracing subscriber setup.

pub mod types;
pub mod utils;

pub use types::{ApiResponse, Health};
