//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login and bearer token resolution live here so the HTTP
//! layer only extracts and formats.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::{AuthService, Claims};
