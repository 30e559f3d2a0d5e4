//! Service layer providing business-oriented operations on top of models.
//! - Separates business logic from data access (record stores sit behind traits).
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod access;
pub mod pagination;
pub mod query;
pub mod auth;
pub mod service_provider;
#[cfg(test)]
pub mod test_support;

pub use access::Requester;
pub use errors::ServiceError;
