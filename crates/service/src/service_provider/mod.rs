//! Service provider records: store abstraction and business operations.
//!
//! Layout follows the auth module: `repository` holds the store trait,
//! `repo` its implementations, `service` the operations handlers call.

pub mod repo;
pub mod repository;
pub mod service;

pub use repository::ServiceProviderRepository;
pub use service::{
    CreateServiceProviderInput, ProviderPage, ServiceProviderService, StatusView,
    UpdateServiceProviderInput, VerificationView,
};
