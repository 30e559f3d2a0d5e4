pub mod memory;
pub mod seaorm;

pub use memory::InMemoryServiceProviderRepository;
pub use seaorm::SeaOrmServiceProviderRepository;
