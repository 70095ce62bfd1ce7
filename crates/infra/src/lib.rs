//! Infrastructure layer: storage, services, configuration and demo data.

pub mod config;
pub mod repository;
pub mod seed;
pub mod services;

mod integration_tests;

pub use config::{AppConfig, ConfigError};
pub use repository::{InMemoryRepository, PostgresRepository, Repository, RepositoryError};
pub use services::Services;
