//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod aws_identity_provider;
mod in_memory_role_record_repository;
mod postgres_role_record_repository;

pub use aws_identity_provider::AwsIdentityProvider;
pub use in_memory_role_record_repository::InMemoryRoleRecordRepository;
pub use postgres_role_record_repository::PostgresRoleRecordRepository;
