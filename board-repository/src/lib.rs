//! # Board Repository
//! This crate provides traits and implementations for persisting board content:
//! votable targets, comments with their edit tokens, posts and abuse reports.
//! It includes definitions for errors, interfaces, an in-memory store and a
//! concrete implementation for PostgreSQL.
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

pub use errors::RepositoryError;
pub use interfaces::{ContentRepository, ReportRepository, VoteRepository};
pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;
