//! Durable storage contracts for save data.

pub mod save_repo;

pub use save_repo::{SaveRepoError, SaveRepoResult, SaveRepository, SqliteSaveRepository};
