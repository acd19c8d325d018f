//! CLI command implementations.

pub mod backends;
pub mod common;
pub mod connect;
pub mod plan;
pub mod save_account;
pub mod version;
