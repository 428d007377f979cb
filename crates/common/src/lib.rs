//! Common types and utilities for Repo Pulse

pub mod config;
pub mod error;
pub mod identity;
pub mod models;

pub use config::Config;
pub use error::{Error, Result};
