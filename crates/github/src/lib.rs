//! Maintainer roster access for tracked GitHub repositories

pub mod roster;

pub use roster::RosterClient;
