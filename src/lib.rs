//! hookstats library
//!
//! Exposes the snapshot cache, data clients, leaderboard and CLI modules for
//! the binary and for integration tests.

pub mod cache;
pub mod cli;
pub mod data;
pub mod leaderboard;
pub mod refresh;
