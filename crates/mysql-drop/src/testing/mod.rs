//! Testing utilities for drop benchmarks
//!
//! This module provides Docker container management for a throwaway MySQL
//! server.

pub mod container;

pub use container::{MySQLContainer, MySQLImage};
