//! Unit tests for configuration loading and precedence.
//!
//! Tests are organised into modules by functional area:
//! - `helpers`: Shared test utilities
//! - `precedence`: Layer precedence tests
//! - `operation_mode`: Mode and view parsing tests
//! - `field_resolution`: Token, repository, Discord, and selection accessors

mod helpers;
mod operation_mode;
mod precedence;
