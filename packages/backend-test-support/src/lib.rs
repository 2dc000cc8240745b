//! Backend test support utilities
//!
//! Shared by the backend's integration tests: quiet logging initialization and
//! assertions for problem+json error bodies.

pub mod logging;
pub mod problem_details;
