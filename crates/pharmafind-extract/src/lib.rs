//! Collaborator contracts for PharmaFind.
//!
//! The core store never reads images or resolves addresses itself. This crate
//! holds the prompts sent to the vision/validation collaborators, parsers for
//! their JSON replies, and the traits the host app implements for geocoding
//! and device location.

pub mod prompts;
pub mod extraction;
pub mod services;

pub use extraction::*;
pub use prompts::*;
pub use services::*;
