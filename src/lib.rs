//! Alma Gêmea - funnel gateway for the soul mate quiz
//!
//! The library holds the visitor workflow (quiz form, card spread, timed
//! engagement screens, result lookup) and the thin HTTP relay in front of
//! the matching backend. The matching itself happens in that backend.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{FormController, FunnelSession, Navigation, ResultView, Timeline};
pub use models::{SoulMateProfile, SoulMateResult, SoulMateSubmission};
pub use services::{ApiClient, BackendClient};
