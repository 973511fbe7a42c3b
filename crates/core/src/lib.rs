//! Core business logic for aashray.

pub mod services;

pub use services::*;
