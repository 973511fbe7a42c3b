//! Common utilities and shared types for aashray.
//!
//! This crate provides foundational components used across all aashray crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID keys and session tokens via [`IdGenerator`]
//! - **Storage**: Local file storage for uploaded case images
//!
//! # Example
//!
//! ```no_run
//! use aashray_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     println!("{} on port {}", id_gen.generate(), config.server.port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult, FieldError, FieldErrorKind};
pub use id::IdGenerator;
pub use storage::{
    CASE_IMAGE_PREFIX, LocalStorage, StorageBackend, UploadedFile, case_image_key,
};
