//! Repositories: thin query wrappers over the entities.

pub mod case;
pub mod group;
pub mod session;
pub mod user;

pub use case::{CaseFilter, CaseRepository};
pub use group::GroupRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
