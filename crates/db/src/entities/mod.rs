//! Database entities.

#![allow(missing_docs)]

pub mod case;
pub mod group;
pub mod session;
pub mod user;
pub mod user_group;

pub use case::Entity as Case;
pub use group::Entity as Group;
pub use session::Entity as Session;
pub use user::Entity as User;
pub use user_group::Entity as UserGroup;
