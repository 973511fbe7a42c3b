//! Business logic services.

#![allow(missing_docs)]

pub mod account;
pub mod case;
pub mod role;
pub mod session;
pub mod team;

pub use account::{AccountService, RegistrationInput};
pub use case::{
    BoardQuery, CaseReportInput, CaseService, ImageUpload, PriorityDefault, TeamBoard,
    VolunteerSummary,
};
pub use role::{AccessTier, Denial, Identity, Role, check_access};
pub use session::SessionService;
pub use team::{AdminOverview, AppointOutcome, RemoveOutcome, TeamService};
