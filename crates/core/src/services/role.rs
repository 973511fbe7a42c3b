//! Role derivation and access checks.
//!
//! Roles are never stored. They are computed from the user row and the names
//! of the groups the user belongs to:
//!
//! - Admin: superuser flag set
//! - Team: member of the "Team" group
//! - Volunteer: any other authenticated user
//!
//! Checks are additive, so an Admin passes every tier.

use aashray_db::entities::{group::TEAM_GROUP, user};

/// An authenticated user together with their group names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user: user::Model,
    pub groups: Vec<String>,
}

impl Identity {
    #[must_use]
    pub const fn new(user: user::Model, groups: Vec<String>) -> Self {
        Self { user, groups }
    }

    #[must_use]
    pub const fn user_id(&self) -> i64 {
        self.user.id
    }

    /// Whether the user belongs to the named group.
    #[must_use]
    pub fn in_group(&self, name: &str) -> bool {
        self.groups.iter().any(|g| g == name)
    }

    #[must_use]
    pub fn role(&self) -> Role {
        role(self)
    }
}

/// Derived role, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    Volunteer,
    Team,
    Admin,
}

impl Role {
    /// Landing page after login.
    #[must_use]
    pub const fn home_path(self) -> &'static str {
        match self {
            Self::Volunteer => "/volunteer/home/",
            Self::Team => "/team/dashboard/",
            Self::Admin => "/dashboard/",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Volunteer => "Volunteer",
            Self::Team => "Team",
            Self::Admin => "Admin",
        }
    }
}

/// Derive the role of an identity.
#[must_use]
pub fn role(identity: &Identity) -> Role {
    if identity.user.is_superuser {
        Role::Admin
    } else if identity.in_group(TEAM_GROUP) {
        Role::Team
    } else {
        Role::Volunteer
    }
}

/// Minimum role a view requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessTier {
    VolunteerOrAbove,
    TeamOrAbove,
    AdminOnly,
}

impl AccessTier {
    #[must_use]
    pub const fn minimum(self) -> Role {
        match self {
            Self::VolunteerOrAbove => Role::Volunteer,
            Self::TeamOrAbove => Role::Team,
            Self::AdminOnly => Role::Admin,
        }
    }
}

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    Unauthenticated,
    Forbidden,
}

impl Denial {
    /// Where the caller is sent instead.
    #[must_use]
    pub const fn redirect_path(self) -> &'static str {
        match self {
            Self::Unauthenticated => "/login/",
            Self::Forbidden => "/volunteer/home/",
        }
    }

    /// Notice shown after the redirect.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Unauthenticated => "Please login to access this page.",
            Self::Forbidden => "You do not have permission to access this page.",
        }
    }
}

/// Classify an optional identity against a tier.
pub fn check_access(identity: Option<&Identity>, tier: AccessTier) -> Result<&Identity, Denial> {
    let identity = identity.ok_or(Denial::Unauthenticated)?;
    if identity.role() >= tier.minimum() {
        Ok(identity)
    } else {
        Err(Denial::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn identity(is_superuser: bool, groups: &[&str]) -> Identity {
        let user = user::Model {
            id: 1,
            username: "meera".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            password: String::new(),
            is_superuser,
            is_active: true,
            date_joined: Utc::now().into(),
            last_login: None,
        };
        Identity::new(user, groups.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn test_role_derivation() {
        assert_eq!(identity(false, &[]).role(), Role::Volunteer);
        assert_eq!(identity(false, &["Volunteer"]).role(), Role::Volunteer);
        assert_eq!(identity(false, &["Volunteer", "Team"]).role(), Role::Team);
        assert_eq!(identity(true, &[]).role(), Role::Admin);
        assert_eq!(identity(true, &["Team"]).role(), Role::Admin);
    }

    #[test]
    fn test_unauthenticated_is_denied_everywhere() {
        for tier in [
            AccessTier::VolunteerOrAbove,
            AccessTier::TeamOrAbove,
            AccessTier::AdminOnly,
        ] {
            assert_eq!(check_access(None, tier), Err(Denial::Unauthenticated));
        }
        assert_eq!(Denial::Unauthenticated.redirect_path(), "/login/");
    }

    #[test]
    fn test_checks_are_additive() {
        let admin = identity(true, &[]);
        assert!(check_access(Some(&admin), AccessTier::VolunteerOrAbove).is_ok());
        assert!(check_access(Some(&admin), AccessTier::TeamOrAbove).is_ok());
        assert!(check_access(Some(&admin), AccessTier::AdminOnly).is_ok());

        let team = identity(false, &["Team"]);
        assert!(check_access(Some(&team), AccessTier::TeamOrAbove).is_ok());
        assert_eq!(
            check_access(Some(&team), AccessTier::AdminOnly),
            Err(Denial::Forbidden)
        );
    }

    #[test]
    fn test_volunteer_is_forbidden_from_team_views() {
        let volunteer = identity(false, &["Volunteer"]);
        assert_eq!(
            check_access(Some(&volunteer), AccessTier::TeamOrAbove),
            Err(Denial::Forbidden)
        );
        assert_eq!(Denial::Forbidden.redirect_path(), "/volunteer/home/");
    }

    #[test]
    fn test_home_paths() {
        assert_eq!(Role::Admin.home_path(), "/dashboard/");
        assert_eq!(Role::Team.home_path(), "/team/dashboard/");
        assert_eq!(Role::Volunteer.home_path(), "/volunteer/home/");
    }
}
