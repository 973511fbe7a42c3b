//! Account service: registration, credential checks and the bootstrap superuser.

use aashray_common::{AppError, AppResult, FieldError, config::AdminBootstrapConfig};
use aashray_db::{
    entities::{group::VOLUNTEER_GROUP, user},
    repositories::UserRepository,
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use validator::{Validate, ValidateEmail, ValidationError};

const PASSWORD_MIN: usize = 8;

/// Account service for business logic.
#[derive(Clone)]
pub struct AccountService {
    user_repo: UserRepository,
}

/// Submitted registration form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegistrationInput {
    #[serde(default)]
    #[validate(
        length(max = 150, message = "Ensure this value has at most 150 characters."),
        custom(function = "username_rules")
    )]
    pub username: String,

    #[serde(default)]
    #[validate(
        custom(function = "required"),
        length(max = 30, message = "Ensure this value has at most 30 characters.")
    )]
    pub first_name: String,

    #[serde(default)]
    #[validate(
        custom(function = "required"),
        length(max = 30, message = "Ensure this value has at most 30 characters.")
    )]
    pub last_name: String,

    #[serde(default)]
    #[validate(custom(function = "email_rules"))]
    pub email: String,

    #[serde(default)]
    #[validate(custom(function = "password_rules"))]
    pub password1: String,

    #[serde(default)]
    #[validate(custom(function = "required"))]
    pub password2: String,
}

impl RegistrationInput {
    /// Copy with surrounding whitespace removed from the text fields.
    ///
    /// Passwords are kept verbatim.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.email = self.email.trim().to_string();
        self
    }

    /// Every rule violation, in form order.
    #[must_use]
    pub fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(e) => AppError::from(e).field_errors().to_vec(),
        };

        if !self.password1.is_empty()
            && !self.password2.is_empty()
            && self.password1 != self.password2
        {
            errors.push(FieldError::invalid(
                "password2",
                "The two password fields didn't match.",
            ));
        }

        let order = |field: &str| {
            [
                "username",
                "first_name",
                "last_name",
                "email",
                "password1",
                "password2",
            ]
            .iter()
            .position(|f| *f == field)
            .unwrap_or(usize::MAX)
        };
        errors.sort_by_key(|e| order(&e.field));
        errors
    }
}

fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn username_rules(value: &str) -> Result<(), ValidationError> {
    required(value)?;
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if value.chars().all(allowed) {
        Ok(())
    } else {
        Err(ValidationError::new("username").with_message(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .into(),
        ))
    }
}

fn email_rules(value: &str) -> Result<(), ValidationError> {
    required(value)?;
    if value.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email").with_message("Enter a valid email address.".into()))
    }
}

fn password_rules(value: &str) -> Result<(), ValidationError> {
    required(value)?;
    if value.chars().count() < PASSWORD_MIN {
        return Err(ValidationError::new("password_too_short").with_message(
            "This password is too short. It must contain at least 8 characters.".into(),
        ));
    }
    if value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("password_entirely_numeric")
            .with_message("This password is entirely numeric.".into()));
    }
    Ok(())
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Register a volunteer.
    ///
    /// Creates the user and their "Volunteer" membership together, creating
    /// the group when missing. Usernames must be unique ignoring case.
    pub async fn register(&self, input: RegistrationInput) -> AppResult<user::Model> {
        let input = input.normalized();
        let mut errors = input.field_errors();

        let username_ok = !errors.iter().any(|e| e.field == "username");
        if username_ok && self.user_repo.username_taken(&input.username).await? {
            errors.insert(
                0,
                FieldError::invalid("username", "A user with that username already exists."),
            );
        }

        if !errors.is_empty() {
            return Err(AppError::InvalidFields(errors));
        }

        let model = user::ActiveModel {
            username: Set(input.username),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            email: Set(input.email),
            password: Set(hash_password(&input.password1)?),
            is_superuser: Set(false),
            is_active: Set(true),
            date_joined: Set(Utc::now().into()),
            last_login: Set(None),
            ..Default::default()
        };
        let user = self.user_repo.create_in_group(model, VOLUNTEER_GROUP).await?;

        tracing::info!(user_id = user.id, username = %user.username, "Registered volunteer");
        Ok(user)
    }

    /// Check a username and password.
    ///
    /// Unknown users, wrong passwords and inactive accounts all yield
    /// [`AppError::Unauthorized`].
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let Some(user) = self.user_repo.find_by_username(username.trim()).await? else {
            tracing::warn!(username = %username, "Login attempt for unknown user");
            return Err(AppError::Unauthorized);
        };

        if !verify_password(password, &user.password)? {
            tracing::warn!(user_id = user.id, "Login attempt with wrong password");
            return Err(AppError::Unauthorized);
        }

        if !user.is_active {
            tracing::warn!(user_id = user.id, "Login attempt for inactive user");
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Stamp `last_login` for a user who just signed in.
    pub async fn record_login(&self, user_id: i64) -> AppResult<()> {
        self.user_repo.touch_last_login(user_id).await
    }

    /// Create the configured superuser unless the username is already taken.
    ///
    /// Returns the new user, or `None` if nothing was created.
    pub async fn ensure_superuser(
        &self,
        admin: &AdminBootstrapConfig,
    ) -> AppResult<Option<user::Model>> {
        if self.user_repo.username_taken(&admin.username).await? {
            return Ok(None);
        }

        if admin.password.is_empty() {
            return Err(AppError::Config(
                "admin.password must not be empty".to_string(),
            ));
        }

        let model = user::ActiveModel {
            username: Set(admin.username.clone()),
            first_name: Set(String::new()),
            last_name: Set(String::new()),
            email: Set(admin.email.clone()),
            password: Set(hash_password(&admin.password)?),
            is_superuser: Set(true),
            is_active: Set(true),
            date_joined: Set(Utc::now().into()),
            last_login: Set(None),
            ..Default::default()
        };
        let user = self.user_repo.create(model).await?;

        tracing::info!(user_id = user.id, username = %user.username, "Created bootstrap superuser");
        Ok(Some(user))
    }
}

/// Hash a password using Argon2.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use aashray_common::FieldErrorKind;
    use aashray_db::entities::group;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    /// Second handle to the same mock connection; `DatabaseConnection` is not
    /// `Clone` under sea-orm's `mock` feature.
    fn share(conn: &DatabaseConnection) -> DatabaseConnection {
        let DatabaseConnection::MockDatabaseConnection(inner) = conn else {
            unreachable!("tests only use mock connections")
        };
        DatabaseConnection::MockDatabaseConnection(std::sync::Arc::clone(inner))
    }

    fn create_test_user(id: i64, username: &str, password: &str) -> user::Model {
        user::Model {
            id,
            username: username.to_string(),
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            email: format!("{username}@example.com"),
            password: hash_password(password).unwrap(),
            is_superuser: false,
            is_active: true,
            date_joined: Utc::now().into(),
            last_login: None,
        }
    }

    fn valid_input() -> RegistrationInput {
        RegistrationInput {
            username: "asha".to_string(),
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            email: "asha@example.com".to_string(),
            password1: "correct-horse".to_string(),
            password2: "correct-horse".to_string(),
        }
    }

    fn service(db: MockDatabase) -> AccountService {
        service_over(db.into_connection())
    }

    fn service_over(conn: DatabaseConnection) -> AccountService {
        AccountService::new(UserRepository::new(Arc::new(conn)))
    }

    fn count_row(n: i64) -> BTreeMap<String, Value> {
        BTreeMap::from([("num_items".to_string(), Value::BigInt(Some(n)))])
    }

    #[test]
    fn test_password_hashing() {
        let hash = hash_password("test_password").unwrap();
        assert!(verify_password("test_password", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_valid_registration_has_no_errors() {
        assert!(valid_input().field_errors().is_empty());
    }

    #[test]
    fn test_registration_missing_fields() {
        let errors = RegistrationInput::default().field_errors();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "username",
                "first_name",
                "last_name",
                "email",
                "password1",
                "password2"
            ]
        );
        assert!(errors.iter().all(|e| e.kind == FieldErrorKind::Missing));
    }

    #[test]
    fn test_registration_rules() {
        let input = RegistrationInput {
            username: "bad name!".to_string(),
            email: "not-an-email".to_string(),
            password1: "12345678".to_string(),
            password2: "12345679".to_string(),
            ..valid_input()
        };
        let errors = input.field_errors();
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();

        assert!(messages[0].starts_with("username: Enter a valid username."));
        assert!(messages.contains(&"email: Enter a valid email address.".to_string()));
        assert!(messages.contains(&"password1: This password is entirely numeric.".to_string()));
        assert!(
            messages.contains(&"password2: The two password fields didn't match.".to_string())
        );
    }

    #[test]
    fn test_short_password_and_long_name() {
        let input = RegistrationInput {
            first_name: "x".repeat(31),
            password1: "short".to_string(),
            password2: "short".to_string(),
            ..valid_input()
        };
        let messages: Vec<String> = input.field_errors().iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            vec![
                "first_name: Ensure this value has at most 30 characters.".to_string(),
                "password1: This password is too short. It must contain at least 8 characters."
                    .to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_register_rejects_taken_username_in_any_case() {
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(1)]])
            .into_connection();
        let svc = service_over(share(&conn));

        let input = RegistrationInput {
            username: "ASHA".to_string(),
            ..valid_input()
        };
        let result = svc.register(input).await;

        // The lookup compares lowercased names and nothing is inserted.
        let log = conn.into_transaction_log();
        assert_eq!(log.len(), 1);
        assert!(log[0].statements()[0].sql.contains("LOWER("));

        match result {
            Err(AppError::InvalidFields(errors)) => {
                assert_eq!(
                    errors[0].to_string(),
                    "username: A user with that username already exists."
                );
            }
            other => panic!("Expected InvalidFields, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_register_joins_volunteer_group() {
        let created = create_test_user(5, "asha", "correct-horse");
        let volunteers = group::Model {
            id: 2,
            name: "Volunteer".to_string(),
        };
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(0)]])
            .append_query_results([[created]])
            .append_query_results([[volunteers]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let svc = service_over(share(&conn));

        let user = svc.register(valid_input()).await.unwrap();
        assert_eq!(user.id, 5);
        assert!(!user.is_superuser);

        // Uniqueness check, then one transaction for the user and membership.
        let log = conn.into_transaction_log();
        assert_eq!(log.len(), 2);
        let txn: Vec<&str> = log[1].statements().iter().map(|s| s.sql.as_str()).collect();
        assert_eq!(txn.first(), Some(&"BEGIN"));
        assert!(txn.iter().any(|sql| sql.starts_with(r#"INSERT INTO "user_group""#)));
        assert_eq!(txn.last(), Some(&"COMMIT"));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let user = create_test_user(1, "asha", "correct-horse");
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .append_query_results([[user]])
                .append_query_results([Vec::<user::Model>::new()]),
        );

        assert_eq!(svc.authenticate("asha", "correct-horse").await.unwrap().id, 1);
        assert!(matches!(
            svc.authenticate("asha", "wrong").await,
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            svc.authenticate("ghost", "correct-horse").await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_inactive_user_cannot_authenticate() {
        let mut user = create_test_user(1, "asha", "correct-horse");
        user.is_active = false;
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[user]]));

        assert!(matches!(
            svc.authenticate("asha", "correct-horse").await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_ensure_superuser_skips_existing() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[count_row(1)]]));

        let admin = AdminBootstrapConfig {
            username: "Root".to_string(),
            password: "secret-pass".to_string(),
            email: String::new(),
        };
        assert!(svc.ensure_superuser(&admin).await.unwrap().is_none());
    }
}
