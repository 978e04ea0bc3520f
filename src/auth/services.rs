use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::User;
use crate::error::{is_unique_violation, ApiError, FieldError};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Lowercase-trim normalization applied before every store lookup, so email
/// uniqueness is effectively case-insensitive.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

const NAME_RANGE: &str = "Name must be between 2 and 50 characters";
const EMAIL_SYNTAX: &str = "Please provide a valid email";
const PASSWORD_MIN: &str = "Password must be at least 6 characters long";
const PASSWORD_REQUIRED: &str = "Password is required";

fn validate_name(name: &str, errors: &mut Vec<FieldError>) {
    let len = name.trim().chars().count();
    if !(2..=50).contains(&len) {
        errors.push(FieldError {
            field: "name",
            message: NAME_RANGE,
        });
    }
}

fn validate_email(email: &str, errors: &mut Vec<FieldError>) {
    if !is_valid_email(email) {
        errors.push(FieldError {
            field: "email",
            message: EMAIL_SYNTAX,
        });
    }
}

/// Collects every violated field so the client can show them all at once.
pub(crate) fn validate_registration(name: &str, email: &str, password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    validate_name(name, &mut errors);
    validate_email(email, &mut errors);
    if password.chars().count() < 6 {
        errors.push(FieldError {
            field: "password",
            message: PASSWORD_MIN,
        });
    }
    errors
}

pub(crate) fn validate_login(email: &str, password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    validate_email(email, &mut errors);
    if password.is_empty() {
        errors.push(FieldError {
            field: "password",
            message: PASSWORD_REQUIRED,
        });
    }
    errors
}

pub(crate) fn validate_profile(name: &str, email: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    validate_name(name, &mut errors);
    validate_email(email, &mut errors);
    errors
}

pub async fn register(db: &PgPool, name: &str, email: &str, password: &str) -> Result<User, ApiError> {
    let email = normalize_email(email);
    let errors = validate_registration(name, &email, password);
    if !errors.is_empty() {
        warn!(?errors, "registration validation failed");
        return Err(ApiError::Validation(errors));
    }

    if User::find_by_email(db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::DuplicateEmail);
    }

    let hash = hash_password(password)?;
    let user = match User::create(db, name.trim(), &email, &hash).await {
        Ok(u) => u,
        // Lost the race against a concurrent registration for the same email.
        Err(e) if is_unique_violation(&e) => return Err(ApiError::DuplicateEmail),
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, "user registered");
    Ok(user)
}

pub async fn login(db: &PgPool, email: &str, password: &str) -> Result<User, ApiError> {
    let email = normalize_email(email);
    let errors = validate_login(&email, password);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    // Unknown email and wrong password take the same exit so the two cases
    // are indistinguishable from outside.
    let Some(user) = User::find_by_email(db, &email).await? else {
        warn!("login with unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    info!(user_id = %user.id, "user logged in");
    Ok(user)
}

pub async fn update_profile(
    db: &PgPool,
    user_id: Uuid,
    name: &str,
    email: &str,
) -> Result<User, ApiError> {
    let email = normalize_email(email);
    let errors = validate_profile(name, &email);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    match User::update_profile(db, user_id, name.trim(), &email).await {
        Ok(Some(user)) => {
            info!(user_id = %user.id, "profile updated");
            Ok(user)
        }
        // The row vanished between token resolution and the update.
        Ok(None) => Err(ApiError::Unauthorized),
        Err(e) if is_unique_violation(&e) => Err(ApiError::DuplicateEmail),
        Err(e) => Err(e.into()),
    }
}

pub async fn change_password(
    db: &PgPool,
    user_id: Uuid,
    current_password: &str,
    new_password: &str,
) -> Result<(), ApiError> {
    if new_password.chars().count() < 6 {
        return Err(ApiError::Validation(vec![FieldError {
            field: "newPassword",
            message: PASSWORD_MIN,
        }]));
    }

    let Some(user) = User::find_by_id(db, user_id).await? else {
        return Err(ApiError::Unauthorized);
    };

    if !verify_password(current_password, &user.password_hash)? {
        warn!(user_id = %user.id, "password change with invalid current password");
        return Err(ApiError::InvalidCredentials);
    }

    let hash = hash_password(new_password)?;
    User::update_password_hash(db, user_id, &hash).await?;

    // Already-issued tokens stay valid until expiry; only future logins are
    // affected by the new hash.
    info!(user_id = %user.id, "password changed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_plain_addresses() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
    }

    #[test]
    fn email_regex_rejects_junk() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("two@@example.com "));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn normalize_lowercases_and_trims() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn registration_validation_reports_every_violation() {
        let errors = validate_registration("A", "not-an-email", "short");
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "email", "password"]);
    }

    #[test]
    fn registration_validation_passes_good_input() {
        assert!(validate_registration("Alice", "alice@x.com", "secret1").is_empty());
    }

    #[test]
    fn name_is_trimmed_before_length_check() {
        // 52 chars of padding around a single letter still fails.
        let errors = validate_registration("  a  ", "alice@x.com", "secret1");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
    }

    #[test]
    fn login_validation_requires_password() {
        let errors = validate_login("alice@x.com", "");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "password");
    }
}
