use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::error;

use crate::errors::ApiError;
use crate::users::dto::{CreateUserRequest, PatchUserRequest, UpdateUserRequest};
use crate::users::repo_types::User;

const STATUS_ACTIVE: &str = "active";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Current time in the `YYYY-MM-DD hh:mm:ss` shape the table stores.
pub fn now_db_format() -> String {
    let format = time::macros::format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    );
    time::OffsetDateTime::now_utc()
        .format(&format)
        .unwrap_or_default()
}

pub fn hash_password(plain: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            ApiError::Internal
        })?
        .to_string();
    Ok(hash)
}

/// Validate a creation request and turn it into a ready-to-save entity:
/// email normalized, status defaulted, date stamped, password hashed.
/// `id` stays 0 until the repository assigns it.
pub fn build_new_user(mut payload: CreateUserRequest) -> Result<User, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    if !is_valid_email(&payload.email) {
        return Err(ApiError::BadRequest("invalid email address".into()));
    }
    if payload.password.is_empty() {
        return Err(ApiError::BadRequest("invalid password".into()));
    }

    let status = if payload.status.is_empty() {
        STATUS_ACTIVE.to_string()
    } else {
        payload.status
    };

    Ok(User {
        id: 0,
        first_name: payload.first_name.trim().to_string(),
        last_name: payload.last_name.trim().to_string(),
        email: payload.email,
        date_created: now_db_format(),
        status,
        password: hash_password(&payload.password)?,
    })
}

/// Overwrite every mutable field from a PUT body.
pub fn apply_update(current: &mut User, payload: UpdateUserRequest) -> Result<(), ApiError> {
    let email = payload.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ApiError::BadRequest("invalid email address".into()));
    }
    current.first_name = payload.first_name.trim().to_string();
    current.last_name = payload.last_name.trim().to_string();
    current.email = email;
    current.status = payload.status;
    Ok(())
}

/// Body check a PATCH handler can run before fetching the current row.
pub fn validate_patch(payload: &PatchUserRequest) -> Result<(), ApiError> {
    if let Some(email) = &payload.email {
        if !is_valid_email(&email.trim().to_lowercase()) {
            return Err(ApiError::BadRequest("invalid email address".into()));
        }
    }
    Ok(())
}

/// Overlay only the fields a PATCH body carries.
pub fn apply_patch(current: &mut User, payload: PatchUserRequest) -> Result<(), ApiError> {
    if let Some(email) = payload.email {
        let email = email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(ApiError::BadRequest("invalid email address".into()));
        }
        current.email = email;
    }
    if let Some(first_name) = payload.first_name {
        current.first_name = first_name.trim().to_string();
    }
    if let Some(last_name) = payload.last_name {
        current.last_name = last_name.trim().to_string();
    }
    if let Some(status) = payload.status {
        current.status = status;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreateUserRequest {
        CreateUserRequest {
            first_name: "Ana".into(),
            last_name: "Lee".into(),
            email: "Ana@X.com ".into(),
            password: "p".into(),
            status: String::new(),
        }
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("ana@x.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn now_db_format_shape() {
        let now = now_db_format();
        // "2024-01-01 00:00:00"
        assert_eq!(now.len(), 19);
        assert_eq!(&now[4..5], "-");
        assert_eq!(&now[10..11], " ");
        assert_eq!(&now[13..14], ":");
    }

    #[test]
    fn build_new_user_normalizes_and_defaults() {
        let user = build_new_user(create_request()).expect("build user");
        assert_eq!(user.id, 0);
        assert_eq!(user.email, "ana@x.com");
        assert_eq!(user.status, "active");
        assert!(!user.date_created.is_empty());
        assert_ne!(user.password, "p"); // stored hashed
    }

    #[test]
    fn build_new_user_rejects_bad_input() {
        let mut payload = create_request();
        payload.email = "nope".into();
        let err = build_new_user(payload).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let mut payload = create_request();
        payload.password = String::new();
        let err = build_new_user(payload).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn put_overwrites_everything() {
        let mut user = build_new_user(create_request()).expect("build user");
        let date_created = user.date_created.clone();
        apply_update(
            &mut user,
            UpdateUserRequest {
                first_name: "Bo".into(),
                last_name: "Kim".into(),
                email: "bo@x.com".into(),
                status: "inactive".into(),
            },
        )
        .expect("apply update");
        assert_eq!(user.first_name, "Bo");
        assert_eq!(user.email, "bo@x.com");
        assert_eq!(user.status, "inactive");
        assert_eq!(user.date_created, date_created); // untouched
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut user = build_new_user(create_request()).expect("build user");
        apply_patch(
            &mut user,
            PatchUserRequest {
                last_name: Some("Lee2".into()),
                status: Some("inactive".into()),
                ..Default::default()
            },
        )
        .expect("apply patch");
        assert_eq!(user.first_name, "Ana");
        assert_eq!(user.last_name, "Lee2");
        assert_eq!(user.email, "ana@x.com");
        assert_eq!(user.status, "inactive");
    }

    #[test]
    fn patch_without_status_keeps_stored_status() {
        // A row fetched for the overwrite flows arrives with status
        // hydrated and password empty; a body that omits status must hand
        // the stored value on to the update statement, not "".
        let mut current = User {
            id: 1,
            first_name: "Ana".into(),
            last_name: "Lee".into(),
            email: "ana@x.com".into(),
            date_created: "2024-01-01 00:00:00".into(),
            status: "active".into(),
            password: String::new(),
        };
        apply_patch(
            &mut current,
            PatchUserRequest {
                last_name: Some("Lee2".into()),
                ..Default::default()
            },
        )
        .expect("apply patch");
        assert_eq!(current.last_name, "Lee2");
        assert_eq!(current.status, "active");
    }

    #[test]
    fn validate_patch_checks_email_shape() {
        assert!(validate_patch(&PatchUserRequest::default()).is_ok());
        assert!(validate_patch(&PatchUserRequest {
            email: Some("ana@x.com".into()),
            ..Default::default()
        })
        .is_ok());
        let err = validate_patch(&PatchUserRequest {
            email: Some("broken".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn patch_rejects_invalid_email() {
        let mut user = build_new_user(create_request()).expect("build user");
        let err = apply_patch(
            &mut user,
            PatchUserRequest {
                email: Some("broken".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(user.email, "ana@x.com"); // unchanged on failure
    }
}
