// ── Client-side form validation ──
//
// Login and registration forms are checked before anything is sent. A
// failing form yields one message per field, in display order, and never
// reaches the network.

use std::borrow::Cow;

use indexmap::IndexMap;
use mapper_api::ApiError;
use mapper_api::types::{LoginCredentials, RegisterData, UserRole};
use serde_json::Value;
use validator::{Validate, ValidationError, ValidationErrors};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Field name to first failing message, in form order.
pub type FieldErrors = IndexMap<&'static str, String>;

// ── Login ────────────────────────────────────────────────────────────

#[derive(Clone, Default, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl LoginForm {
    const FIELDS: &'static [&'static str] = &["username", "password"];

    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Validate and produce the request body.
    pub fn submit(&self) -> Result<LoginCredentials, FieldErrors> {
        self.validate()
            .map_err(|e| collect_field_errors(&e, Self::FIELDS))?;
        Ok(LoginCredentials {
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}

// ── Register ─────────────────────────────────────────────────────────

#[derive(Clone, Default, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(
        length(min = 1, message = "Email is required"),
        custom(function = "email_format")
    )]
    pub email: String,
    #[validate(
        length(min = 1, message = "Password is required"),
        custom(function = "password_length")
    )]
    pub password: String,
    #[validate(required(message = "Role is required"))]
    pub role: Option<UserRole>,
}

impl std::fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl RegisterForm {
    const FIELDS: &'static [&'static str] = &[
        "first_name",
        "last_name",
        "username",
        "email",
        "password",
        "role",
    ];

    pub fn submit(&self) -> Result<RegisterData, FieldErrors> {
        self.validate()
            .map_err(|e| collect_field_errors(&e, Self::FIELDS))?;
        let Some(role) = self.role else {
            return Err(FieldErrors::from([("role", "Role is required".to_owned())]));
        };
        Ok(RegisterData {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role,
        })
    }
}

/// `local@domain.tld` with a two-letter-or-longer alphabetic TLD.
/// Empty input is left to the required check.
///
/// Case-insensitive equivalent of `^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$`.
/// `validator`'s own `email` rule accepts dotless domains such as
/// `alice@example`, which this form rejects.
fn email_format(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || is_email(email) {
        return Ok(());
    }
    Err(ValidationError::new("email").with_message(Cow::Borrowed("Invalid email address")))
}

fn is_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c));
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    let host_ok = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    let tld_ok = tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic());
    local_ok && host_ok && tld_ok
}

fn password_length(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() || password.chars().count() >= MIN_PASSWORD_LENGTH {
        return Ok(());
    }
    Err(ValidationError::new("length").with_message(Cow::Borrowed(
        "Password must be at least 8 characters",
    )))
}

// ── Error shaping ────────────────────────────────────────────────────

fn collect_field_errors(errors: &ValidationErrors, order: &[&'static str]) -> FieldErrors {
    let by_field = errors.field_errors();
    order
        .iter()
        .filter_map(|field| {
            let first = by_field.get(*field)?.first()?;
            let message = first
                .message
                .as_ref()
                .map_or_else(|| first.code.to_string(), ToString::to_string);
            Some((*field, message))
        })
        .collect()
}

/// Wrap field errors as a `VALIDATION_ERROR` request error.
pub fn validation_error(fields: &FieldErrors) -> ApiError {
    let details: serde_json::Map<String, Value> = fields
        .iter()
        .map(|(k, v)| ((*k).to_owned(), Value::String(v.clone())))
        .collect();
    ApiError::validation(Value::Object(details))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_login_reports_both_fields() {
        let errors = LoginForm::default().submit().unwrap_err();
        assert_eq!(
            errors.into_iter().collect::<Vec<_>>(),
            vec![
                ("username", "Username is required".to_owned()),
                ("password", "Password is required".to_owned()),
            ]
        );
    }

    #[test]
    fn filled_login_produces_credentials() {
        let creds = LoginForm::new("alice", "pw").submit().unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "pw");
    }

    #[test]
    fn empty_register_reports_required_in_form_order() {
        let errors = RegisterForm::default().submit().unwrap_err();
        assert_eq!(
            errors.values().map(String::as_str).collect::<Vec<_>>(),
            vec![
                "First name is required",
                "Last name is required",
                "Username is required",
                "Email is required",
                "Password is required",
                "Role is required",
            ]
        );
    }

    #[test]
    fn register_checks_email_and_password_length() {
        let form = RegisterForm {
            first_name: "Alice".into(),
            last_name: "Ng".into(),
            username: "alice".into(),
            email: "alice@example".into(),
            password: "short".into(),
            role: Some(UserRole::Operator),
        };
        let errors = form.submit().unwrap_err();
        assert_eq!(errors["email"], "Invalid email address");
        assert_eq!(errors["password"], "Password must be at least 8 characters");
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn valid_register_form_produces_body() {
        let form = RegisterForm {
            first_name: "Alice".into(),
            last_name: "Ng".into(),
            username: "alice".into(),
            email: "Alice.Ng+lab@Example.NET".into(),
            password: "correct horse".into(),
            role: Some(UserRole::NetworkEngineer),
        };
        let data = form.submit().unwrap();
        assert_eq!(data.role, UserRole::NetworkEngineer);
        assert_eq!(data.email, "Alice.Ng+lab@Example.NET");
    }

    #[test]
    fn email_shapes() {
        assert!(is_email("a@b.io"));
        assert!(!is_email("a@b.c"));
        assert!(!is_email("@b.io"));
        assert!(!is_email("a@.io"));
        assert!(!is_email("a b@c.io"));
        assert!(!is_email("nobody"));
        assert!(!is_email("alice@example"));
        assert!(!is_email("a@b.c0m"));
        assert!(is_email("ops@core.lab.example.net"));
    }

    #[test]
    fn validation_error_carries_fields() {
        let errors = LoginForm::new("", "pw").submit().unwrap_err();
        let err = validation_error(&errors);
        assert_eq!(err.code, "VALIDATION_ERROR");
        assert_eq!(
            err.details.unwrap()["username"],
            Value::String("Username is required".into())
        );
    }
}
