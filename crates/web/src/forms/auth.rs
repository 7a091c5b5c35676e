//! Sign-up and login forms.

use serde::Deserialize;

use super::{FormErrors, Rule, USERNAME_TAKEN_MESSAGE};
use crate::db::{RepositoryError, UserRepository};
use crate::middleware::CsrfProtected;

const USERNAME: &[Rule<'static>] = &[Rule::Required, Rule::Length { min: 3, max: 50 }];
const PASSWORD: &[Rule<'static>] = &[Rule::Required];

/// Validated credentials. The password is kept exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// New account fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignUpForm {
    pub csrf_token: String,
    pub username: String,
    pub password: String,
}

impl SignUpForm {
    /// Validate every field, including that the username is not taken.
    ///
    /// The outer error is a repository failure; the inner one carries the
    /// per-field messages.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the username lookup fails.
    pub async fn validate<U>(
        &self,
        users: &U,
    ) -> Result<Result<Credentials, FormErrors>, RepositoryError>
    where
        U: UserRepository + ?Sized,
    {
        let mut errors = FormErrors::new();
        let username = self.username.trim();
        if errors.check("username", username, USERNAME)
            && users.get_user_by_username(username).await?.is_some()
        {
            errors.insert("username", USERNAME_TAKEN_MESSAGE);
        }
        errors.check("password", &self.password, PASSWORD);

        Ok(errors.into_result(|| Credentials {
            username: username.to_owned(),
            password: self.password.clone(),
        }))
    }

    /// The form to re-render: keeps the username, drops the password.
    #[must_use]
    pub fn redisplay(&self) -> Self {
        Self {
            csrf_token: String::new(),
            username: self.username.clone(),
            password: String::new(),
        }
    }
}

impl CsrfProtected for SignUpForm {
    fn csrf_token(&self) -> &str {
        &self.csrf_token
    }
}

/// Login fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub csrf_token: String,
    pub username: String,
    pub password: String,
}

impl LoginForm {
    /// Validate field shapes. Whether the credentials are correct is decided
    /// by the auth service.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages if any field fails.
    pub fn validate(&self) -> Result<Credentials, FormErrors> {
        let mut errors = FormErrors::new();
        let username = self.username.trim();
        errors.check("username", username, USERNAME);
        errors.check("password", &self.password, PASSWORD);

        errors.into_result(|| Credentials {
            username: username.to_owned(),
            password: self.password.clone(),
        })
    }

    /// The form to re-render: keeps the username, drops the password.
    #[must_use]
    pub fn redisplay(&self) -> Self {
        Self {
            csrf_token: String::new(),
            username: self.username.clone(),
            password: String::new(),
        }
    }
}

impl CsrfProtected for LoginForm {
    fn csrf_token(&self) -> &str {
        &self.csrf_token
    }
}
