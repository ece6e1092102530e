use crate::domain::email_address::EmailAddress;
use crate::domain::password::{PasswordValidationError, validate_password_length};
use secrecy::{ExposeSecret, Secret};

/// The role a fixture value plays in the scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialCategory {
    /// Well-formed, registered at the start of the scenario
    Valid,
    /// Malformed, rejected with 422 wherever it is sent
    Invalid,
    /// Belongs to an account that already exists
    Used,
    /// Well-formed but never registered
    Unused,
    /// The value an email or password is mutated to
    Changed,
}

impl CredentialCategory {
    pub const ALL: [CredentialCategory; 5] = [
        CredentialCategory::Valid,
        CredentialCategory::Invalid,
        CredentialCategory::Used,
        CredentialCategory::Unused,
        CredentialCategory::Changed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialCategory::Valid => "valid",
            CredentialCategory::Invalid => "invalid",
            CredentialCategory::Used => "used",
            CredentialCategory::Unused => "unused",
            CredentialCategory::Changed => "changed",
        }
    }
}

impl std::fmt::Display for CredentialCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct EmailFixtures {
    pub valid: String,
    pub invalid: String,
    pub used: String,
    pub unused: String,
    pub changed: String,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct PasswordFixtures {
    pub valid: Secret<String>,
    pub invalid: Secret<String>,
    pub used: Secret<String>,
    pub unused: Secret<String>,
    pub changed: Secret<String>,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct CredentialFixtures {
    pub email: EmailFixtures,
    pub password: PasswordFixtures,
}

#[derive(thiserror::Error, Debug)]
pub enum FixtureError {
    #[error("The `{category}` email fixture is malformed: {reason}")]
    MalformedEmail {
        category: CredentialCategory,
        reason: String,
    },
    #[error("The `{category}` password fixture is {reason}")]
    MalformedPassword {
        category: CredentialCategory,
        reason: PasswordValidationError,
    },
    #[error("The `invalid` email fixture `{0}` is well-formed")]
    WellFormedInvalidEmail(String),
    #[error("The `invalid` password fixture is well-formed")]
    WellFormedInvalidPassword,
    #[error("The `valid` and `used` {field} fixtures must be the same")]
    UnregisteredUsedFixture { field: &'static str },
    #[error("The `{first}` and `{second}` {field} fixtures must differ")]
    IndistinctFixtures {
        field: &'static str,
        first: CredentialCategory,
        second: CredentialCategory,
    },
}

impl CredentialFixtures {
    pub fn email(&self, category: CredentialCategory) -> &str {
        match category {
            CredentialCategory::Valid => &self.email.valid,
            CredentialCategory::Invalid => &self.email.invalid,
            CredentialCategory::Used => &self.email.used,
            CredentialCategory::Unused => &self.email.unused,
            CredentialCategory::Changed => &self.email.changed,
        }
    }

    pub fn password(&self, category: CredentialCategory) -> &Secret<String> {
        match category {
            CredentialCategory::Valid => &self.password.valid,
            CredentialCategory::Invalid => &self.password.invalid,
            CredentialCategory::Used => &self.password.used,
            CredentialCategory::Unused => &self.password.unused,
            CredentialCategory::Changed => &self.password.changed,
        }
    }

    /// Checks that every category holds the kind of value the scenario expects of it.
    pub fn check(&self) -> Result<(), FixtureError> {
        for category in CredentialCategory::ALL {
            let email = EmailAddress::parse(self.email(category).to_string());
            let password = validate_password_length(self.password(category));
            if category == CredentialCategory::Invalid {
                if email.is_ok() {
                    return Err(FixtureError::WellFormedInvalidEmail(
                        self.email.invalid.clone(),
                    ));
                }
                if password.is_ok() {
                    return Err(FixtureError::WellFormedInvalidPassword);
                }
                continue;
            }
            email.map_err(|reason| FixtureError::MalformedEmail { category, reason })?;
            password.map_err(|reason| FixtureError::MalformedPassword { category, reason })?;
        }

        if self.email.valid != self.email.used {
            return Err(FixtureError::UnregisteredUsedFixture { field: "email" });
        }
        if self.password.valid.expose_secret() != self.password.used.expose_secret() {
            return Err(FixtureError::UnregisteredUsedFixture { field: "password" });
        }

        use CredentialCategory::{Changed, Unused, Used};
        for (first, second) in [(Used, Unused), (Used, Changed), (Unused, Changed)] {
            if self.email(first) == self.email(second) {
                return Err(FixtureError::IndistinctFixtures {
                    field: "email",
                    first,
                    second,
                });
            }
            if self.password(first).expose_secret() == self.password(second).expose_secret() {
                return Err(FixtureError::IndistinctFixtures {
                    field: "password",
                    first,
                    second,
                });
            }
        }
        Ok(())
    }
}
