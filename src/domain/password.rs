use secrecy::{ExposeSecret, Secret};

/// Minimum password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length, in characters
pub const MAX_PASSWORD_LENGTH: usize = 50;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum PasswordValidationError {
    #[error("shorter than {} characters", MIN_PASSWORD_LENGTH)]
    TooShort,
    #[error("longer than {} characters", MAX_PASSWORD_LENGTH)]
    TooLong,
}

/// Checks a password against the length bounds the users API enforces.
///
/// Length is counted in characters, not bytes.
pub fn validate_password_length(password: &Secret<String>) -> Result<(), PasswordValidationError> {
    let length = password.expose_secret().chars().count();

    if length < MIN_PASSWORD_LENGTH {
        return Err(PasswordValidationError::TooShort);
    }

    if length > MAX_PASSWORD_LENGTH {
        return Err(PasswordValidationError::TooLong);
    }

    Ok(())
}
