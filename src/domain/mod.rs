mod credentials;
mod email_address;
mod password;

pub use credentials::{
    CredentialCategory, CredentialFixtures, EmailFixtures, FixtureError, PasswordFixtures,
};
pub use email_address::{EmailAddress, MIN_EMAIL_LENGTH};
pub use password::{
    MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH, PasswordValidationError, validate_password_length,
};
