/// One step of the account life-cycle scenario.
///
/// Variants are declared in execution order; later steps rely on the
/// account state left behind by earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    RegisterNewUser,
    DuplicateRegistrationConflicts,
    RegistrationRejectsMalformedEmail,
    RegistrationRejectsMalformedPassword,
    UnusedEmailIsAvailable,
    UsedEmailIsUnavailable,
    AvailabilityRejectsMalformedEmail,
    LoginRejectsMalformedPassword,
    LoginRejectsWrongPassword,
    LoginRejectsUnknownEmail,
    LoginIssuesSessionCookies,
    RefreshIssuesNewTokens,
    RefreshRequiresRefreshHeader,
    LogoutClearsSessionCookies,
    EmailChangeRejectsUsedEmail,
    EmailChangeRejectsMalformedEmail,
    EmailChangeAcceptsFreshEmail,
    PasswordChangeRejectsMalformedPassword,
    PasswordChangeSavesAccessToken,
    ForgotPasswordHidesUnknownEmail,
    ForgotPasswordAcceptsKnownEmail,
    PasswordResetWithSavedToken,
    FinalAccountAcceptsNewCredentials,
}

impl Step {
    pub const ALL: [Step; 23] = [
        Step::RegisterNewUser,
        Step::DuplicateRegistrationConflicts,
        Step::RegistrationRejectsMalformedEmail,
        Step::RegistrationRejectsMalformedPassword,
        Step::UnusedEmailIsAvailable,
        Step::UsedEmailIsUnavailable,
        Step::AvailabilityRejectsMalformedEmail,
        Step::LoginRejectsMalformedPassword,
        Step::LoginRejectsWrongPassword,
        Step::LoginRejectsUnknownEmail,
        Step::LoginIssuesSessionCookies,
        Step::RefreshIssuesNewTokens,
        Step::RefreshRequiresRefreshHeader,
        Step::LogoutClearsSessionCookies,
        Step::EmailChangeRejectsUsedEmail,
        Step::EmailChangeRejectsMalformedEmail,
        Step::EmailChangeAcceptsFreshEmail,
        Step::PasswordChangeRejectsMalformedPassword,
        Step::PasswordChangeSavesAccessToken,
        Step::ForgotPasswordHidesUnknownEmail,
        Step::ForgotPasswordAcceptsKnownEmail,
        Step::PasswordResetWithSavedToken,
        Step::FinalAccountAcceptsNewCredentials,
    ];

    /// 1-based position in the scenario
    pub fn number(self) -> usize {
        self as usize + 1
    }

    pub fn last() -> Step {
        Step::FinalAccountAcceptsNewCredentials
    }

    pub fn description(self) -> &'static str {
        match self {
            Step::RegisterNewUser => "creates new user",
            Step::DuplicateRegistrationConflicts => "prevents creation of new user with used email",
            Step::RegistrationRejectsMalformedEmail => {
                "prevents creation of new user with invalid email"
            }
            Step::RegistrationRejectsMalformedPassword => {
                "prevents creation of new user with invalid password"
            }
            Step::UnusedEmailIsAvailable => "finds available email",
            Step::UsedEmailIsUnavailable => "finds unavailable email",
            Step::AvailabilityRejectsMalformedEmail => "prevents lookup of invalid email",
            Step::LoginRejectsMalformedPassword => "prevents login with invalid password",
            Step::LoginRejectsWrongPassword => "prevents login with wrong password",
            Step::LoginRejectsUnknownEmail => "prevents login with unregistered email",
            Step::LoginIssuesSessionCookies => "issues access and refresh token cookies",
            Step::RefreshIssuesNewTokens => "refreshes tokens from a refresh token",
            Step::RefreshRequiresRefreshHeader => "rejects refresh without the refresh header",
            Step::LogoutClearsSessionCookies => "logs the user out",
            Step::EmailChangeRejectsUsedEmail => "prevents email change to unavailable email",
            Step::EmailChangeRejectsMalformedEmail => "prevents email change to invalid email",
            Step::EmailChangeAcceptsFreshEmail => "changes the user email",
            Step::PasswordChangeRejectsMalformedPassword => {
                "prevents password change to invalid password"
            }
            Step::PasswordChangeSavesAccessToken => "changes the user password",
            Step::ForgotPasswordHidesUnknownEmail => "pretends to send forgot password email",
            Step::ForgotPasswordAcceptsKnownEmail => "sends forgot password email",
            Step::PasswordResetWithSavedToken => "resets password from token",
            Step::FinalAccountAcceptsNewCredentials => "logs in with the new email and password",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}. {}", self.number(), self.description())
    }
}
