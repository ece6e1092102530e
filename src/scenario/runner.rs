use crate::api_client::{EmailAvailability, UsersApiClient};
use crate::domain::CredentialCategory::{Changed, Invalid, Unused, Used, Valid};
use crate::domain::{CredentialFixtures, FixtureError};
use crate::login::{LoginError, login, login_as_default};
use crate::scenario::context::ScenarioContext;
use crate::scenario::step::Step;
use crate::session::{ACCESS_TOKEN_COOKIE, SESSION_COOKIES};
use crate::utils::error_chain_fmt;
use reqwest::{Response, StatusCode};
use secrecy::Secret;

#[derive(thiserror::Error)]
pub enum ScenarioError {
    #[error("The credential fixtures are inconsistent.")]
    InvalidFixtures(#[from] FixtureError),
    #[error("Scenario step {step} failed.")]
    StepFailed {
        step: Step,
        #[source]
        source: StepError,
    },
}

impl std::fmt::Debug for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ScenarioError {
    pub fn failed_step(&self) -> Option<Step> {
        match self {
            ScenarioError::StepFailed { step, .. } => Some(*step),
            ScenarioError::InvalidFixtures(_) => None,
        }
    }
}

#[derive(thiserror::Error)]
pub enum StepError {
    #[error("Expected status {expected}, got {actual}.")]
    UnexpectedStatus {
        expected: StatusCode,
        actual: StatusCode,
    },
    #[error("Expected the email to be reported as available: {expected}, got {actual}.")]
    AvailabilityMismatch { expected: bool, actual: bool },
    #[error("Expected the `{name}` cookie to be {}.", presence(.expected_present))]
    CookieMismatch {
        name: &'static str,
        expected_present: bool,
    },
    #[error("No access token was saved by an earlier step.")]
    MissingSavedToken,
    #[error(transparent)]
    Login(#[from] LoginError),
    #[error("Failed to reach the users API.")]
    Transport(#[from] reqwest::Error),
    #[error("Failed to decode the response body.")]
    Decode(#[source] reqwest::Error),
}

fn presence(expected_present: &bool) -> &'static str {
    if *expected_present {
        "present"
    } else {
        "absent"
    }
}

impl std::fmt::Debug for StepError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Steps that ran to completion, in order.
#[derive(Debug, Default)]
pub struct ScenarioReport {
    completed: Vec<Step>,
}

impl ScenarioReport {
    pub fn completed(&self) -> &[Step] {
        &self.completed
    }

    pub fn is_complete(&self) -> bool {
        self.completed.len() == Step::ALL.len()
    }
}

/// The account life-cycle scenario, run against a single users API session.
pub struct Scenario<'a> {
    client: &'a UsersApiClient,
    fixtures: &'a CredentialFixtures,
    context: ScenarioContext,
}

impl<'a> Scenario<'a> {
    pub fn new(client: &'a UsersApiClient, fixtures: &'a CredentialFixtures) -> Self {
        Self {
            client,
            fixtures,
            context: ScenarioContext::default(),
        }
    }

    pub fn context(&self) -> &ScenarioContext {
        &self.context
    }

    pub async fn run(&mut self) -> Result<ScenarioReport, ScenarioError> {
        self.run_through(Step::last()).await
    }

    /// Runs every step from the first one up to and including `last`,
    /// stopping at the first step whose expectations are not met.
    #[tracing::instrument(
        name = "Running the users API scenario",
        skip(self),
        fields(base_url = %self.client.base_url(), last_step = last.number())
    )]
    pub async fn run_through(&mut self, last: Step) -> Result<ScenarioReport, ScenarioError> {
        self.fixtures.check()?;

        let mut report = ScenarioReport::default();
        for step in Step::ALL.into_iter().take(last.number()) {
            if let Err(source) = self.execute(step).await {
                tracing::error!(error.cause_chain = ?source, "Scenario step {} failed", step);
                return Err(ScenarioError::StepFailed { step, source });
            }
            tracing::info!("Scenario step {} passed", step);
            report.completed.push(step);
        }
        Ok(report)
    }

    #[tracing::instrument(
        name = "Executing scenario step",
        skip(self),
        fields(step.number = step.number(), step.description = step.description())
    )]
    async fn execute(&mut self, step: Step) -> Result<(), StepError> {
        let client = self.client;
        let fixtures = self.fixtures;

        match step {
            Step::RegisterNewUser => {
                let response = client
                    .register(fixtures.email(Valid), fixtures.password(Valid))
                    .await?;
                expect_status(&response, StatusCode::CREATED)
            }
            Step::DuplicateRegistrationConflicts => {
                let response = client
                    .register(fixtures.email(Valid), fixtures.password(Valid))
                    .await?;
                expect_status(&response, StatusCode::CONFLICT)
            }
            Step::RegistrationRejectsMalformedEmail => {
                let response = client
                    .register(fixtures.email(Invalid), fixtures.password(Valid))
                    .await?;
                expect_status(&response, StatusCode::UNPROCESSABLE_ENTITY)
            }
            Step::RegistrationRejectsMalformedPassword => {
                let response = client
                    .register(fixtures.email(Valid), fixtures.password(Invalid))
                    .await?;
                expect_status(&response, StatusCode::UNPROCESSABLE_ENTITY)
            }
            Step::UnusedEmailIsAvailable => {
                let response = client
                    .check_email_availability(fixtures.email(Unused))
                    .await?;
                expect_availability(response, true).await
            }
            Step::UsedEmailIsUnavailable => {
                let response = client
                    .check_email_availability(fixtures.email(Used))
                    .await?;
                expect_availability(response, false).await
            }
            Step::AvailabilityRejectsMalformedEmail => {
                let response = client
                    .check_email_availability(fixtures.email(Invalid))
                    .await?;
                expect_status(&response, StatusCode::UNPROCESSABLE_ENTITY)
            }
            Step::LoginRejectsMalformedPassword => {
                let response = client
                    .create_auth_token(fixtures.email(Valid), fixtures.password(Invalid))
                    .await?;
                expect_status(&response, StatusCode::UNPROCESSABLE_ENTITY)
            }
            Step::LoginRejectsWrongPassword => {
                let response = client
                    .create_auth_token(fixtures.email(Used), fixtures.password(Unused))
                    .await?;
                expect_status(&response, StatusCode::UNAUTHORIZED)
            }
            Step::LoginRejectsUnknownEmail => {
                let response = client
                    .create_auth_token(fixtures.email(Unused), fixtures.password(Used))
                    .await?;
                expect_status(&response, StatusCode::UNAUTHORIZED)
            }
            Step::LoginIssuesSessionCookies => {
                let response = client
                    .create_auth_token(fixtures.email(Used), fixtures.password(Used))
                    .await?;
                expect_status(&response, StatusCode::CREATED)?;
                expect_session_cookies(client, true)
            }
            Step::RefreshIssuesNewTokens => {
                let headers = login_as_default(client, fixtures).await?;
                let response = client.refresh_auth_token(Some(&headers)).await?;
                expect_status(&response, StatusCode::NO_CONTENT)
            }
            Step::RefreshRequiresRefreshHeader => {
                login_as_default(client, fixtures).await?;
                let response = client.refresh_auth_token(None).await?;
                expect_status(&response, StatusCode::UNAUTHORIZED)
            }
            Step::LogoutClearsSessionCookies => {
                login_as_default(client, fixtures).await?;
                let response = client.revoke_auth_token().await?;
                expect_status(&response, StatusCode::NO_CONTENT)?;
                expect_session_cookies(client, false)
            }
            Step::EmailChangeRejectsUsedEmail => {
                let headers = login_as_default(client, fixtures).await?;
                let response = client.change_email(&headers, fixtures.email(Used)).await?;
                expect_status(&response, StatusCode::CONFLICT)?;
                expect_session_cookies(client, true)
            }
            Step::EmailChangeRejectsMalformedEmail => {
                let headers = login_as_default(client, fixtures).await?;
                let response = client
                    .change_email(&headers, fixtures.email(Invalid))
                    .await?;
                expect_status(&response, StatusCode::UNPROCESSABLE_ENTITY)?;
                expect_session_cookies(client, true)
            }
            Step::EmailChangeAcceptsFreshEmail => {
                let headers = login_as_default(client, fixtures).await?;
                let response = client
                    .change_email(&headers, fixtures.email(Changed))
                    .await?;
                expect_status(&response, StatusCode::CREATED)?;
                expect_session_cookies(client, true)
            }
            Step::PasswordChangeRejectsMalformedPassword => {
                let headers =
                    login(client, fixtures.email(Changed), fixtures.password(Used)).await?;
                let response = client
                    .change_password(&headers, fixtures.password(Invalid))
                    .await?;
                expect_status(&response, StatusCode::UNPROCESSABLE_ENTITY)?;
                expect_session_cookies(client, true)
            }
            Step::PasswordChangeSavesAccessToken => {
                let headers =
                    login(client, fixtures.email(Changed), fixtures.password(Used)).await?;
                let response = client
                    .change_password(&headers, fixtures.password(Changed))
                    .await?;
                expect_status(&response, StatusCode::NO_CONTENT)?;
                expect_session_cookies(client, true)?;
                let token = client
                    .cookie(ACCESS_TOKEN_COOKIE)
                    .ok_or(StepError::CookieMismatch {
                        name: ACCESS_TOKEN_COOKIE,
                        expected_present: true,
                    })?;
                self.context.save_access_token(Secret::new(token));
                Ok(())
            }
            Step::ForgotPasswordHidesUnknownEmail => {
                let response = client
                    .request_password_reset(fixtures.email(Unused))
                    .await?;
                expect_status(&response, StatusCode::CREATED)
            }
            Step::ForgotPasswordAcceptsKnownEmail => {
                let response = client
                    .request_password_reset(fixtures.email(Used))
                    .await?;
                expect_status(&response, StatusCode::CREATED)
            }
            Step::PasswordResetWithSavedToken => {
                let token = self
                    .context
                    .saved_access_token()
                    .ok_or(StepError::MissingSavedToken)?;
                let response = client
                    .reset_password(fixtures.password(Unused), token)
                    .await?;
                expect_status(&response, StatusCode::NO_CONTENT)
            }
            Step::FinalAccountAcceptsNewCredentials => {
                let response = client
                    .create_auth_token(fixtures.email(Changed), fixtures.password(Unused))
                    .await?;
                expect_status(&response, StatusCode::CREATED)
            }
        }
    }
}

fn expect_status(response: &Response, expected: StatusCode) -> Result<(), StepError> {
    let actual = response.status();
    if actual != expected {
        return Err(StepError::UnexpectedStatus { expected, actual });
    }
    Ok(())
}

async fn expect_availability(response: Response, expected: bool) -> Result<(), StepError> {
    expect_status(&response, StatusCode::OK)?;
    let EmailAvailability { available } = response
        .json::<EmailAvailability>()
        .await
        .map_err(StepError::Decode)?;
    if available != expected {
        return Err(StepError::AvailabilityMismatch {
            expected,
            actual: available,
        });
    }
    Ok(())
}

fn expect_session_cookies(client: &UsersApiClient, present: bool) -> Result<(), StepError> {
    for name in SESSION_COOKIES {
        if client.has_cookie(name) != present {
            return Err(StepError::CookieMismatch {
                name,
                expected_present: present,
            });
        }
    }
    Ok(())
}
