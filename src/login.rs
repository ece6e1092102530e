use crate::api_client::UsersApiClient;
use crate::domain::{CredentialCategory, CredentialFixtures};
use crate::session::{AntiForgeryHeaders, CSRF_ACCESS_COOKIE, CSRF_REFRESH_COOKIE};
use crate::utils::error_chain_fmt;
use reqwest::StatusCode;
use reqwest::header::HeaderValue;
use secrecy::Secret;

#[derive(thiserror::Error)]
pub enum LoginError {
    #[error("The credential exchange was rejected with status {0}.")]
    Rejected(StatusCode),
    #[error("The credential exchange did not set the `{0}` cookie.")]
    MissingCookie(&'static str),
    #[error("The `{0}` cookie cannot be sent as a header value.")]
    MalformedCookie(&'static str),
    #[error("Failed to reach the users API.")]
    Transport(#[from] reqwest::Error),
}

impl std::fmt::Debug for LoginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Exchanges credentials for a session and returns the anti-forgery headers
/// that authenticated, state-mutating calls must carry.
///
/// The session cookies themselves stay in the client's jar.
/// Anything but `201 Created` fails before cookies are read, so stale tokens
/// from an earlier login are never handed out.
#[tracing::instrument(name = "Logging in to the users API", skip(client, password))]
pub async fn login(
    client: &UsersApiClient,
    email: &str,
    password: &Secret<String>,
) -> Result<AntiForgeryHeaders, LoginError> {
    let response = client.create_auth_token(email, password).await?;
    let status = response.status();
    if status != StatusCode::CREATED {
        return Err(LoginError::Rejected(status));
    }

    let access = anti_forgery_token(client, CSRF_ACCESS_COOKIE)?;
    let refresh = anti_forgery_token(client, CSRF_REFRESH_COOKIE)?;
    Ok(AntiForgeryHeaders::new(access, refresh))
}

/// Logs in with the already registered (`used`) credential pair.
pub async fn login_as_default(
    client: &UsersApiClient,
    fixtures: &CredentialFixtures,
) -> Result<AntiForgeryHeaders, LoginError> {
    login(
        client,
        fixtures.email(CredentialCategory::Used),
        fixtures.password(CredentialCategory::Used),
    )
    .await
}

fn anti_forgery_token(
    client: &UsersApiClient,
    cookie: &'static str,
) -> Result<HeaderValue, LoginError> {
    let value = client
        .cookie(cookie)
        .ok_or(LoginError::MissingCookie(cookie))?;
    HeaderValue::from_str(&value).map_err(|_| LoginError::MalformedCookie(cookie))
}
