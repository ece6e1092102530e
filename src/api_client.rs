use crate::session::AntiForgeryHeaders;
use crate::utils::error_chain_fmt;
use cookie::Cookie;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Response, Url};
use secrecy::{ExposeSecret, Secret};
use std::sync::Arc;

/// Typed access to the users API over one cookie-carrying HTTP session.
#[derive(Clone, Debug)]
pub struct UsersApiClient {
    base_url: String,
    cookie_url: Url,
    http_client: Client,
    cookie_jar: Arc<Jar>,
}

#[derive(thiserror::Error)]
pub enum ApiClientError {
    #[error("`{url}` is not a valid users API base url: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("Failed to build the HTTP client.")]
    Build(#[from] reqwest::Error),
}

impl std::fmt::Debug for ApiClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(serde::Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(serde::Serialize)]
struct EmailBody<'a> {
    email: &'a str,
}

#[derive(serde::Serialize)]
struct PasswordBody<'a> {
    password: &'a str,
}

#[derive(serde::Serialize)]
struct PasswordResetBody<'a> {
    password: &'a str,
    token: &'a str,
}

/// Body of `POST /users/email/availability`
#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmailAvailability {
    pub available: bool,
}

impl UsersApiClient {
    pub fn new(base_url: &str, timeout: std::time::Duration) -> Result<Self, ApiClientError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let cookie_url = Url::parse(&base_url).map_err(|e| ApiClientError::InvalidBaseUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;
        let cookie_jar = Arc::new(Jar::default());
        let http_client = Client::builder()
            .cookie_provider(Arc::clone(&cookie_jar))
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url,
            cookie_url,
            http_client,
            cookie_jar,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[tracing::instrument(name = "Registering a user", skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        password: &Secret<String>,
    ) -> Result<Response, reqwest::Error> {
        self.http_client
            .post(format!("{}/users", self.base_url))
            .json(&CredentialsBody {
                email,
                password: password.expose_secret(),
            })
            .send()
            .await
    }

    #[tracing::instrument(name = "Checking email availability", skip(self))]
    pub async fn check_email_availability(&self, email: &str) -> Result<Response, reqwest::Error> {
        self.http_client
            .post(format!("{}/users/email/availability", self.base_url))
            .json(&EmailBody { email })
            .send()
            .await
    }

    #[tracing::instrument(name = "Requesting an auth token", skip(self, password))]
    pub async fn create_auth_token(
        &self,
        email: &str,
        password: &Secret<String>,
    ) -> Result<Response, reqwest::Error> {
        self.http_client
            .post(format!("{}/users/auth-token", self.base_url))
            .json(&CredentialsBody {
                email,
                password: password.expose_secret(),
            })
            .send()
            .await
    }

    /// `None` sends the refresh request without any anti-forgery header.
    #[tracing::instrument(name = "Refreshing the auth token", skip_all)]
    pub async fn refresh_auth_token(
        &self,
        headers: Option<&AntiForgeryHeaders>,
    ) -> Result<Response, reqwest::Error> {
        let mut request = self
            .http_client
            .put(format!("{}/users/auth-token", self.base_url));
        if let Some(headers) = headers {
            request = request.headers(headers.to_header_map());
        }
        request.send().await
    }

    #[tracing::instrument(name = "Revoking the auth token", skip(self))]
    pub async fn revoke_auth_token(&self) -> Result<Response, reqwest::Error> {
        self.http_client
            .delete(format!("{}/users/auth-token", self.base_url))
            .send()
            .await
    }

    #[tracing::instrument(name = "Changing the account email", skip(self, headers))]
    pub async fn change_email(
        &self,
        headers: &AntiForgeryHeaders,
        email: &str,
    ) -> Result<Response, reqwest::Error> {
        self.http_client
            .put(format!("{}/users/email", self.base_url))
            .headers(headers.to_header_map())
            .json(&EmailBody { email })
            .send()
            .await
    }

    #[tracing::instrument(name = "Changing the account password", skip_all)]
    pub async fn change_password(
        &self,
        headers: &AntiForgeryHeaders,
        password: &Secret<String>,
    ) -> Result<Response, reqwest::Error> {
        self.http_client
            .put(format!("{}/users/password", self.base_url))
            .headers(headers.to_header_map())
            .json(&PasswordBody {
                password: password.expose_secret(),
            })
            .send()
            .await
    }

    #[tracing::instrument(name = "Requesting a password reset email", skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<Response, reqwest::Error> {
        self.http_client
            .post(format!("{}/users/password/forgot", self.base_url))
            .json(&EmailBody { email })
            .send()
            .await
    }

    #[tracing::instrument(name = "Resetting the password from a token", skip_all)]
    pub async fn reset_password(
        &self,
        password: &Secret<String>,
        token: &Secret<String>,
    ) -> Result<Response, reqwest::Error> {
        self.http_client
            .put(format!("{}/users/password/forgot", self.base_url))
            .json(&PasswordResetBody {
                password: password.expose_secret(),
                token: token.expose_secret(),
            })
            .send()
            .await
    }

    /// Current value of a cookie the users API has set on this session.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let header = self.cookie_jar.cookies(&self.cookie_url)?;
        let header = header.to_str().ok()?;
        Cookie::split_parse(header)
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == name)
            .map(|cookie| cookie.value().to_string())
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookie(name).is_some()
    }
}
