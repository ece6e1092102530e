//! Cookie and header names of the users API's cookie-based session.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Session cookie holding the access token
pub const ACCESS_TOKEN_COOKIE: &str = "access_token_cookie";

/// Session cookie holding the refresh token
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token_cookie";

/// Anti-forgery companion of the access token
pub const CSRF_ACCESS_COOKIE: &str = "csrf_access_token";

/// Anti-forgery companion of the refresh token
pub const CSRF_REFRESH_COOKIE: &str = "csrf_refresh_token";

/// Both session cookies, which are always issued and cleared together
pub const SESSION_COOKIES: [&str; 2] = [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE];

/// Header that carries the access anti-forgery token
pub const CSRF_ACCESS_HEADER: &str = "X-CSRF-TOKEN";

/// Header that carries the refresh anti-forgery token
pub const CSRF_REFRESH_HEADER: &str = "X-CSRF-REFRESH-TOKEN";

/// Anti-forgery tokens lifted from a login's cookies, ready to be sent as headers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AntiForgeryHeaders {
    access: HeaderValue,
    refresh: HeaderValue,
}

impl AntiForgeryHeaders {
    pub fn new(access: HeaderValue, refresh: HeaderValue) -> Self {
        Self { access, refresh }
    }

    pub fn access_token(&self) -> &HeaderValue {
        &self.access
    }

    pub fn refresh_token(&self) -> &HeaderValue {
        &self.refresh
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &HeaderValue)> {
        [
            (CSRF_ACCESS_HEADER, &self.access),
            (CSRF_REFRESH_HEADER, &self.refresh),
        ]
        .into_iter()
    }

    pub fn to_header_map(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(HeaderName::from_static("x-csrf-token"), self.access.clone());
        headers.insert(
            HeaderName::from_static("x-csrf-refresh-token"),
            self.refresh.clone(),
        );
        headers
    }
}
