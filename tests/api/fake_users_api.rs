//! In-memory stand-in for the users API, mounted on a `wiremock` server.
//!
//! It keeps just enough state (accounts, issued tokens) to answer the
//! scenario the way the real service does: schema failures are 422, unknown
//! or mismatched credentials are 401, duplicate emails are 409 and the
//! session lives in four cookies.

use cookie::Cookie;
use secrecy::Secret;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use users_api_harness::domain::{EmailAddress, validate_password_length};
use users_api_harness::session::{
    ACCESS_TOKEN_COOKIE, CSRF_ACCESS_COOKIE, CSRF_ACCESS_HEADER, CSRF_REFRESH_COOKIE,
    CSRF_REFRESH_HEADER, REFRESH_TOKEN_COOKIE,
};
use uuid::Uuid;
use wiremock::{Request, Respond, ResponseTemplate};

#[derive(Clone, Default)]
pub struct FakeUsersApi {
    state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    accounts: Vec<Account>,
    access_tokens: Vec<Grant>,
    refresh_tokens: Vec<Grant>,
    password_reset_emails: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct Account {
    pub user_id: u64,
    pub email: String,
    pub password: String,
}

struct Grant {
    token: String,
    csrf: String,
    user_id: u64,
}

impl FakeUsersApi {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn seed_account(&self, email: &str, password: &str) {
        let mut state = self.state();
        let user_id = state.accounts.len() as u64 + 1;
        state.accounts.push(Account {
            user_id,
            email: normalize(email),
            password: password.to_string(),
        });
    }

    pub fn account(&self, email: &str) -> Option<Account> {
        self.state().find_by_email(email).cloned()
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.state().accounts.clone()
    }

    /// Addresses a reset email would actually have been sent to
    pub fn password_reset_emails(&self) -> Vec<String> {
        self.state().password_reset_emails.clone()
    }
}

impl Respond for FakeUsersApi {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut state = self.state();
        match (request.method.as_str(), request.url.path()) {
            ("POST", "/users") => state.register(request),
            ("POST", "/users/email/availability") => state.email_availability(request),
            ("POST", "/users/auth-token") => state.create_auth_token(request),
            ("PUT", "/users/auth-token") => state.refresh_auth_token(request),
            ("DELETE", "/users/auth-token") => revoke_auth_token(),
            ("PUT", "/users/email") => state.change_email(request),
            ("PUT", "/users/password") => state.change_password(request),
            ("POST", "/users/password/forgot") => state.forgot_password(request),
            ("PUT", "/users/password/forgot") => state.reset_password(request),
            _ => ResponseTemplate::new(404),
        }
    }
}

impl State {
    fn find_by_email(&self, email: &str) -> Option<&Account> {
        let email = normalize(email);
        self.accounts.iter().find(|a| a.email == email)
    }

    fn find_by_id(&mut self, user_id: u64) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.user_id == user_id)
    }

    fn register(&mut self, request: &Request) -> ResponseTemplate {
        let Some((email, password)) = credentials(request) else {
            return ResponseTemplate::new(422);
        };
        if self.find_by_email(&email).is_some() {
            return ResponseTemplate::new(409);
        }
        let user_id = self.accounts.len() as u64 + 1;
        self.accounts.push(Account {
            user_id,
            email: normalize(&email),
            password,
        });
        ResponseTemplate::new(201)
            .set_body_json(serde_json::json!({ "userId": user_id }))
    }

    fn email_availability(&mut self, request: &Request) -> ResponseTemplate {
        let Some(email) = email(request) else {
            return ResponseTemplate::new(422);
        };
        let available = self.find_by_email(&email).is_none();
        ResponseTemplate::new(200)
            .set_body_json(serde_json::json!({ "available": available }))
    }

    fn create_auth_token(&mut self, request: &Request) -> ResponseTemplate {
        let Some((email, password)) = credentials(request) else {
            return ResponseTemplate::new(422);
        };
        let user_id = match self.find_by_email(&email) {
            Some(account) if account.password == password => account.user_id,
            _ => return ResponseTemplate::new(401),
        };
        let response = ResponseTemplate::new(201)
            .set_body_json(serde_json::json!({ "userId": user_id }));
        self.issue_tokens(user_id, response)
    }

    fn refresh_auth_token(&mut self, request: &Request) -> ResponseTemplate {
        let Some(user_id) = authorize(
            &self.refresh_tokens,
            request,
            REFRESH_TOKEN_COOKIE,
            CSRF_REFRESH_HEADER,
        ) else {
            return ResponseTemplate::new(401);
        };
        self.issue_tokens(user_id, ResponseTemplate::new(204))
    }

    fn change_email(&mut self, request: &Request) -> ResponseTemplate {
        let Some(user_id) = authorize(
            &self.access_tokens,
            request,
            ACCESS_TOKEN_COOKIE,
            CSRF_ACCESS_HEADER,
        ) else {
            return ResponseTemplate::new(401);
        };
        let Some(email) = email(request) else {
            return ResponseTemplate::new(422);
        };
        if self.find_by_email(&email).is_some() {
            return ResponseTemplate::new(409);
        }
        if let Some(account) = self.find_by_id(user_id) {
            account.email = normalize(&email);
        }
        ResponseTemplate::new(201)
            .set_body_json(serde_json::json!({}))
    }

    fn change_password(&mut self, request: &Request) -> ResponseTemplate {
        let Some(user_id) = authorize(
            &self.access_tokens,
            request,
            ACCESS_TOKEN_COOKIE,
            CSRF_ACCESS_HEADER,
        ) else {
            return ResponseTemplate::new(401);
        };
        let Some(password) = password(request) else {
            return ResponseTemplate::new(422);
        };
        if let Some(account) = self.find_by_id(user_id) {
            account.password = password;
        }
        ResponseTemplate::new(204)
    }

    fn forgot_password(&mut self, request: &Request) -> ResponseTemplate {
        let Some(email) = email(request) else {
            return ResponseTemplate::new(422);
        };
        if let Some(account) = self.find_by_email(&email) {
            let recipient = account.email.clone();
            self.password_reset_emails.push(recipient);
        }
        ResponseTemplate::new(201)
            .set_body_json(serde_json::json!({}))
    }

    fn reset_password(&mut self, request: &Request) -> ResponseTemplate {
        let (Some(password), Some(token)) = (password(request), string_field(request, "token"))
        else {
            return ResponseTemplate::new(422);
        };
        let Some(user_id) = self
            .access_tokens
            .iter()
            .find(|grant| grant.token == token)
            .map(|grant| grant.user_id)
        else {
            return ResponseTemplate::new(401);
        };
        if let Some(account) = self.find_by_id(user_id) {
            account.password = password;
        }
        ResponseTemplate::new(204)
    }

    fn issue_tokens(&mut self, user_id: u64, response: ResponseTemplate) -> ResponseTemplate {
        let access = Grant::new(user_id);
        let refresh = Grant::new(user_id);
        let cookies = [
            session_cookie(ACCESS_TOKEN_COOKIE, &access.token),
            plain_cookie(CSRF_ACCESS_COOKIE, &access.csrf),
            session_cookie(REFRESH_TOKEN_COOKIE, &refresh.token),
            plain_cookie(CSRF_REFRESH_COOKIE, &refresh.csrf),
        ];
        let mut response = response;
        for cookie in cookies {
            response = response.append_header("Set-Cookie", cookie);
        }
        self.access_tokens.push(access);
        self.refresh_tokens.push(refresh);
        response
    }
}

impl Grant {
    fn new(user_id: u64) -> Self {
        Self {
            token: Uuid::new_v4().simple().to_string(),
            csrf: Uuid::new_v4().simple().to_string(),
            user_id,
        }
    }
}

fn revoke_auth_token() -> ResponseTemplate {
    [
        ACCESS_TOKEN_COOKIE,
        REFRESH_TOKEN_COOKIE,
        CSRF_ACCESS_COOKIE,
        CSRF_REFRESH_COOKIE,
    ]
    .into_iter()
    .fold(ResponseTemplate::new(204), |response, name| {
        response.append_header(
            "Set-Cookie",
            format!(
                "{}=; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0; Path=/",
                name
            ),
        )
    })
}

/// The user a cookie-held token belongs to, provided the request echoes
/// the token's anti-forgery value in `csrf_header`.
fn authorize(grants: &[Grant], request: &Request, cookie: &str, csrf_header: &str) -> Option<u64> {
    let token = request_cookie(request, cookie)?;
    let csrf = request.headers.get(csrf_header)?.to_str().ok()?;
    grants
        .iter()
        .find(|grant| grant.token == token && grant.csrf == csrf)
        .map(|grant| grant.user_id)
}

/// Value of the `name` cookie sent along with `request`
pub fn request_cookie(request: &Request, name: &str) -> Option<String> {
    let header = request.headers.get("cookie")?.to_str().ok()?;
    Cookie::split_parse(header)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

fn session_cookie(name: &str, value: &str) -> String {
    format!("{}={}; Path=/; HttpOnly", name, value)
}

fn plain_cookie(name: &str, value: &str) -> String {
    format!("{}={}; Path=/", name, value)
}

fn string_field(request: &Request, field: &str) -> Option<String> {
    let body: Value = serde_json::from_slice(&request.body).ok()?;
    body.get(field)?.as_str().map(str::to_string)
}

fn email(request: &Request) -> Option<String> {
    let email = string_field(request, "email")?;
    EmailAddress::parse(email).ok().map(|e| e.as_ref().to_string())
}

fn password(request: &Request) -> Option<String> {
    let password = string_field(request, "password")?;
    validate_password_length(&Secret::new(password.clone())).ok()?;
    Some(password)
}

fn credentials(request: &Request) -> Option<(String, String)> {
    Some((email(request)?, password(request)?))
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}
