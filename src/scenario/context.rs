use secrecy::Secret;

/// State threaded from one scenario step to the next.
#[derive(Debug, Default)]
pub struct ScenarioContext {
    saved_access_token: Option<Secret<String>>,
}

impl ScenarioContext {
    pub fn save_access_token(&mut self, token: Secret<String>) {
        self.saved_access_token = Some(token);
    }

    /// `None` until the password change step has run.
    pub fn saved_access_token(&self) -> Option<&Secret<String>> {
        self.saved_access_token.as_ref()
    }
}
