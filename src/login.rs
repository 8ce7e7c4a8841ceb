use crate::auth::AuthService;
use crate::errors::ApiError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum LoginAttempt {
    /// A field was blank; the backend was not contacted.
    Incomplete,
    Submitted,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.trim().is_empty()
    }

    /// Submits the values exactly as typed; trimming only decides whether to submit.
    pub async fn submit(&self, auth: &AuthService) -> Result<LoginAttempt, ApiError> {
        if !self.can_submit() {
            return Ok(LoginAttempt::Incomplete);
        }
        auth.login(&self.username, &self.password).await?;
        Ok(LoginAttempt::Submitted)
    }
}
