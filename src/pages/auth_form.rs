//! Login and registration forms.

use std::sync::Arc;

use crate::errors::ClientError;
use crate::gatekeeper::Gatekeeper;
use crate::notify::{Notice, Notifier};

/// Which form was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthForm {
    Login,
    Register,
}

impl AuthForm {
    fn success_message(&self) -> &'static str {
        match self {
            AuthForm::Login => "Login successful!",
            AuthForm::Register => "Registered!",
        }
    }
}

pub struct AuthFormController {
    gate: Arc<Gatekeeper>,
    notifier: Arc<dyn Notifier>,
}

impl AuthFormController {
    pub fn new(gate: Arc<Gatekeeper>, notifier: Arc<dyn Notifier>) -> Self {
        Self { gate, notifier }
    }

    /// Submit a form. The outcome is always shown to the viewer.
    pub async fn submit(
        &self,
        form: AuthForm,
        username: &str,
        password: &str,
    ) -> Result<(), ClientError> {
        let result = match form {
            AuthForm::Login => self.gate.login(username, password).await.map(|_| ()),
            AuthForm::Register => self.gate.register(username, password).await,
        };

        match &result {
            Ok(()) => self.notifier.notify(Notice::success(form.success_message())),
            Err(e) => self.notifier.notify(Notice::error(e.message())),
        }
        result
    }
}
