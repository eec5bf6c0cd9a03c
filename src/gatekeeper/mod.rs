//! Session gatekeeper.
//!
//! Decides whether a page may render, attaches the credential to every
//! outgoing request and reacts uniformly when the backend rejects it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};

use crate::auth::{AuthScheme, Credential, Session};
use crate::config::Config;
use crate::errors::ClientError;
use crate::models::{MessageResponse, TokenResponse, UserCredentials};
use crate::navigation::{Location, Navigator, Page};
use crate::store::CredentialStore;

/// Outcome of an access check for one page load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// The page may render. Protected pages always carry a session.
    Allowed(Option<Session>),
    /// A redirect to this location has already been issued.
    Redirected(Location),
}

impl Access {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allowed(_))
    }
}

pub struct Gatekeeper {
    config: Arc<Config>,
    http: reqwest::Client,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    /// Set once the viewer has been sent to the entry page; reset by a login
    /// or by a page load that finds a stored credential.
    redirected: AtomicBool,
}

impl Gatekeeper {
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        if config.auth_scheme == AuthScheme::CredentialPair {
            tracing::warn!(
                "Credential-pair auth sends the password in the query string of every request"
            );
        }

        Ok(Self {
            config,
            http,
            store,
            navigator,
            redirected: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Start a request against an API path, without credentials.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.config.endpoint(path))
    }

    /// URL of `prefix` followed by one percent-encoded path segment.
    ///
    /// Backend-supplied ids and object names may contain `#`, `?` or `/`.
    pub fn segment_url(&self, prefix: &str, segment: &str) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.config.endpoint(prefix))
            .map_err(|e| ClientError::Validation(format!("Invalid API URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Validation("API URL cannot take a path".to_string()))?
            .push(segment);
        Ok(url)
    }

    /// Current session, rebuilt from the credential store.
    pub fn session(&self) -> Result<Option<Session>, ClientError> {
        Ok(self
            .store
            .load(self.config.auth_scheme)?
            .map(Session::new))
    }

    /// Decide whether `location` may render.
    ///
    /// Only presence of the credential is checked here; the first authorized
    /// request finds out whether it is still accepted. No network call is made.
    pub fn check_access(&self, location: &Location) -> Access {
        let session = match self.session() {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Could not read credential store: {}", e);
                None
            }
        };

        if location.page.is_protected() && session.is_none() {
            tracing::info!("No credential for {}, redirecting", location.page.file_name());
            let entry = Location::page(Page::Entry);
            self.navigator.replace(entry.clone());
            return Access::Redirected(entry);
        }

        if location.page.is_auth_form()
            && session.is_some()
            && self.config.skip_auth_pages_when_signed_in
        {
            tracing::debug!("Already signed in, skipping {}", location.page.file_name());
            let notes = Location::page(Page::Notes);
            self.navigator.replace(notes.clone());
            return Access::Redirected(notes);
        }

        // A rendered page starts a new lifecycle; its first rejection must redirect again.
        if session.is_some() {
            self.redirected.store(false, Ordering::SeqCst);
        }

        Access::Allowed(session)
    }

    /// Send `request` with the stored credential attached.
    ///
    /// A `401` clears the credential, redirects to the entry page and fails with
    /// `Unauthenticated`; the response body must not be used in that case.
    /// Transport failures leave the credential alone.
    pub async fn send_authorized(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let Some(session) = self.session()? else {
            return Err(self.reject("No credential"));
        };

        let response = session.credential.apply(request).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let detail = ClientError::from_response(response).await.message();
            return Err(self.reject(&detail));
        }

        Ok(response)
    }

    /// Ask the backend whether the stored credential pair is still accepted.
    ///
    /// Bearer tokens are only checked lazily, so this succeeds as long as one is stored.
    pub async fn validate_session(&self) -> Result<Session, ClientError> {
        let Some(session) = self.session()? else {
            return Err(self.reject("No credential"));
        };

        if self.config.auth_scheme == AuthScheme::Bearer {
            return Ok(session);
        }

        let response = self
            .send_authorized(self.request(Method::GET, "/validate-auth"))
            .await?;
        if !response.status().is_success() {
            let detail = ClientError::from_response(response).await.message();
            return Err(self.reject(&detail));
        }
        Ok(session)
    }

    /// Exchange a username and password for a stored credential.
    ///
    /// On success the viewer is sent to the notes page. On failure nothing is stored.
    pub async fn login(&self, username: &str, password: &str) -> Result<Credential, ClientError> {
        let form = validated_form(username, password)?;
        let scheme = self.config.auth_scheme;

        let response = self
            .auth_form_request(scheme.login_path(), &form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ClientError::from_response(response).await);
        }

        let credential = match scheme {
            AuthScheme::Bearer => {
                let token: TokenResponse = response.json().await?;
                Credential::Bearer(token.access_token)
            }
            AuthScheme::CredentialPair => Credential::Pair {
                username: form.username.clone(),
                password: form.password.clone(),
            },
        };
        if !credential.is_present() {
            return Err(ClientError::Decode("Login returned an empty token".to_string()));
        }

        self.store.save(&credential)?;
        self.redirected.store(false, Ordering::SeqCst);
        tracing::info!("User {} logged in", form.username);

        self.navigator.assign(Location::page(Page::Notes));
        Ok(credential)
    }

    /// Create an account.
    ///
    /// Lands on the entry page to log in, or straight on the notes page when
    /// `login_after_register` is set and the backend supplied a usable credential.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let form = validated_form(username, password)?;
        let scheme = self.config.auth_scheme;

        let response = self
            .auth_form_request(scheme.register_path(), &form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ClientError::from_response(response).await);
        }
        tracing::info!("Registered user {}", form.username);

        if !self.config.login_after_register {
            self.navigator.assign(Location::page(Page::Entry));
            return Ok(());
        }

        let body = match response.json::<MessageResponse>().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("Registration body not understood: {}", e);
                MessageResponse::default()
            }
        };
        let credential = match scheme {
            AuthScheme::Bearer => body.access_token.map(Credential::Bearer),
            AuthScheme::CredentialPair => Some(Credential::Pair {
                username: form.username,
                password: form.password,
            }),
        };

        match credential.filter(Credential::is_present) {
            Some(credential) => {
                self.store.save(&credential)?;
                self.redirected.store(false, Ordering::SeqCst);
                self.navigator.assign(Location::page(Page::Notes));
            }
            None => self.navigator.assign(Location::page(Page::Entry)),
        }
        Ok(())
    }

    /// Forget the credential and go to the entry page. Safe when signed out.
    pub fn logout(&self) {
        if let Err(e) = self.store.clear() {
            tracing::error!("Failed to clear credential on logout: {}", e);
        }
        self.redirected.store(true, Ordering::SeqCst);
        self.navigator.replace(Location::page(Page::Entry));
        tracing::info!("Logged out");
    }

    /// Clear the credential and redirect, at most once until the next login.
    fn reject(&self, reason: &str) -> ClientError {
        tracing::warn!("Credential rejected: {}", reason);
        if let Err(e) = self.store.clear() {
            tracing::error!("Failed to clear rejected credential: {}", e);
        }
        if !self.redirected.swap(true, Ordering::SeqCst) {
            self.navigator.replace(Location::page(Page::Entry));
        }
        ClientError::Unauthenticated(reason.to_string())
    }

    fn auth_form_request(&self, path: &str, form: &UserCredentials) -> RequestBuilder {
        let request = self.request(Method::POST, path);
        if self.config.auth_scheme.uses_form_encoding() {
            request.form(form)
        } else {
            request.json(form)
        }
    }
}

fn validated_form(username: &str, password: &str) -> Result<UserCredentials, ClientError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(ClientError::Validation(
            "Username and password are required".to_string(),
        ));
    }
    Ok(UserCredentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{HistoryNavigator, Navigation};
    use crate::store::MemoryStore;

    fn gatekeeper(store: MemoryStore) -> (Gatekeeper, Arc<HistoryNavigator>) {
        let navigator = Arc::new(HistoryNavigator::new());
        let config = Config {
            // Nothing listens here; these tests must never reach the network.
            api_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        let gate = Gatekeeper::new(Arc::new(config), Arc::new(store), navigator.clone()).unwrap();
        (gate, navigator)
    }

    #[test]
    fn test_protected_page_without_credential_redirects() {
        let (gate, nav) = gatekeeper(MemoryStore::new());

        let access = gate.check_access(&Location::page(Page::Notes));

        assert_eq!(access, Access::Redirected(Location::page(Page::Entry)));
        assert_eq!(
            nav.history(),
            vec![Navigation::Replace(Location::page(Page::Entry))]
        );
    }

    #[test]
    fn test_protected_page_with_credential_is_allowed() {
        let (gate, nav) = gatekeeper(MemoryStore::with_credential(&Credential::Bearer(
            "tok".into(),
        )));

        let access = gate.check_access(&Location::editor(Some(1)));

        assert!(access.is_allowed());
        assert!(nav.history().is_empty());
    }

    #[test]
    fn test_signed_in_viewer_skips_login_page() {
        let (gate, nav) = gatekeeper(MemoryStore::with_credential(&Credential::Bearer(
            "tok".into(),
        )));

        let access = gate.check_access(&Location::page(Page::Entry));

        assert_eq!(access, Access::Redirected(Location::page(Page::Notes)));
        assert_eq!(nav.redirects_to(Page::Notes), 1);
    }

    #[test]
    fn test_signed_out_viewer_sees_register_page() {
        let (gate, _) = gatekeeper(MemoryStore::new());
        assert_eq!(
            gate.check_access(&Location::page(Page::Register)),
            Access::Allowed(None)
        );
    }

    #[test]
    fn test_logout_is_safe_without_credential() {
        let (gate, nav) = gatekeeper(MemoryStore::new());
        gate.logout();
        gate.logout();
        assert_eq!(nav.redirects_to(Page::Entry), 2);
    }

    #[tokio::test]
    async fn test_authorized_request_without_credential_never_sends() {
        let (gate, nav) = gatekeeper(MemoryStore::new());

        let err = gate
            .send_authorized(gate.request(Method::GET, "/notes"))
            .await
            .unwrap_err();

        assert!(err.is_unauthenticated());
        assert_eq!(nav.redirects_to(Page::Entry), 1);
    }

    #[tokio::test]
    async fn test_login_rejects_blank_input_locally() {
        let (gate, nav) = gatekeeper(MemoryStore::new());

        let err = gate.login("  ", "pw").await.unwrap_err();

        assert!(matches!(err, ClientError::Validation(_)));
        assert!(nav.history().is_empty());
    }

    #[tokio::test]
    async fn test_network_failure_keeps_credential() {
        let credential = Credential::Bearer("tok".into());
        let (gate, nav) = gatekeeper(MemoryStore::with_credential(&credential));

        let err = gate
            .send_authorized(gate.request(Method::GET, "/notes"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Network(_)));
        assert_eq!(gate.session().unwrap(), Some(Session::new(credential)));
        assert!(nav.history().is_empty());
    }
}
