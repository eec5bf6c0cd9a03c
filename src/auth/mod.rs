//! Credential representation and transport.
//!
//! A build talks to the backend with exactly one scheme: a bearer token in the
//! `Authorization` header, or a username/password pair appended to every query.

use std::str::FromStr;

use reqwest::RequestBuilder;

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key for the username of a credential pair.
pub const USERNAME_KEY: &str = "username";
/// Storage key for the password of a credential pair.
pub const PASSWORD_KEY: &str = "password";

/// Which credential transport the backend expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// OAuth2 password flow: `/signup`, `/token`, `Authorization: Bearer`
    Bearer,
    /// `/register`, `/login`, `/validate-auth`, credentials in the query string
    CredentialPair,
}

impl AuthScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthScheme::Bearer => "bearer",
            AuthScheme::CredentialPair => "credentials",
        }
    }

    /// Path of the registration endpoint.
    pub fn register_path(&self) -> &'static str {
        match self {
            AuthScheme::Bearer => "/signup",
            AuthScheme::CredentialPair => "/register",
        }
    }

    /// Path of the login endpoint.
    pub fn login_path(&self) -> &'static str {
        match self {
            AuthScheme::Bearer => "/token",
            AuthScheme::CredentialPair => "/login",
        }
    }

    /// Whether auth forms are sent form-encoded rather than as JSON.
    pub fn uses_form_encoding(&self) -> bool {
        matches!(self, AuthScheme::Bearer)
    }
}

impl FromStr for AuthScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bearer" | "token" => Ok(AuthScheme::Bearer),
            "credentials" | "pair" | "password" => Ok(AuthScheme::CredentialPair),
            other => Err(format!("unknown auth scheme: {}", other)),
        }
    }
}

/// The secret that authorizes requests.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Bearer(String),
    Pair { username: String, password: String },
}

impl Credential {
    pub fn scheme(&self) -> AuthScheme {
        match self {
            Credential::Bearer(_) => AuthScheme::Bearer,
            Credential::Pair { .. } => AuthScheme::CredentialPair,
        }
    }

    /// A credential counts as present only when every part is non-empty.
    pub fn is_present(&self) -> bool {
        match self {
            Credential::Bearer(token) => !token.trim().is_empty(),
            Credential::Pair { username, password } => {
                !username.trim().is_empty() && !password.is_empty()
            }
        }
    }

    /// Known for the pair scheme only; a stored token carries no name.
    pub fn username(&self) -> Option<&str> {
        match self {
            Credential::Bearer(_) => None,
            Credential::Pair { username, .. } => Some(username),
        }
    }

    /// Attach this credential to an outgoing request.
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Credential::Bearer(token) => request.bearer_auth(token),
            Credential::Pair { username, password } => {
                request.query(&[(USERNAME_KEY, username), (PASSWORD_KEY, password)])
            }
        }
    }

    /// Key/value entries this credential occupies in the store.
    pub fn to_entries(&self) -> Vec<(&'static str, String)> {
        match self {
            Credential::Bearer(token) => vec![(TOKEN_KEY, token.clone())],
            Credential::Pair { username, password } => vec![
                (USERNAME_KEY, username.clone()),
                (PASSWORD_KEY, password.clone()),
            ],
        }
    }

    /// Rebuild the credential for `scheme` from store entries.
    pub fn from_entries<'a>(
        scheme: AuthScheme,
        mut get: impl FnMut(&str) -> Option<&'a str>,
    ) -> Option<Self> {
        let credential = match scheme {
            AuthScheme::Bearer => Credential::Bearer(get(TOKEN_KEY)?.to_string()),
            AuthScheme::CredentialPair => Credential::Pair {
                username: get(USERNAME_KEY)?.to_string(),
                password: get(PASSWORD_KEY)?.to_string(),
            },
        };
        credential.is_present().then_some(credential)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Bearer(_) => f.write_str("Credential::Bearer(<redacted>)"),
            Credential::Pair { username, .. } => f
                .debug_struct("Credential::Pair")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// The authenticated identity for one gated operation.
///
/// Rebuilt from the credential store every time; never kept around globally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub credential: Credential,
}

impl Session {
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }

    /// Known for the pair scheme only; a stored token carries no name.
    pub fn username(&self) -> Option<&str> {
        self.credential.username()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_scheme_parsing() {
        assert_eq!("Bearer".parse::<AuthScheme>(), Ok(AuthScheme::Bearer));
        assert_eq!(
            "credentials".parse::<AuthScheme>(),
            Ok(AuthScheme::CredentialPair)
        );
        assert!("cookie".parse::<AuthScheme>().is_err());
    }

    #[test]
    fn test_scheme_endpoints() {
        assert_eq!(AuthScheme::Bearer.login_path(), "/token");
        assert_eq!(AuthScheme::Bearer.register_path(), "/signup");
        assert_eq!(AuthScheme::CredentialPair.login_path(), "/login");
        assert_eq!(AuthScheme::CredentialPair.register_path(), "/register");
    }

    #[test]
    fn test_empty_credentials_are_absent() {
        assert!(!Credential::Bearer("  ".into()).is_present());
        assert!(!Credential::Pair {
            username: "bob".into(),
            password: String::new()
        }
        .is_present());
        assert!(Credential::Bearer("abc".into()).is_present());
    }

    #[test]
    fn test_entries_rebuild_for_active_scheme_only() {
        let stored: HashMap<&str, &str> = [(TOKEN_KEY, "abc")].into_iter().collect();

        let bearer = Credential::from_entries(AuthScheme::Bearer, |k| stored.get(k).copied());
        assert_eq!(bearer, Some(Credential::Bearer("abc".into())));

        let pair = Credential::from_entries(AuthScheme::CredentialPair, |k| stored.get(k).copied());
        assert_eq!(pair, None);
    }

    #[test]
    fn test_session_username_only_for_pair() {
        let bearer = Session::new(Credential::Bearer("tok".into()));
        assert_eq!(bearer.username(), None);

        let pair = Session::new(Credential::Pair {
            username: "alice".into(),
            password: "secret".into(),
        });
        assert_eq!(pair.username(), Some("alice"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let pair = Credential::Pair {
            username: "alice".into(),
            password: "hunter2".into(),
        };
        let shown = format!("{:?}", pair);
        assert!(shown.contains("alice"));
        assert!(!shown.contains("hunter2"));
        assert!(!format!("{:?}", Credential::Bearer("tok".into())).contains("tok"));
    }

    #[test]
    fn test_pair_goes_into_query() {
        let client = reqwest::Client::new();
        let credential = Credential::Pair {
            username: "alice".into(),
            password: "p w".into(),
        };
        let request = credential
            .apply(client.get("http://localhost/notes"))
            .build()
            .unwrap();
        assert_eq!(request.url().query(), Some("username=alice&password=p+w"));
        assert!(request.headers().get("authorization").is_none());
    }

    #[test]
    fn test_bearer_goes_into_header() {
        let client = reqwest::Client::new();
        let request = Credential::Bearer("abc".into())
            .apply(client.get("http://localhost/notes"))
            .build()
            .unwrap();
        assert_eq!(request.headers()["authorization"], "Bearer abc");
        assert_eq!(request.url().query(), None);
    }
}
