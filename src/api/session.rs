//! Explicit auth/session state.

use crate::error::{Result, SyncviewError};

/// Connection + auth state for the backend API.
///
/// Created at login with the issued bearer token, handed by reference to
/// whichever component needs it, and dropped at logout. Components never
/// reach into browser storage for credentials.
#[derive(Debug, Clone)]
pub struct Session {
    base_url: String,
    token: Option<String>,
}

impl Session {
    /// An unauthenticated session against a backend base URL
    /// (e.g. `"https://console.example.com"`). A trailing slash is
    /// stripped so path joins are unambiguous.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// An authenticated session.
    pub fn with_token(base_url: &str, token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: Some(token.to_string()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Full URL for an API path (`"/api/kpis"`).
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// `Authorization` header value, or an error for an unauthenticated
    /// session. API calls require login; there is no anonymous access.
    pub fn authorization(&self) -> Result<String> {
        match &self.token {
            Some(token) => Ok(format!("Bearer {token}")),
            None => Err(SyncviewError::Session("not logged in".to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let s = Session::new("https://host.example/");
        assert_eq!(s.url_for("/api/kpis"), "https://host.example/api/kpis");
        assert_eq!(s.url_for("api/kpis"), "https://host.example/api/kpis");
    }

    #[test]
    fn test_authorization_requires_login() {
        let anon = Session::new("https://host.example");
        assert!(!anon.is_authenticated());
        assert!(anon.authorization().is_err());

        let auth = Session::with_token("https://host.example", "tok-123");
        assert!(auth.is_authenticated());
        assert_eq!(auth.authorization().unwrap(), "Bearer tok-123");
    }
}
