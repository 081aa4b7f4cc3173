use std::sync::Arc;

use dashmap::DashMap;

/// Key the session keeps the bearer token under.
pub const SESSION_TOKEN_KEY: &str = "token";

/// Supplies the bearer token for a request. `None` means nobody is signed in.
pub trait CredentialSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn absent() -> Self {
        Self(None)
    }
}

impl CredentialSource for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Session-scoped key/value storage, the token lives under
/// [`SESSION_TOKEN_KEY`]. Empty strings count as signed out. Clones share
/// the same entries.
#[derive(Debug, Clone, Default)]
pub struct SessionStorage {
    entries: Arc<DashMap<String, String>>,
}

impl SessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.remove(key).map(|(_, v)| v)
    }

    pub fn sign_in(&self, token: impl Into<String>) {
        self.set(SESSION_TOKEN_KEY, token);
    }

    pub fn sign_out(&self) {
        self.remove(SESSION_TOKEN_KEY);
    }
}

impl CredentialSource for SessionStorage {
    fn bearer_token(&self) -> Option<String> {
        self.get(SESSION_TOKEN_KEY).filter(|t| !t.is_empty())
    }
}
