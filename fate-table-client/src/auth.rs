//! Bearer-token handling.
//!
//! The server issues JWT bearer tokens from `POST {base}/auth/new`. A token
//! is scoped to one browser tab in the original client, stored under a fixed
//! key in tab-scoped storage and reused across API client re-instantiation.
//! [`TokenStore`] is that storage seam; hosts embed their own implementation
//! (a wasm host maps it onto `sessionStorage`), tests use
//! [`MemoryTokenStore`].

use std::sync::Mutex;

use fate_table_core::UserId;

/// Storage key the original browser client uses for the auth token. Kept so
/// hosts interoperate with existing stored tokens.
pub const AUTH_TOKEN_STORAGE_KEY: &str = "auth-token";

/// Tab-scoped storage for the bearer token.
pub trait TokenStore: Send + Sync {
    /// The previously stored token, if any.
    fn load(&self) -> Option<String>;

    /// Persist a freshly issued or renewed token.
    fn store(&self, token: &str);
}

/// An in-process [`TokenStore`], covering one "tab" lifetime.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.lock().expect("token store poisoned").clone()
    }

    fn store(&self, token: &str) {
        *self.token.lock().expect("token store poisoned") = Some(token.to_string());
    }
}

/// Identity information behind the current bearer token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticationInfo {
    pub user_id: UserId,
    /// Token expiry as reported by the server (RFC 3339).
    pub expires: String,
}
