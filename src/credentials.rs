//! Credential lookup for backends that authenticate against remote services.
//!
//! An empty key means "no credential"; consumers must reject it instead of
//! proceeding unauthenticated.

/// Supplies an API key or token
pub trait CredentialProvider: Send + Sync {
    fn get_key(&self) -> String;

    /// Where the key comes from, for error messages
    fn describe(&self) -> String;
}

/// Reads the key from an environment variable
#[derive(Debug, Clone)]
pub struct EnvCredentialProvider {
    var_name: String,
}

impl EnvCredentialProvider {
    pub fn new(var_name: impl Into<String>) -> Self {
        Self {
            var_name: var_name.into(),
        }
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn get_key(&self) -> String {
        std::env::var(&self.var_name).unwrap_or_default()
    }

    fn describe(&self) -> String {
        format!("set {}", self.var_name)
    }
}

/// Fixed key, used for explicitly configured tokens and in tests
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    key: String,
}

impl StaticCredentialProvider {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn get_key(&self) -> String {
        self.key.clone()
    }

    fn describe(&self) -> String {
        "configure a key".to_string()
    }
}

/// Fetch a non-empty key or report which credential is missing
pub fn require_key(provider: &dyn CredentialProvider) -> Result<String, String> {
    let key = provider.get_key();
    if key.trim().is_empty() {
        Err(provider.describe())
    } else {
        Ok(key)
    }
}
