//! Coinex API authentication using HMAC-SHA512 signatures.

use hmac::{Hmac, Mac};
use sha2::Sha512;
use std::path::Path;

use crate::error::{CoinexError, Result};

type HmacSha512 = Hmac<Sha512>;

/// Environment variable holding the public API key
pub const API_KEY_VAR: &str = "COINEX_API_KEY";

/// Environment variable holding the API secret
pub const API_SECRET_VAR: &str = "COINEX_API_SECRET";

/// Coinex API credentials
#[derive(Clone)]
pub struct CoinexAuth {
    pub api_key: String,
    secret: Vec<u8>,
}

impl CoinexAuth {
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into().into_bytes(),
        }
    }

    /// Load credentials from `COINEX_API_KEY` / `COINEX_API_SECRET`,
    /// after reading a `.env` file if one is present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars()
    }

    /// Load credentials from a dotenv-style credentials file.
    ///
    /// Only the file is consulted; variables already set in the process
    /// environment do not take precedence.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_error =
            |e: dotenvy::Error| CoinexError::Credentials(format!("{}: {}", path.display(), e));

        let mut api_key = None;
        let mut secret = None;
        for item in dotenvy::from_path_iter(path).map_err(file_error)? {
            let (name, value) = item.map_err(file_error)?;
            match name.as_str() {
                API_KEY_VAR => api_key = Some(value),
                API_SECRET_VAR => secret = Some(value),
                _ => {}
            }
        }

        let missing = |var: &str| {
            CoinexError::Credentials(format!("{} is not set in {}", var, path.display()))
        };
        Ok(Self::new(
            api_key.ok_or_else(|| missing(API_KEY_VAR))?,
            secret.ok_or_else(|| missing(API_SECRET_VAR))?,
        ))
    }

    /// Load from `path` when given, otherwise from the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Self::from_env(),
        }
    }

    fn from_vars() -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_| CoinexError::Credentials(format!("{} is not set", API_KEY_VAR)))?;
        let secret = std::env::var(API_SECRET_VAR)
            .map_err(|_| CoinexError::Credentials(format!("{} is not set", API_SECRET_VAR)))?;
        Ok(Self::new(api_key, secret))
    }

    /// Sign a request body.
    ///
    /// Returns the lowercase hex HMAC-SHA512 of `body` keyed with the secret.
    /// Requests without a payload sign the empty string.
    pub fn sign(&self, body: &[u8]) -> Result<String> {
        let mut mac = HmacSha512::new_from_slice(&self.secret)
            .map_err(|e| CoinexError::Credentials(e.to_string()))?;
        mac.update(body);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

impl std::fmt::Debug for CoinexAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinexAuth")
            .field("api_key", &self.api_key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_matches_rfc4231_vector() {
        let auth = CoinexAuth::new("key", "Jefe");
        let sig = auth.sign(b"what do ya want for nothing?").unwrap();
        assert_eq!(
            sig,
            "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea250554\
             9758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
        );
    }

    #[test]
    fn test_sign_empty_body_is_stable() {
        let auth = CoinexAuth::new("key", "secret");
        let a = auth.sign(b"").unwrap();
        let b = auth.sign(b"").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 128);
        assert_ne!(a, auth.sign(b"{}").unwrap());
    }

    #[test]
    fn test_credentials_file_wins_over_environment() {
        std::env::set_var(API_KEY_VAR, "stale-env-key");
        std::env::set_var(API_SECRET_VAR, "stale-env-secret");

        let path = std::env::temp_dir()
            .join(format!("coinex-creds-{}.env", std::process::id()));
        std::fs::write(
            &path,
            format!("{}=file-key\n{}=file-secret\n", API_KEY_VAR, API_SECRET_VAR),
        )
        .unwrap();

        let auth = CoinexAuth::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(auth.api_key, "file-key");
        assert_eq!(
            auth.sign(b"").unwrap(),
            CoinexAuth::new("file-key", "file-secret").sign(b"").unwrap()
        );
    }

    #[test]
    fn test_credentials_file_missing_secret() {
        let path = std::env::temp_dir()
            .join(format!("coinex-nosecret-{}.env", std::process::id()));
        std::fs::write(&path, format!("{}=only-key\n", API_KEY_VAR)).unwrap();

        let err = CoinexAuth::from_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, CoinexError::Credentials(msg) if msg.contains(API_SECRET_VAR)));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let auth = CoinexAuth::new("public-key", "very-secret");
        let shown = format!("{:?}", auth);
        assert!(shown.contains("public-key"));
        assert!(!shown.contains("very-secret"));
    }
}
