//! hmeta-config
//!
//! Connection settings for the gateway metadata endpoint and loading of
//! declared-table catalogs.
//!
//! # Contract
//! - `GatewayConfig` is built once at startup and passed into constructors.
//!   Do not scatter `std::env::var` calls across the workspace.
//! - `Debug` on `GatewayConfig` redacts the admin secret.
//! - Error messages reference env var NAMES, never values.

mod catalog;

pub use catalog::{load_declared_tables, parse_declared_tables, CatalogFormat};

use std::fmt;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Per-request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Logical database (source) name applied when none is configured.
pub const DEFAULT_SOURCE: &str = "default";

/// Path of the metadata endpoint relative to the gateway base URL.
pub const METADATA_PATH: &str = "/v1/metadata";

pub const ENV_URL: &str = "HMETA_GRAPHQL_URL";
pub const ENV_ADMIN_SECRET: &str = "HMETA_ADMIN_SECRET";
pub const ENV_SOURCE: &str = "HMETA_SOURCE";
pub const ENV_TIMEOUT_SECS: &str = "HMETA_TIMEOUT_SECS";

/// Read-only settings shared by every request of a run.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    url: String,
    admin_secret: String,
    source: String,
    timeout: Duration,
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("url", &self.url)
            .field("admin_secret", &"<REDACTED>")
            .field("source", &self.source)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GatewayConfig {
    /// `url` is the full metadata endpoint URL.
    pub fn new(url: impl Into<String>, admin_secret: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            admin_secret: admin_secret.into(),
            source: DEFAULT_SOURCE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Blank names fall back to [`DEFAULT_SOURCE`].
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        let source = source.into();
        self.source = if source.trim().is_empty() {
            DEFAULT_SOURCE.to_string()
        } else {
            source
        };
        self
    }

    /// A zero timeout falls back to [`DEFAULT_TIMEOUT`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = if timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            timeout
        };
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn admin_secret(&self) -> &str {
        &self.admin_secret
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build from process environment. See [`GatewayConfig::from_lookup`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from a name → value lookup.
    ///
    /// | Variable              | Required | Meaning                                   |
    /// |-----------------------|----------|-------------------------------------------|
    /// | `HMETA_GRAPHQL_URL`   | yes      | gateway base URL or full metadata URL     |
    /// | `HMETA_ADMIN_SECRET`  | yes      | admin secret header value                 |
    /// | `HMETA_SOURCE`        | no       | source name, default `default`            |
    /// | `HMETA_TIMEOUT_SECS`  | no       | per-request timeout, default 10           |
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let Some(base) = read(ENV_URL) else {
            bail!("missing required env var {ENV_URL}");
        };
        let Some(secret) = read(ENV_ADMIN_SECRET) else {
            bail!("missing required env var {ENV_ADMIN_SECRET}");
        };

        let mut cfg = Self::new(metadata_url(&base), secret);

        if let Some(source) = read(ENV_SOURCE) {
            cfg = cfg.with_source(source);
        }

        if let Some(raw) = read(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw
                .parse()
                .with_context(|| format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds"))?;
            cfg = cfg.with_timeout(Duration::from_secs(secs));
        }

        Ok(cfg)
    }
}

/// Append the metadata path to a gateway base URL unless it is already there.
pub fn metadata_url(base: &str) -> String {
    let trimmed = base.trim_end_matches('/');
    if trimmed.ends_with("/metadata") {
        trimmed.to_string()
    } else {
        format!("{trimmed}{METADATA_PATH}")
    }
}
