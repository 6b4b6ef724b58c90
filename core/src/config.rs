//! Paths and URLs the client works with.
//!
//! There is no configuration file; callers build a `ClientConfig` directly
//! or start from `Default`, which matches the conventional working-directory
//! layout (`cacert.pem`, `cacert_updated.pem`, `logs/`).

use std::path::{Path, PathBuf};

/// Remote location of the Mozilla CA bundle published by the curl project.
pub const DEFAULT_CA_BUNDLE_URL: &str = "https://curl.se/ca/cacert.pem";

pub const DEFAULT_CA_BUNDLE: &str = "cacert.pem";
pub const DEFAULT_CA_BUNDLE_STAGING: &str = "cacert_updated.pem";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// How a freshly downloaded bundle replaces the current one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReplaceStrategy {
    /// Remove the current bundle, then rename the download into place.
    /// A failure between the two steps leaves no bundle on disk.
    #[default]
    RemoveThenRename,
    /// Rename the download over the current bundle in one step.
    AtomicRename,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub ca_bundle: PathBuf,
    pub ca_bundle_staging: PathBuf,
    pub ca_bundle_url: String,
    pub log_dir: PathBuf,
    pub replace: ReplaceStrategy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ca_bundle: PathBuf::from(DEFAULT_CA_BUNDLE),
            ca_bundle_staging: PathBuf::from(DEFAULT_CA_BUNDLE_STAGING),
            ca_bundle_url: DEFAULT_CA_BUNDLE_URL.to_string(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            replace: ReplaceStrategy::default(),
        }
    }
}

impl ClientConfig {
    /// Keep the bundle, its staging file and the logs directory under `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            ca_bundle: dir.join(DEFAULT_CA_BUNDLE),
            ca_bundle_staging: dir.join(DEFAULT_CA_BUNDLE_STAGING),
            log_dir: dir.join(DEFAULT_LOG_DIR),
            ..Self::default()
        }
    }

    pub fn with_ca_bundle_url(mut self, url: impl Into<String>) -> Self {
        self.ca_bundle_url = url.into();
        self
    }

    pub fn with_replace(mut self, replace: ReplaceStrategy) -> Self {
        self.replace = replace;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_working_directory_names() {
        let config = ClientConfig::default();
        assert_eq!(config.ca_bundle, PathBuf::from("cacert.pem"));
        assert_eq!(config.ca_bundle_staging, PathBuf::from("cacert_updated.pem"));
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.ca_bundle_url, "https://curl.se/ca/cacert.pem");
        assert_eq!(config.replace, ReplaceStrategy::RemoveThenRename);
    }

    #[test]
    fn in_dir_keeps_staging_next_to_bundle() {
        let config = ClientConfig::in_dir("/tmp/run-1");
        assert_eq!(config.ca_bundle.parent(), config.ca_bundle_staging.parent());
        assert_eq!(config.log_dir, PathBuf::from("/tmp/run-1/logs"));
        assert_eq!(config.ca_bundle_url, DEFAULT_CA_BUNDLE_URL);
    }

    #[test]
    fn builders_override_fields() {
        let config = ClientConfig::default()
            .with_ca_bundle_url("http://127.0.0.1:1/ca.pem")
            .with_replace(ReplaceStrategy::AtomicRename);
        assert_eq!(config.ca_bundle_url, "http://127.0.0.1:1/ca.pem");
        assert_eq!(config.replace, ReplaceStrategy::AtomicRename);
    }
}
