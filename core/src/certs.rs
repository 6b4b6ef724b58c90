//! Certificate bundle refresh.
//!
//! The download is verified against the bundle it is about to replace, so a
//! client can only move from one trusted bundle to the next. The body is
//! streamed to a staging file next to the bundle and only moved into place
//! once the transfer completed.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{info, warn};

use crate::config::{ClientConfig, ReplaceStrategy};
use crate::error::{ClientError, TransportError};
use crate::http::{HttpRequest, TlsMode};
use crate::sink::FileSink;
use crate::transport::Transport;

/// Download `config.ca_bundle_url` and install it as `config.ca_bundle`.
///
/// On any transfer failure the staging file is discarded and the current
/// bundle is left untouched.
pub fn refresh_bundle(
    transport: &mut dyn Transport,
    config: &ClientConfig,
) -> Result<(), ClientError> {
    let request = HttpRequest::get(
        &config.ca_bundle_url,
        TlsMode::Verify {
            ca_bundle: config.ca_bundle.clone(),
        },
    );
    let staging = config.ca_bundle_staging.as_path();

    let mut sink = FileSink::create(staging).map_err(|source| ClientError::Staging {
        path: staging.to_path_buf(),
        source,
    })?;
    let outcome = transport.execute(&request, &mut sink);
    let flushed = sink.finish();

    let downloaded = outcome.and_then(|status| {
        flushed.map_err(TransportError::Sink)?;
        if (200..300).contains(&status) {
            Ok(status)
        } else {
            Err(TransportError::Status(status))
        }
    });
    if let Err(e) = downloaded {
        discard_staging(staging);
        return Err(e.into());
    }

    info!(url = %config.ca_bundle_url, "updated certificate bundle downloaded");
    replace_bundle(staging, &config.ca_bundle, config.replace)?;
    info!(path = %config.ca_bundle.display(), "certificates updated");
    Ok(())
}

/// Move `staging` to `bundle` using `strategy`.
///
/// With [`ReplaceStrategy::RemoveThenRename`] a failed rename leaves no
/// bundle on disk. A bundle that does not exist yet is not a remove failure.
pub fn replace_bundle(
    staging: &Path,
    bundle: &Path,
    strategy: ReplaceStrategy,
) -> Result<(), ClientError> {
    if strategy == ReplaceStrategy::RemoveThenRename {
        match fs::remove_file(bundle) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(ClientError::RemoveFailed {
                    path: bundle.to_path_buf(),
                    source,
                });
            }
        }
    }
    fs::rename(staging, bundle).map_err(|source| ClientError::RenameFailed {
        from: staging.to_path_buf(),
        to: bundle.to_path_buf(),
        source,
    })
}

fn discard_staging(staging: &Path) {
    if let Err(e) = fs::remove_file(staging) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(path = %staging.display(), error = %e, "could not remove staging file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;

    const OLD: &str = "-----BEGIN CERTIFICATE-----\nold\n-----END CERTIFICATE-----\n";
    const NEW: &str = "-----BEGIN CERTIFICATE-----\nnew\n-----END CERTIFICATE-----\n";

    fn setup() -> (tempfile::TempDir, ClientConfig) {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::in_dir(dir.path());
        fs::write(&config.ca_bundle, OLD).unwrap();
        (dir, config)
    }

    #[test]
    fn download_is_verified_against_current_bundle() {
        let (_dir, config) = setup();
        let mut transport = ScriptedTransport::new().ok(NEW);
        let seen = transport.requests();

        refresh_bundle(&mut transport, &config).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, "GET");
        assert_eq!(seen[0].url, config.ca_bundle_url);
        assert_eq!(
            seen[0].tls,
            TlsMode::Verify {
                ca_bundle: config.ca_bundle.clone()
            }
        );
    }

    #[test]
    fn success_replaces_bundle_and_consumes_staging() {
        let (_dir, config) = setup();
        let mut transport = ScriptedTransport::new().ok(NEW);

        refresh_bundle(&mut transport, &config).unwrap();

        assert_eq!(fs::read_to_string(&config.ca_bundle).unwrap(), NEW);
        assert!(!config.ca_bundle_staging.exists());
    }

    #[test]
    fn transport_failure_leaves_bundle_byte_identical() {
        let (_dir, config) = setup();
        let before = fs::read(&config.ca_bundle).unwrap();
        let mut transport = ScriptedTransport::new().fail("SSL peer certificate was not OK");

        let err = refresh_bundle(&mut transport, &config).unwrap_err();

        assert!(matches!(err, ClientError::Transport(TransportError::Request(_))));
        assert_eq!(fs::read(&config.ca_bundle).unwrap(), before);
        assert!(!config.ca_bundle_staging.exists());
    }

    #[test]
    fn error_status_does_not_install_the_body() {
        let (_dir, config) = setup();
        let mut transport = ScriptedTransport::new().status(404, "<html>not found</html>");

        let err = refresh_bundle(&mut transport, &config).unwrap_err();

        assert!(matches!(err, ClientError::Transport(TransportError::Status(404))));
        assert_eq!(fs::read_to_string(&config.ca_bundle).unwrap(), OLD);
    }

    #[test]
    fn missing_bundle_is_not_a_remove_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::in_dir(dir.path());
        let mut transport = ScriptedTransport::new().ok(NEW);

        refresh_bundle(&mut transport, &config).unwrap();
        assert_eq!(fs::read_to_string(&config.ca_bundle).unwrap(), NEW);
    }

    #[test]
    fn unremovable_bundle_reports_remove_failed() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::in_dir(dir.path());
        fs::create_dir(&config.ca_bundle).unwrap();
        fs::write(config.ca_bundle.join("keep"), "x").unwrap();
        let mut transport = ScriptedTransport::new().ok(NEW);

        let err = refresh_bundle(&mut transport, &config).unwrap_err();

        assert!(matches!(err, ClientError::RemoveFailed { .. }));
        assert_eq!(fs::read_to_string(&config.ca_bundle_staging).unwrap(), NEW);
    }

    #[test]
    fn unrenamable_staging_reports_rename_failed() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ClientConfig::in_dir(dir.path());
        config.ca_bundle = dir.path().join("missing-dir").join("cacert.pem");
        let mut transport = ScriptedTransport::new().ok(NEW);

        let err = refresh_bundle(&mut transport, &config).unwrap_err();

        assert!(matches!(err, ClientError::RenameFailed { .. }));
        assert!(!config.ca_bundle.exists());
    }

    #[test]
    fn atomic_rename_overwrites_in_place() {
        let (_dir, config) = setup();
        let config = config.with_replace(ReplaceStrategy::AtomicRename);
        let mut transport = ScriptedTransport::new().ok(NEW);

        refresh_bundle(&mut transport, &config).unwrap();

        assert_eq!(fs::read_to_string(&config.ca_bundle).unwrap(), NEW);
        assert!(!config.ca_bundle_staging.exists());
    }
}
