//! Bridge executable lookup

use std::path::PathBuf;
use tracing::debug;

use crate::config::ControllerConfig;
use crate::error::{DeviceError, Result};

/// Resolve the bridge executable
///
/// Order: the configured `bridge_path` (a bare name is looked up on `PATH`),
/// the bundled copy under `tools_dir`, then `adb` on `PATH`.
pub fn locate_bridge(config: &ControllerConfig) -> Result<PathBuf> {
    if let Some(explicit) = &config.bridge_path {
        if explicit.is_file() {
            return Ok(explicit.clone());
        }
        return which::which(explicit)
            .map_err(|_| DeviceError::BridgeNotFound(explicit.display().to_string()));
    }

    let bundled = config.bundled_bridge_path();
    if bundled.is_file() {
        debug!("Using bundled bridge at {}", bundled.display());
        return Ok(bundled);
    }

    which::which("adb").map_err(|_| {
        DeviceError::BridgeNotFound(format!(
            "adb is not on PATH and {} does not exist",
            bundled.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_explicit_existing_path() {
        let dir = tempdir().unwrap();
        let adb = dir.path().join("adb");
        std::fs::write(&adb, b"").unwrap();

        let config = ControllerConfig::new().with_bridge_path(&adb);
        assert_eq!(locate_bridge(&config).unwrap(), adb);
    }

    #[test]
    fn test_explicit_missing_path() {
        let config =
            ControllerConfig::new().with_bridge_path("/nonexistent/mobile-control/platform-tools/adb");
        let err = locate_bridge(&config).unwrap_err();
        assert!(matches!(err, DeviceError::BridgeNotFound(_)));
    }

    #[test]
    fn test_bundled_copy_preferred() {
        let dir = tempdir().unwrap();
        let mut config = ControllerConfig::new().with_tools_dir(dir.path());
        config.bridge_path = None;

        let bundled = config.bundled_bridge_path();
        std::fs::create_dir_all(bundled.parent().unwrap()).unwrap();
        std::fs::write(&bundled, b"").unwrap();

        assert_eq!(locate_bridge(&config).unwrap(), bundled);
    }
}
