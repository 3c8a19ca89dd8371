//! Error types for device operations

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Category assigned to a failed bridge invocation by [`crate::bridge::classify`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeErrorKind {
    /// No device or emulator is attached
    NoDevice,
    /// The selected serial is not known to the bridge
    DeviceNotFound,
    DeviceOffline,
    /// The device has not accepted the host's debugging key
    Unauthorized,
    ConnectionRefused,
    /// The package has no launchable activity (usually: not installed)
    PackageNotFound,
    /// The device rejected a setting or service name
    SettingRejected,
    PermissionDenied,
    /// The remote file does not exist
    RemoteFileMissing,
    /// Non-zero exit or `error:` line without a more specific match
    Failed,
}

impl fmt::Display for BridgeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NoDevice => "no device",
            Self::DeviceNotFound => "device not found",
            Self::DeviceOffline => "device offline",
            Self::Unauthorized => "device unauthorized",
            Self::ConnectionRefused => "connection refused",
            Self::PackageNotFound => "package not found",
            Self::SettingRejected => "setting rejected",
            Self::PermissionDenied => "permission denied",
            Self::RemoteFileMissing => "remote file missing",
            Self::Failed => "command failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("{operation}: {kind} (exit code {exit_code:?}) running `{command}`: {output}")]
    Bridge {
        operation: &'static str,
        kind: BridgeErrorKind,
        command: String,
        exit_code: Option<i32>,
        output: String,
    },

    #[error("Bridge executable not found: {0}")]
    BridgeNotFound(String),

    #[error("{operation}: timed out after {seconds}s running `{command}`")]
    Timeout {
        operation: &'static str,
        command: String,
        seconds: f64,
    },

    #[error("App not registered: {0}")]
    AppNotRegistered(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("App registry {path} could not be read: {source}")]
    RegistryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("App registry {path} is malformed: {source}")]
    RegistryFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl DeviceError {
    /// Classified kind for bridge failures, `None` for every other variant
    pub fn bridge_kind(&self) -> Option<BridgeErrorKind> {
        match self {
            Self::Bridge { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether this is the lookup-kind failure raised for unknown app names
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::AppNotRegistered(_))
    }
}

pub type Result<T> = std::result::Result<T, DeviceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_error_display() {
        let err = DeviceError::Bridge {
            operation: "open_app",
            kind: BridgeErrorKind::PackageNotFound,
            command: "adb -s emulator-5554 shell monkey -p com.example 1".to_string(),
            exit_code: Some(252),
            output: "** No activities found to run, monkey aborted.".to_string(),
        };

        let message = err.to_string();
        assert!(message.starts_with("open_app: package not found"));
        assert!(message.contains("monkey -p com.example"));
        assert_eq!(err.bridge_kind(), Some(BridgeErrorKind::PackageNotFound));
        assert!(!err.is_lookup());
    }

    #[test]
    fn test_lookup_error() {
        let err = DeviceError::AppNotRegistered("Spotify".to_string());
        assert!(err.is_lookup());
        assert_eq!(err.bridge_kind(), None);
    }
}
