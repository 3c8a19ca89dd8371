//! Settings used to build a [`DeviceController`](crate::DeviceController)

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Registry location relative to the working directory
pub const DEFAULT_APPS_PATH: &str = "auto/assets/mobile_apps.json";

/// Port used when enabling TCP/IP debugging or when an address has no port
pub const DEFAULT_TCPIP_PORT: u16 = 5555;

/// Configuration for the device controller
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Explicit bridge executable; skips bundled and `PATH` lookup
    pub bridge_path: Option<PathBuf>,
    /// Directory searched for a bundled `assets/platform-tools/adb`
    pub tools_dir: PathBuf,
    pub apps_path: PathBuf,
    /// Per-command limit; `None` waits for the bridge indefinitely
    pub command_timeout: Option<Duration>,
    /// PIN typed after the unlock swipe
    pub unlock_pin: Option<String>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            bridge_path: env::var_os("MOBILE_CONTROL_ADB_PATH").map(PathBuf::from),
            tools_dir: env::var_os("MOBILE_CONTROL_TOOLS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            apps_path: env::var_os("MOBILE_CONTROL_APPS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_APPS_PATH)),
            command_timeout: env::var("MOBILE_CONTROL_COMMAND_TIMEOUT")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|secs| *secs > 0.0)
                .map(Duration::from_secs_f64),
            unlock_pin: env::var("MOBILE_CONTROL_UNLOCK_PIN")
                .ok()
                .filter(|pin| !pin.is_empty()),
        }
    }
}

impl ControllerConfig {
    /// Create a new ControllerConfig from environment defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bridge executable path
    pub fn with_bridge_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.bridge_path = Some(path.into());
        self
    }

    /// Set the directory holding bundled platform tools
    pub fn with_tools_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tools_dir = dir.into();
        self
    }

    /// Set the app registry file
    pub fn with_apps_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.apps_path = path.into();
        self
    }

    /// Set a per-command timeout
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    /// Set the unlock PIN
    pub fn with_unlock_pin(mut self, pin: impl Into<String>) -> Self {
        self.unlock_pin = Some(pin.into());
        self
    }

    /// Path of the bundled bridge executable under `tools_dir`
    pub fn bundled_bridge_path(&self) -> PathBuf {
        let exe = if cfg!(windows) { "adb.exe" } else { "adb" };
        self.tools_dir
            .join("assets")
            .join("platform-tools")
            .join(exe)
    }
}
