//! mobile_control: Android device control over the adb bridge
//!
//! This library wraps the `adb` executable:
//! - Device selection and TCP/IP connection management
//! - App launch and force-stop through a name-to-package registry
//! - Screenshots, calls, radios (Wi-Fi, Bluetooth, mobile data)
//! - Battery, network and device property reports
//! - Touch, key and text input
//!
//! # Example
//!
//! ```no_run
//! use mobile_control::{ControllerConfig, DeviceController};
//!
//! #[tokio::main]
//! async fn main() -> mobile_control::Result<()> {
//!     let controller = DeviceController::new(ControllerConfig::new())?;
//!     let device = controller.connect_device(None).await?;
//!
//!     controller.open_app(&device, "YouTube").await?;
//!     let battery = controller.get_battery_status(&device).await?;
//!     println!("Battery: {:?}%", battery.level);
//!     Ok(())
//! }
//! ```

// Core modules
pub mod error;

// Configuration module
pub mod config;

// Bridge plumbing
pub mod bridge;

// Device operations
pub mod controller;
pub mod device;
pub mod input;
pub mod screenshot;
pub mod status;

// Re-export commonly used types and functions
pub use error::{BridgeErrorKind, DeviceError, Result};

// Config re-exports
pub use config::{
    keycode_for, list_key_names, AppRegistry, ConnectionTimingConfig, ControllerConfig,
    TimingConfig, UnlockTimingConfig, DEFAULT_APPS_PATH, DEFAULT_TCPIP_PORT, KEYCODES,
    TIMING_CONFIG,
};

// Bridge re-exports
pub use bridge::{
    classify, classify_report, locate_bridge, CommandOutput, CommandRunner, ProcessRunner,
};

// Device re-exports
pub use controller::{DeviceController, LaunchReport, Radio};
pub use device::{ConnectionType, DeviceHandle, DeviceInfo};
pub use screenshot::Screenshot;
pub use status::{BatteryHealth, BatteryStatus, ChargingState, DeviceProperties, NetworkStatus};
