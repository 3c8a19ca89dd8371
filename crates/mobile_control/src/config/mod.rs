//! Configuration module for mobile_control
//!
//! This module contains:
//! - `registry`: App name to package mapping loaded from JSON
//! - `settings`: Controller construction settings
//! - `keys`: Named Android key codes
//! - `timing`: Delays between the steps of multi-command operations

mod keys;
mod registry;
mod settings;
mod timing;

pub use keys::{keycode_for, list_key_names, KEYCODES};
pub use registry::AppRegistry;
pub use settings::{ControllerConfig, DEFAULT_APPS_PATH, DEFAULT_TCPIP_PORT};
pub use timing::{ConnectionTimingConfig, TimingConfig, UnlockTimingConfig, TIMING_CONFIG};
