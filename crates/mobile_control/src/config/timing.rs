//! Timing configuration for multi-step device operations

use lazy_static::lazy_static;
use std::env;

fn env_seconds(name: &str, default: f64) -> f64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Delays used while unlocking the screen
#[derive(Debug, Clone)]
pub struct UnlockTimingConfig {
    pub wake_delay: f64,
    pub swipe_delay: f64,
}

impl Default for UnlockTimingConfig {
    fn default() -> Self {
        Self {
            wake_delay: env_seconds("MOBILE_CONTROL_WAKE_DELAY", 0.9),
            swipe_delay: env_seconds("MOBILE_CONTROL_SWIPE_DELAY", 0.6),
        }
    }
}

/// Delays used while preparing a wireless connection
#[derive(Debug, Clone)]
pub struct ConnectionTimingConfig {
    pub server_restart_delay: f64,
    pub tcpip_delay: f64,
}

impl Default for ConnectionTimingConfig {
    fn default() -> Self {
        Self {
            server_restart_delay: env_seconds("MOBILE_CONTROL_SERVER_RESTART_DELAY", 0.3),
            tcpip_delay: env_seconds("MOBILE_CONTROL_TCPIP_DELAY", 0.3),
        }
    }
}

/// Master timing configuration
#[derive(Debug, Clone, Default)]
pub struct TimingConfig {
    pub unlock: UnlockTimingConfig,
    pub connection: ConnectionTimingConfig,
}

lazy_static! {
    /// Global timing configuration instance
    pub static ref TIMING_CONFIG: TimingConfig = TimingConfig::default();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_seconds_fallback() {
        assert_eq!(env_seconds("MOBILE_CONTROL_TEST_UNSET_DELAY", 1.5), 1.5);
    }

    #[test]
    fn test_env_seconds_override() {
        env::set_var("MOBILE_CONTROL_TEST_SET_DELAY", "0.25");
        assert_eq!(env_seconds("MOBILE_CONTROL_TEST_SET_DELAY", 1.5), 0.25);
        env::set_var("MOBILE_CONTROL_TEST_SET_DELAY", "soon");
        assert_eq!(env_seconds("MOBILE_CONTROL_TEST_SET_DELAY", 1.5), 1.5);
    }
}
