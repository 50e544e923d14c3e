//! Realtime (websocket) configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    /// Path machine reporters connect to
    pub agent_path: String,

    /// Path dashboards connect to
    pub dashboard_path: String,

    pub heartbeat_interval_secs: u64,

    /// Per-connection outbound queue capacity
    pub outbound_buffer: usize,
}

impl RealtimeConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for path in [&self.agent_path, &self.dashboard_path] {
            if !path.starts_with('/') {
                return Err(ValidationError::InvalidPath(path.clone()));
            }
        }
        if self.agent_path == self.dashboard_path {
            return Err(ValidationError::DuplicatePath);
        }
        if self.heartbeat_interval_secs == 0 {
            return Err(ValidationError::MustBePositive("realtime.heartbeat_interval_secs"));
        }
        if self.outbound_buffer == 0 {
            return Err(ValidationError::MustBePositive("realtime.outbound_buffer"));
        }
        Ok(())
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            agent_path: "/reporter".to_string(),
            dashboard_path: "/client".to_string(),
            heartbeat_interval_secs: 5,
            outbound_buffer: 256,
        }
    }
}
