//! Service domain — long-running background services and their status.

pub mod client;
pub mod state;

use crate::shared::ServiceName;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use state::ServiceBoard;

/// Service lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Stopped,
    Starting,
    Running,
    Restarting,
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Stopped => "stopped",
            Status::Starting => "starting",
            Status::Running => "running",
            Status::Restarting => "restarting",
        }
    }

    /// Whether the service has a live task (starting, running or between
    /// restarts).
    pub fn is_active(&self) -> bool {
        !matches!(self, Status::Stopped)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Info {
    pub name: ServiceName,
    pub description: String,
    pub status: Status,
    /// Started together with the backend.
    pub autostart: bool,
    /// Restarted after it exits.
    pub restart: bool,
    /// Seconds between an exit and the restart.
    pub restart_delay: f64,
}

impl Info {
    pub fn restart_delay(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.restart_delay).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_info_from_backend_json() {
        let info: Info = serde_json::from_value(json!({
            "name": "fetcher",
            "description": "Polls upstream",
            "status": "restarting",
            "autostart": true,
            "restart": true,
            "restart_delay": 3.0,
        }))
        .unwrap();
        assert_eq!(info.name.as_str(), "fetcher");
        assert_eq!(info.status, Status::Restarting);
        assert!(info.status.is_active());
        assert_eq!(info.restart_delay(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_status_wire_names() {
        for status in [
            Status::Stopped,
            Status::Starting,
            Status::Running,
            Status::Restarting,
        ] {
            assert_eq!(
                serde_json::to_value(status).unwrap(),
                json!(status.as_str())
            );
        }
        assert!(serde_json::from_value::<Status>(json!("paused")).is_err());
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let result = serde_json::from_value::<Info>(json!({
            "name": "fetcher",
            "description": "",
            "status": "running",
        }));
        assert!(result.is_err());
    }
}
