//! Action domain — named one-shot operations the backend can invoke.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A registered action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionInfo {
    pub name: String,
    pub description: String,
}

/// Outcome of invoking an action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvokeResult {
    pub name: String,
    /// Seconds the action took.
    pub duration: f64,
}

impl InvokeResult {
    pub fn elapsed(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.duration).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_info_json() {
        let info = ActionInfo {
            name: "reindex".to_string(),
            description: "Rebuild the search index".to_string(),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(
            json,
            json!({"name": "reindex", "description": "Rebuild the search index"})
        );
        assert_eq!(serde_json::from_value::<ActionInfo>(json).unwrap(), info);
    }

    #[test]
    fn test_invoke_result_elapsed() {
        let result: InvokeResult =
            serde_json::from_value(json!({"name": "reindex", "duration": 0.5})).unwrap();
        assert_eq!(result.elapsed(), Some(Duration::from_millis(500)));

        let negative = InvokeResult {
            name: "x".to_string(),
            duration: -1.0,
        };
        assert_eq!(negative.elapsed(), None);
    }
}
