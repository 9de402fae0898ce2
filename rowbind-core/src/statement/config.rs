use crate::Resource;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_query_timeout_ms() -> u64 {
    20_000
}

/// Execution settings shared by every statement kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementConfig {
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

impl StatementConfig {
    pub fn new(query_timeout: Duration) -> Self {
        Self {
            query_timeout_ms: query_timeout.as_millis().try_into().unwrap_or(u64::MAX),
        }
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

impl Default for StatementConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}

impl From<&Resource> for StatementConfig {
    fn from(value: &Resource) -> Self {
        Self {
            query_timeout_ms: value.response_timeout_ms,
        }
    }
}
