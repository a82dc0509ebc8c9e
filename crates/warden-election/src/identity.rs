//! Agent identity: the `host:port` pair written under the lock key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Immutable identity of this process.
///
/// Serialized as `"host:port"`, it serves double duty: written as the lock
/// value on acquisition, and compared against read-back values to detect
/// "the holder is me".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentIdentity {
    host: String,
    port: u16,
}

impl AgentIdentity {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The bytes stored under the lock key.
    pub fn lock_value(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for AgentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
