//! Consul API data models
//!
//! These mirror the Consul agent HTTP API wire format: PascalCase field
//! names, base64-encoded KV values.

use std::collections::HashMap;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};

// ============================================================================
// Session Models
// ============================================================================

/// Session create request
/// PUT /v1/session/create
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionCreateRequest {
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "Node", default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,

    /// Grace period before a freed lock becomes re-acquirable (e.g. "1ms")
    #[serde(rename = "LockDelay", default, skip_serializing_if = "Option::is_none")]
    pub lock_delay: Option<String>,

    /// "release" or "delete"; "delete" removes affiliated keys on expiry
    #[serde(rename = "Behavior", default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<String>,

    #[serde(rename = "TTL", default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
}

/// Session create response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreateResponse {
    #[serde(rename = "ID")]
    pub id: String,
}

/// Session info, as returned by /v1/session/info and /v1/session/renew
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEntry {
    #[serde(rename = "ID")]
    pub id: String,

    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(rename = "Node", default)]
    pub node: String,

    #[serde(rename = "Behavior", default)]
    pub behavior: String,

    #[serde(rename = "TTL", default)]
    pub ttl: String,

    #[serde(rename = "CreateIndex", default)]
    pub create_index: u64,

    #[serde(rename = "ModifyIndex", default)]
    pub modify_index: u64,
}

// ============================================================================
// KV Models
// ============================================================================

/// Consul KV pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvPair {
    #[serde(rename = "Key")]
    pub key: String,

    #[serde(rename = "CreateIndex", default)]
    pub create_index: u64,

    #[serde(rename = "ModifyIndex", default)]
    pub modify_index: u64,

    #[serde(rename = "LockIndex", default)]
    pub lock_index: u64,

    #[serde(rename = "Flags", default)]
    pub flags: u64,

    /// Base64 encoded value
    #[serde(rename = "Value", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Session currently holding the key, if any
    #[serde(rename = "Session", skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

impl KvPair {
    /// Decode the base64 value to raw bytes
    pub fn raw_value(&self) -> Option<Vec<u8>> {
        self.value.as_ref().and_then(|v| BASE64.decode(v).ok())
    }

    /// Decode the base64 value to a UTF-8 string
    pub fn decoded_value(&self) -> Option<String> {
        self.raw_value()
            .and_then(|bytes| String::from_utf8(bytes).ok())
    }
}

// ============================================================================
// Agent Service Models
// ============================================================================

/// Service registration request
/// PUT /v1/agent/service/register
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgentServiceRegistration {
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Tags", default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(rename = "Address", default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(rename = "Port", default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(rename = "Meta", default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, String>>,

    #[serde(rename = "Check", default, skip_serializing_if = "Option::is_none")]
    pub check: Option<AgentServiceCheck>,
}

/// Health check definition for service registration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgentServiceCheck {
    #[serde(rename = "CheckID", default, skip_serializing_if = "Option::is_none")]
    pub check_id: Option<String>,

    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Check interval (e.g. "10s")
    #[serde(rename = "Interval", default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,

    /// gRPC health check target, "host:port/service"
    #[serde(rename = "GRPC", default, skip_serializing_if = "Option::is_none")]
    pub grpc: Option<String>,

    #[serde(rename = "Timeout", default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    #[serde(
        rename = "DeregisterCriticalServiceAfter",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub deregister_critical_service_after: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kv_pair_decoded_value() {
        let pair = KvPair {
            key: "leader/x".to_string(),
            create_index: 1,
            modify_index: 1,
            lock_index: 1,
            flags: 0,
            value: Some(BASE64.encode("10.0.0.5:9090")),
            session: Some("abc".to_string()),
        };
        assert_eq!(pair.decoded_value().as_deref(), Some("10.0.0.5:9090"));
        assert_eq!(pair.raw_value().unwrap(), b"10.0.0.5:9090");
    }

    #[test]
    fn test_kv_pair_no_value() {
        let pair = KvPair {
            key: "leader/x".to_string(),
            create_index: 0,
            modify_index: 0,
            lock_index: 0,
            flags: 0,
            value: None,
            session: None,
        };
        assert!(pair.decoded_value().is_none());
    }

    #[test]
    fn test_session_create_request_serializes_pascal_case() {
        let req = SessionCreateRequest {
            name: Some("warden".to_string()),
            ttl: Some("10s".to_string()),
            behavior: Some("delete".to_string()),
            lock_delay: Some("1ms".to_string()),
            node: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["Name"], "warden");
        assert_eq!(json["TTL"], "10s");
        assert_eq!(json["Behavior"], "delete");
        assert_eq!(json["LockDelay"], "1ms");
        assert!(json.get("Node").is_none());
    }

    #[test]
    fn test_kv_pair_deserializes_consul_response() {
        let body = r#"{
            "Key": "leader/shard-3",
            "CreateIndex": 100,
            "ModifyIndex": 200,
            "LockIndex": 1,
            "Flags": 0,
            "Value": "MTAuMC4wLjU6OTA5MA==",
            "Session": "adf4238a-882b-9ddc-4a9d-5b6758e4159e"
        }"#;
        let pair: KvPair = serde_json::from_str(body).unwrap();
        assert_eq!(pair.key, "leader/shard-3");
        assert_eq!(pair.decoded_value().as_deref(), Some("10.0.0.5:9090"));
        assert!(pair.session.is_some());
    }
}
