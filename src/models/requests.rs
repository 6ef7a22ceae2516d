//! Request DTOs for the shared tier API
//!
//! Defines the structure of incoming HTTP request bodies. The remote client
//! serializes the same types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::store::{MAX_KEY_LENGTH, MAX_VALUE_SIZE};

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The key to store the value under
/// - `value`: The value to store
/// - `ttl`: Optional TTL in seconds (uses default if not specified)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRequest {
    /// The key
    pub key: String,
    /// The value to store
    pub value: String,
    /// Optional TTL in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key).or_else(|| {
            (self.value.len() > MAX_VALUE_SIZE)
                .then(|| format!("Value exceeds maximum size of {} bytes", MAX_VALUE_SIZE))
        })
    }
}

/// Request body for the HSET operation (PUT /hset)
///
/// Fields are merged into an existing hash; the TTL applies to the whole key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashSetRequest {
    pub key: String,
    pub fields: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
}

impl HashSetRequest {
    /// Validates the request data
    pub fn validate(&self) -> Option<String> {
        if let Some(message) = validate_key(&self.key) {
            return Some(message);
        }
        if self.fields.is_empty() {
            return Some("Hash must carry at least one field".to_string());
        }
        if self.fields.keys().any(|field| field.is_empty()) {
            return Some("Field names cannot be empty".to_string());
        }
        None
    }
}

fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} characters",
            MAX_KEY_LENGTH
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_request_deserialize() {
        let json = r#"{"key": "test", "value": "hello"}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, "test");
        assert_eq!(req.value, "hello");
        assert!(req.ttl.is_none());
    }

    #[test]
    fn test_set_request_with_ttl() {
        let json = r#"{"key": "test", "value": "hello", "ttl": 60}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.ttl, Some(60));
    }

    #[test]
    fn test_validate_empty_key() {
        let req = SetRequest {
            key: "".to_string(),
            value: "test".to_string(),
            ttl: None,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_long_key() {
        let req = SetRequest {
            key: "k".repeat(MAX_KEY_LENGTH + 1),
            value: "test".to_string(),
            ttl: None,
        };
        assert!(req.validate().unwrap().contains("maximum length"));
    }

    #[test]
    fn test_hash_set_request_deserialize() {
        let json = r#"{"key": "k", "fields": {"syncId": "t1", "data": "{}"}, "ttl": 30}"#;
        let req: HashSetRequest = serde_json::from_str(json).unwrap();

        assert_eq!(req.fields.get("syncId").map(String::as_str), Some("t1"));
        assert_eq!(req.ttl, Some(30));
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_hash_set_request_needs_fields() {
        let req = HashSetRequest {
            key: "k".to_string(),
            fields: BTreeMap::new(),
            ttl: None,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_request_without_ttl_omits_it() {
        let req = SetRequest {
            key: "k".to_string(),
            value: "v".to_string(),
            ttl: None,
        };
        assert_eq!(serde_json::to_string(&req).unwrap(), r#"{"key":"k","value":"v"}"#);
    }
}
