//! Domain DTOs for the things/groups API.
//!
//! # Design
//! Groups and things are opaque to the SDK. Only `id` (to address updates)
//! and `name` are named; every other field rides along in `extra` and is
//! sent back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A group entity as sent to or returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Group {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }
}

/// A thing (device) entity as sent to or returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Thing {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }
}

/// Filters for listing groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupQuery {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub connected: Option<bool>,
}

impl GroupQuery {
    pub(crate) fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push(&mut pairs, "offset", self.offset);
        push(&mut pairs, "limit", self.limit);
        push(&mut pairs, "connected", self.connected);
        pairs
    }
}

/// Filters for listing things.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThingQuery {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub name: Option<String>,
}

impl ThingQuery {
    pub(crate) fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push(&mut pairs, "offset", self.offset);
        push(&mut pairs, "limit", self.limit);
        push(&mut pairs, "name", self.name.as_ref());
        pairs
    }
}

/// Filters for listing the things connected to a channel. Parameters are
/// emitted in the fixed order offset, limit, connected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelThingsQuery {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub connected: Option<bool>,
}

impl ChannelThingsQuery {
    pub(crate) fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push(&mut pairs, "offset", self.offset);
        push(&mut pairs, "limit", self.limit);
        push(&mut pairs, "connected", self.connected);
        pairs
    }
}

fn push<T: ToString>(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<T>) {
    if let Some(value) = value {
        pairs.push((key, value.to_string()));
    }
}

/// Body of a connect request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectRequest {
    #[serde(rename = "thingID")]
    pub thing_id: String,
    #[serde(rename = "chanID")]
    pub chan_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_fields_survive_a_roundtrip() {
        let raw = r#"{"id":"g1","name":"floor","description":"2nd","metadata":{"k":1}}"#;
        let group: Group = serde_json::from_str(raw).unwrap();
        assert_eq!(group.id.as_deref(), Some("g1"));
        assert_eq!(group.extra["description"], "2nd");

        let back: Value = serde_json::to_value(&group).unwrap();
        assert_eq!(back, serde_json::from_str::<Value>(raw).unwrap());
    }

    #[test]
    fn absent_id_is_not_serialized() {
        let body = serde_json::to_value(Thing::named("lamp")).unwrap();
        assert_eq!(body, serde_json::json!({"name": "lamp"}));
    }

    #[test]
    fn query_pairs_skip_absent_values() {
        let query = ChannelThingsQuery {
            offset: Some(0),
            limit: Some(10),
            connected: None,
        };
        assert_eq!(
            query.pairs(),
            vec![("offset", "0".to_string()), ("limit", "10".to_string())]
        );
    }

    #[test]
    fn connect_request_uses_wire_names() {
        let body = serde_json::to_value(ConnectRequest {
            thing_id: "t1".to_string(),
            chan_id: "c1".to_string(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"thingID": "t1", "chanID": "c1"}));
    }
}
