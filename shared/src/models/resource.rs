//! Resource model — rooms, equipment and tools with use capacity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Physical resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Room,
    Equipment,
    Tool,
    Other,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Room => "room",
            ResourceType::Equipment => "equipment",
            ResourceType::Tool => "tool",
            ResourceType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<ResourceType> {
        match s {
            "room" => Some(ResourceType::Room),
            "equipment" => Some(ResourceType::Equipment),
            "tool" => Some(ResourceType::Tool),
            "other" => Some(ResourceType::Other),
            _ => None,
        }
    }
}

/// Resource entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    /// Maximum simultaneous uses
    pub capacity: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Create resource payload
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceCreate {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub capacity: i32,
}

/// Update resource payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceUpdate {
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_roundtrip() {
        for t in [
            ResourceType::Room,
            ResourceType::Equipment,
            ResourceType::Tool,
            ResourceType::Other,
        ] {
            assert_eq!(ResourceType::parse(t.as_str()), Some(t));
        }
        assert_eq!(ResourceType::parse("vehicle"), None);
    }

    #[test]
    fn test_type_field_name_on_wire() {
        let r: ResourceCreate =
            serde_json::from_str(r#"{"name": "Room 1", "type": "room", "capacity": 2}"#).unwrap();
        assert_eq!(r.resource_type, ResourceType::Room);
    }
}
