//! Treatment model — service offerings in a store's catalog

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::user::SkillLevel;

/// Allowed treatment duration range, minutes
pub const MIN_DURATION_MINUTES: i32 = 15;
pub const MAX_DURATION_MINUTES: i32 = 480;

/// Price snapshot: decimal amount plus ISO-4217 currency code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub amount: Decimal,
    pub currency: String,
}

/// Staff level a treatment demands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredLevel {
    Junior,
    Senior,
    Expert,
    #[default]
    Any,
}

impl RequiredLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredLevel::Junior => "junior",
            RequiredLevel::Senior => "senior",
            RequiredLevel::Expert => "expert",
            RequiredLevel::Any => "any",
        }
    }

    pub fn parse(s: &str) -> Option<RequiredLevel> {
        match s {
            "junior" => Some(RequiredLevel::Junior),
            "senior" => Some(RequiredLevel::Senior),
            "expert" => Some(RequiredLevel::Expert),
            "any" => Some(RequiredLevel::Any),
            _ => None,
        }
    }

    /// Whether a staff member with `skill` may perform a treatment at this
    /// level. Missing skill levels count as junior.
    pub fn admits(&self, skill: Option<SkillLevel>) -> bool {
        let skill = skill.unwrap_or(SkillLevel::Junior);
        match self {
            RequiredLevel::Any => true,
            RequiredLevel::Junior => skill >= SkillLevel::Junior,
            RequiredLevel::Senior => skill >= SkillLevel::Senior,
            RequiredLevel::Expert => skill >= SkillLevel::Expert,
        }
    }
}

/// Treatment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Treatment {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub category: String,
    pub duration_minutes: i32,
    pub price: Price,
    pub required_staff_level: RequiredLevel,
    /// Resource ids this treatment occupies, in declaration order
    pub required_resources: Vec<i64>,
    pub max_concurrent_bookings: i32,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Create treatment payload
#[derive(Debug, Clone, Deserialize)]
pub struct TreatmentCreate {
    pub name: String,
    pub category: String,
    pub duration_minutes: i32,
    pub price: Price,
    #[serde(default)]
    pub required_staff_level: RequiredLevel,
    #[serde(default)]
    pub required_resources: Vec<i64>,
    pub max_concurrent_bookings: i32,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Update treatment payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TreatmentUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub duration_minutes: Option<i32>,
    pub price: Option<Price>,
    pub required_staff_level: Option<RequiredLevel>,
    pub required_resources: Option<Vec<i64>>,
    pub max_concurrent_bookings: Option<i32>,
    pub tags: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_admits_everyone() {
        assert!(RequiredLevel::Any.admits(None));
        assert!(RequiredLevel::Any.admits(Some(SkillLevel::Junior)));
        assert!(RequiredLevel::Any.admits(Some(SkillLevel::Expert)));
    }

    #[test]
    fn test_level_ranking() {
        assert!(RequiredLevel::Senior.admits(Some(SkillLevel::Senior)));
        assert!(RequiredLevel::Senior.admits(Some(SkillLevel::Expert)));
        assert!(!RequiredLevel::Senior.admits(Some(SkillLevel::Junior)));
        assert!(!RequiredLevel::Expert.admits(Some(SkillLevel::Senior)));
    }

    #[test]
    fn test_missing_skill_defaults_to_junior() {
        assert!(RequiredLevel::Junior.admits(None));
        assert!(!RequiredLevel::Senior.admits(None));
        assert!(!RequiredLevel::Expert.admits(None));
    }

    #[test]
    fn test_required_level_parse() {
        assert_eq!(RequiredLevel::parse("any"), Some(RequiredLevel::Any));
        assert_eq!(RequiredLevel::parse("expert"), Some(RequiredLevel::Expert));
        assert_eq!(RequiredLevel::parse("master"), None);
    }
}
