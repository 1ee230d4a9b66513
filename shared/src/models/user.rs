//! User model — platform accounts and staff assignments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role, ordered by privilege
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    StoreAdmin,
    Staff,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::StoreAdmin => "store_admin",
            Role::Staff => "staff",
            Role::Customer => "customer",
        }
    }

    /// Parse from the persisted string form
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "super_admin" => Some(Role::SuperAdmin),
            "store_admin" => Some(Role::StoreAdmin),
            "staff" => Some(Role::Staff),
            "customer" => Some(Role::Customer),
            _ => None,
        }
    }

    /// Roles that carry a store assignment and can be booked as staff
    pub fn is_staff_role(&self) -> bool {
        matches!(self, Role::StoreAdmin | Role::Staff)
    }
}

/// Staff skill level, ordered `junior < senior < expert`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    Junior,
    Senior,
    Expert,
}

impl SkillLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillLevel::Junior => "junior",
            SkillLevel::Senior => "senior",
            SkillLevel::Expert => "expert",
        }
    }

    pub fn parse(s: &str) -> Option<SkillLevel> {
        match s {
            "junior" => Some(SkillLevel::Junior),
            "senior" => Some(SkillLevel::Senior),
            "expert" => Some(SkillLevel::Expert),
            _ => None,
        }
    }
}

/// User entity
///
/// Staff and store admins carry a `store_id`; customers never do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_level: Option<SkillLevel>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [Role::SuperAdmin, Role::StoreAdmin, Role::Staff, Role::Customer] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("manager"), None);
    }

    #[test]
    fn test_staff_roles() {
        assert!(Role::StoreAdmin.is_staff_role());
        assert!(Role::Staff.is_staff_role());
        assert!(!Role::SuperAdmin.is_staff_role());
        assert!(!Role::Customer.is_staff_role());
    }

    #[test]
    fn test_skill_level_ordering() {
        assert!(SkillLevel::Junior < SkillLevel::Senior);
        assert!(SkillLevel::Senior < SkillLevel::Expert);
    }

    #[test]
    fn test_skill_level_serde() {
        let json = serde_json::to_string(&SkillLevel::Senior).unwrap();
        assert_eq!(json, "\"senior\"");
        let parsed: SkillLevel = serde_json::from_str("\"expert\"").unwrap();
        assert_eq!(parsed, SkillLevel::Expert);
    }
}
