use serde::{Deserialize, Serialize};

/// Department a collaborator belongs to — the unit of role-based permission.
///
/// The rule set is fixed and small, so departments are a closed enum rather
/// than opaque role strings. Every actor belongs to exactly one department;
/// the department is immutable after account creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Department {
    Management,
    Commercial,
    Support,
}

impl Department {
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Management => "management",
            Department::Commercial => "commercial",
            Department::Support => "support",
        }
    }
}

impl core::fmt::Display for Department {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
