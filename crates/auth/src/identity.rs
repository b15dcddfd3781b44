use serde::{Deserialize, Serialize};

use eventcrm_core::UserId;

use crate::Department;

/// The acting user, as established by the authentication collaborator.
///
/// An `Identity` is passed explicitly into every dispatcher call — it is
/// never read from ambient/global context, and the core neither re-derives
/// nor caches it beyond the current action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub department: Department,
    pub display_name: String,
}

impl Identity {
    pub fn new(user_id: UserId, department: Department, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            department,
            display_name: display_name.into(),
        }
    }

    pub fn is_management(&self) -> bool {
        self.department == Department::Management
    }

    pub fn is_commercial(&self) -> bool {
        self.department == Department::Commercial
    }

    pub fn is_support(&self) -> bool {
        self.department == Department::Support
    }
}
