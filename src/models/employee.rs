use crate::entities::{employee_entity, role_entity};
use crate::models::{Capability, CapabilitySet};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateEmployeeRequest {
    #[schema(example = "Ivan Petrov")]
    pub full_name: String,
    #[schema(example = "ivan")]
    pub username: String,
    pub password: String,
    pub role_id: i64,
    pub chat_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetOnShiftRequest {
    pub on_shift: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoleResponse {
    pub id: i64,
    pub name: String,
    pub capabilities: Vec<Capability>,
}

impl From<role_entity::Model> for RoleResponse {
    fn from(m: role_entity::Model) -> Self {
        Self {
            id: m.id,
            capabilities: CapabilitySet::parse(&m.capabilities).to_vec(),
            name: m.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmployeeResponse {
    pub id: i64,
    pub full_name: String,
    pub username: String,
    pub role: RoleResponse,
    pub chat_id: Option<i64>,
    pub is_on_shift: bool,
    pub cash_balance: i64,
    pub is_active: bool,
}

impl EmployeeResponse {
    pub fn build(employee: employee_entity::Model, role: role_entity::Model) -> Self {
        Self {
            id: employee.id,
            full_name: employee.full_name,
            username: employee.username,
            role: role.into(),
            chat_id: employee.chat_id,
            is_on_shift: employee.is_on_shift,
            cash_balance: employee.cash_balance,
            is_active: employee.is_active,
        }
    }
}

/// Employee row joined with the capabilities of its role.
#[derive(Debug, Clone)]
pub struct StaffMember {
    pub id: i64,
    pub full_name: String,
    pub chat_id: Option<i64>,
    pub is_on_shift: bool,
    pub capabilities: CapabilitySet,
}

impl StaffMember {
    pub fn from_rows(employee: &employee_entity::Model, role: Option<&role_entity::Model>) -> Self {
        Self {
            id: employee.id,
            full_name: employee.full_name.clone(),
            chat_id: employee.chat_id,
            is_on_shift: employee.is_on_shift,
            capabilities: role
                .map(|r| CapabilitySet::parse(&r.capabilities))
                .unwrap_or_default(),
        }
    }

    pub fn has(&self, cap: Capability) -> bool {
        self.capabilities.contains(cap)
    }
}
