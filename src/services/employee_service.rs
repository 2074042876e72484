use crate::config::BootstrapAdminConfig;
use crate::entities::{employee_entity as employees, role_entity as roles};
use crate::error::{AppError, AppResult};
use crate::models::{
    Capability, CapabilitySet, CreateEmployeeRequest, EmployeeResponse, RoleResponse, StaffMember,
};
use crate::utils::{hash_password, validate_password};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

#[derive(Clone)]
pub struct EmployeeService {
    pool: DatabaseConnection,
}

impl EmployeeService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn create(&self, req: CreateEmployeeRequest) -> AppResult<EmployeeResponse> {
        let username = req.username.trim().to_lowercase();
        if username.is_empty() || req.full_name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Username and full name are required".into(),
            ));
        }
        validate_password(&req.password)?;

        let role = roles::Entity::find_by_id(req.role_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Role #{} not found", req.role_id)))?;

        let taken = employees::Entity::find()
            .filter(employees::Column::Username.eq(username.as_str()))
            .count(&self.pool)
            .await?;
        if taken > 0 {
            return Err(AppError::Conflict(format!(
                "Username {username} is already taken"
            )));
        }

        let employee = employees::ActiveModel {
            full_name: Set(req.full_name.trim().to_string()),
            username: Set(username),
            password_hash: Set(hash_password(&req.password)?),
            role_id: Set(role.id),
            chat_id: Set(req.chat_id),
            is_on_shift: Set(false),
            cash_balance: Set(0),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Employee created: {} (#{}) as {}",
            employee.username,
            employee.id,
            role.name
        );
        Ok(EmployeeResponse::build(employee, role))
    }

    pub async fn list(&self) -> AppResult<Vec<EmployeeResponse>> {
        let rows = employees::Entity::find()
            .find_also_related(roles::Entity)
            .order_by_asc(employees::Column::Id)
            .all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(employee, role)| role.map(|r| EmployeeResponse::build(employee, r)))
            .collect())
    }

    pub async fn get(&self, employee_id: i64) -> AppResult<EmployeeResponse> {
        let (employee, role) = find_with_role(&self.pool, employee_id).await?;
        Ok(EmployeeResponse::build(employee, role))
    }

    pub async fn list_roles(&self) -> AppResult<Vec<RoleResponse>> {
        let list = roles::Entity::find()
            .order_by_asc(roles::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    /// Loads the employee and fails with `PermissionDenied` unless their role
    /// grants `capability`. Admins pass every check.
    pub async fn require_capability(
        &self,
        employee_id: i64,
        capability: Capability,
    ) -> AppResult<StaffMember> {
        let member = find_staff_member(&self.pool, employee_id).await?;
        if member.has(capability) || member.has(Capability::Admin) {
            Ok(member)
        } else {
            log::warn!(
                "Employee #{employee_id} lacks the {capability} capability"
            );
            Err(AppError::PermissionDenied)
        }
    }

    /// Passes when the employee holds at least one of `capabilities`.
    pub async fn require_any_capability(
        &self,
        employee_id: i64,
        capabilities: &[Capability],
    ) -> AppResult<StaffMember> {
        let member = find_staff_member(&self.pool, employee_id).await?;
        if member.has(Capability::Admin) || capabilities.iter().any(|c| member.has(*c)) {
            Ok(member)
        } else {
            Err(AppError::PermissionDenied)
        }
    }

    pub async fn set_on_shift(&self, employee_id: i64, on_shift: bool) -> AppResult<EmployeeResponse> {
        let (employee, role) = find_with_role(&self.pool, employee_id).await?;
        let mut am = employee.into_active_model();
        am.is_on_shift = Set(on_shift);
        let employee = am.update(&self.pool).await?;
        log::info!(
            "Employee #{} is now {}",
            employee.id,
            if on_shift { "on shift" } else { "off shift" }
        );
        Ok(EmployeeResponse::build(employee, role))
    }

    /// Creates the configured administrator when the employee table is empty.
    pub async fn bootstrap_admin(
        &self,
        config: &BootstrapAdminConfig,
    ) -> AppResult<Option<EmployeeResponse>> {
        if employees::Entity::find().count(&self.pool).await? > 0 {
            return Ok(None);
        }

        let role = match roles::Entity::find()
            .filter(roles::Column::Name.eq("admin"))
            .one(&self.pool)
            .await?
        {
            Some(role) => role,
            None => {
                roles::ActiveModel {
                    name: Set("admin".to_string()),
                    capabilities: Set(CapabilitySet::new([
                        Capability::Admin,
                        Capability::Operator,
                        Capability::Cashier,
                    ])
                    .to_db_string()),
                    ..Default::default()
                }
                .insert(&self.pool)
                .await?
            }
        };

        let created = self
            .create(CreateEmployeeRequest {
                full_name: config.full_name.clone(),
                username: config.username.clone(),
                password: config.password.clone(),
                role_id: role.id,
                chat_id: None,
            })
            .await?;
        log::info!("Bootstrap administrator {} created", created.username);
        Ok(Some(created))
    }
}

pub async fn find_with_role<C: ConnectionTrait>(
    db: &C,
    employee_id: i64,
) -> AppResult<(employees::Model, roles::Model)> {
    let (employee, role) = employees::Entity::find_by_id(employee_id)
        .find_also_related(roles::Entity)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee #{employee_id} not found")))?;
    let role = role.ok_or_else(|| {
        AppError::InternalError(format!("Employee #{employee_id} has no role"))
    })?;
    Ok((employee, role))
}

pub async fn find_staff_member<C: ConnectionTrait>(
    db: &C,
    employee_id: i64,
) -> AppResult<StaffMember> {
    let (employee, role) = find_with_role(db, employee_id).await?;
    if !employee.is_active {
        return Err(AppError::PermissionDenied);
    }
    Ok(StaffMember::from_rows(&employee, Some(&role)))
}

/// All active employees with their capabilities.
pub async fn load_staff<C: ConnectionTrait>(db: &C) -> AppResult<Vec<StaffMember>> {
    let rows = employees::Entity::find()
        .filter(employees::Column::IsActive.eq(true))
        .find_also_related(roles::Entity)
        .order_by_asc(employees::Column::Id)
        .all(db)
        .await?;
    Ok(rows
        .iter()
        .map(|(employee, role)| StaffMember::from_rows(employee, role.as_ref()))
        .collect())
}

/// Short human-readable actor line for status history.
pub fn describe_actor(member: &StaffMember) -> String {
    format!("{} (#{})", member.full_name, member.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{seed_role, seed_staff, setup_test_db};

    #[tokio::test]
    async fn test_create_employee_and_reject_duplicate_username() {
        let db = setup_test_db().await.unwrap();
        let role = seed_role(&db, "courier", "courier").await.unwrap();
        let service = EmployeeService::new(db.clone());

        let req = || CreateEmployeeRequest {
            full_name: "Ivan Petrov".into(),
            username: "Ivan".into(),
            password: "delivery42".into(),
            role_id: role.id,
            chat_id: Some(77),
        };

        let created = service.create(req()).await.unwrap();
        assert_eq!(created.username, "ivan");
        assert_eq!(created.role.capabilities, vec![Capability::Courier]);
        assert_eq!(created.cash_balance, 0);

        assert!(matches!(service.create(req()).await, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_require_capability() {
        let db = setup_test_db().await.unwrap();
        let cashier = seed_staff(&db, "cash", "cashier").await.unwrap();
        let admin = seed_staff(&db, "boss", "admin").await.unwrap();
        let courier = seed_staff(&db, "runner", "courier").await.unwrap();
        let service = EmployeeService::new(db.clone());

        assert!(service.require_capability(cashier.id, Capability::Cashier).await.is_ok());
        assert!(service.require_capability(admin.id, Capability::Cashier).await.is_ok());
        assert!(matches!(
            service.require_capability(courier.id, Capability::Cashier).await,
            Err(AppError::PermissionDenied)
        ));
        assert!(service
            .require_any_capability(courier.id, &[Capability::Cook, Capability::Courier])
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_bootstrap_admin_only_on_empty_table() {
        let db = setup_test_db().await.unwrap();
        let service = EmployeeService::new(db.clone());
        let config = BootstrapAdminConfig {
            username: "root".into(),
            password: "rootpass1".into(),
            full_name: "Administrator".into(),
        };

        let created = service.bootstrap_admin(&config).await.unwrap().unwrap();
        assert!(created.role.capabilities.contains(&Capability::Admin));
        assert!(service.bootstrap_admin(&config).await.unwrap().is_none());
    }
}
