use crate::entities::employee_entity as employees;
use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, EmployeeResponse, LoginRequest};
use crate::services::employee_service::find_with_role;
use crate::utils::{JwtService, verify_password};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let username = request.username.trim().to_lowercase();
        let employee = employees::Entity::find()
            .filter(employees::Column::Username.eq(username.as_str()))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid username or password".to_string()))?;

        if !verify_password(&request.password, &employee.password_hash)? {
            log::warn!("Failed login for {username}");
            return Err(AppError::AuthError(
                "Invalid username or password".to_string(),
            ));
        }

        self.issue_tokens(employee.id).await
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let employee_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))?;
        self.issue_tokens(employee_id).await
    }

    async fn issue_tokens(&self, employee_id: i64) -> AppResult<AuthResponse> {
        let (employee, role) = find_with_role(&self.pool, employee_id).await?;
        if !employee.is_active {
            return Err(AppError::AuthError("Account is disabled".to_string()));
        }

        let access_token = self
            .jwt_service
            .generate_access_token(employee.id, &role.name)?;
        let refresh_token = self
            .jwt_service
            .generate_refresh_token(employee.id, &role.name)?;

        log::info!("Employee #{} signed in", employee.id);
        Ok(AuthResponse {
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
            employee: EmployeeResponse::build(employee, role),
        })
    }
}
