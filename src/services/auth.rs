use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::future::{Ready, ready};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Hr,
    Payroll,
    Employee,
}

pub const ATTENDANCE_ADMINS: &[Role] = &[Role::Admin, Role::Hr];
pub const LEAVE_ADMINS: &[Role] = &[Role::Admin, Role::Hr];
pub const LEAVE_REVIEWERS: &[Role] = &[Role::Admin, Role::Hr, Role::Payroll];
pub const SALARY_MANAGERS: &[Role] = &[Role::Admin, Role::Hr, Role::Payroll];
pub const PAYROLL_OPERATORS: &[Role] = &[Role::Admin, Role::Payroll];

/// Identity asserted by the external auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user id
    pub company_id: Uuid,
    pub employee_id: Option<Uuid>, // absent for users without an employee profile
    pub role: Role,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    pub fn require_any(&self, roles: &[Role]) -> Result<(), AppError> {
        if self.has_any_role(roles) {
            Ok(())
        } else {
            Err(AppError::Forbidden("Insufficient permissions".to_string()))
        }
    }

    /// Employee profile of the caller.
    pub fn require_employee(&self) -> Result<Uuid, AppError> {
        self.employee_id.ok_or_else(|| {
            AppError::NotFound("Employee profile not found".to_string())
        })
    }
}

impl FromRequest for Claims {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|header| header.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let Some(token) = token else {
            return ready(Err(AppError::Unauthorized));
        };

        let Some(config) = req.app_data::<Data<Config>>() else {
            log::error!("Config is not registered as app data");
            return ready(Err(AppError::InternalServerError(None)));
        };

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        );

        match decoded {
            Ok(token_data) => ready(Ok(token_data.claims)),
            Err(err) => {
                log::debug!("Rejected bearer token: {}", err);
                ready(Err(AppError::Unauthorized))
            }
        }
    }
}
