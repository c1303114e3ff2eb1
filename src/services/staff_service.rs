use crate::domain::{Password, StaffRole};
use crate::repository::{NewStaff, StaffRepository};
use crate::services::jwt_service::JwtService;
use crate::services::CoreError;
use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use password_hash::{PasswordHash, PasswordVerifier};
use rand::thread_rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct StaffResponse {
    pub staff_id: i64,
    pub external_id: Uuid,
    pub username: String,
    pub full_name: String,
    pub role: StaffRole,
    pub tenant: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterStaffRequest {
    pub username: String,
    pub full_name: String,
    pub role: StaffRole,
    pub tenant: String,
    pub password: Password,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub staff: StaffResponse,
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Clone)]
pub struct StaffService<R: StaffRepository> {
    pub repo: Arc<R>,
    pub jwt_service: Arc<JwtService>,
}

impl<R: StaffRepository> StaffService<R> {
    pub fn new(repo: Arc<R>, jwt_service: Arc<JwtService>) -> Self {
        Self { repo, jwt_service }
    }

    pub async fn register(&self, req: RegisterStaffRequest) -> Result<StaffResponse> {
        if self.repo.find_by_username(&req.username).await?.is_some() {
            return Err(CoreError::conflict("username taken"));
        }

        let password_hash = self.hash_password(req.password.expose())?;

        let staff = self
            .repo
            .insert_staff(NewStaff {
                external_id: Uuid::new_v4(),
                username: req.username,
                full_name: req.full_name,
                role: req.role,
                tenant: req.tenant,
                password_hash,
            })
            .await?;

        Ok(StaffResponse {
            staff_id: staff.staff_id,
            external_id: staff.external_id,
            username: staff.username,
            full_name: staff.full_name,
            role: staff.role,
            tenant: staff.tenant,
        })
    }

    pub async fn login(&self, username: String, password: String) -> Result<AuthResponse> {
        let staff = self
            .repo
            .find_by_username(&username)
            .await?
            .ok_or_else(|| CoreError::unauthorized("invalid credentials"))?;

        let parsed_hash = PasswordHash::new(&staff.password_hash)
            .map_err(|_| anyhow!("invalid stored password hash"))?;
        let argon2 = Argon2::default();

        if argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_err()
        {
            return Err(CoreError::unauthorized("invalid credentials"));
        }

        let token = self.jwt_service.generate_token(
            staff.staff_id,
            &staff.username,
            staff.role,
            &staff.tenant,
        )?;

        Ok(AuthResponse {
            staff: StaffResponse {
                staff_id: staff.staff_id,
                external_id: staff.external_id,
                username: staff.username,
                full_name: staff.full_name,
                role: staff.role,
                tenant: staff.tenant,
            },
            token,
        })
    }

    pub async fn change_password(&self, staff_id: i64, req: ChangePasswordRequest) -> Result<()> {
        let staff = self
            .repo
            .find_by_id(staff_id)
            .await?
            .ok_or_else(|| CoreError::not_found("staff not found"))?;

        let parsed_hash = PasswordHash::new(&staff.password_hash)
            .map_err(|_| anyhow!("invalid stored password hash"))?;
        let argon2 = Argon2::default();

        if argon2
            .verify_password(req.current_password.as_bytes(), &parsed_hash)
            .is_err()
        {
            return Err(CoreError::unauthorized("current password is incorrect"));
        }

        if req.new_password.len() < 8 {
            return Err(CoreError::invalid("new password too short"));
        }

        let new_password_hash = self.hash_password(&req.new_password)?;
        self.repo
            .update_password(staff_id, &new_password_hash)
            .await?;

        Ok(())
    }

    pub async fn refresh_token(&self, token: &str) -> Result<String> {
        self.jwt_service.refresh_token(token)
    }

    pub async fn get_by_token(&self, token: &str) -> Result<StaffResponse> {
        let claims = self.jwt_service.verify_token(token)?;
        let staff_id: i64 = claims.sub.parse()?;

        let staff = self
            .repo
            .find_by_id(staff_id)
            .await?
            .ok_or_else(|| CoreError::not_found("staff not found"))?;

        Ok(StaffResponse {
            staff_id: staff.staff_id,
            external_id: staff.external_id,
            username: staff.username,
            full_name: staff.full_name,
            role: staff.role,
            tenant: staff.tenant,
        })
    }

    pub async fn list_by_role(&self, role: StaffRole) -> Result<Vec<StaffResponse>> {
        let staff = self.repo.list_by_role(role).await?;
        Ok(staff
            .into_iter()
            .map(|s| StaffResponse {
                staff_id: s.staff_id,
                external_id: s.external_id,
                username: s.username,
                full_name: s.full_name,
                role: s.role,
                tenant: s.tenant,
            })
            .collect())
    }

    fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(thread_rng());
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!(e))?
            .to_string();
        Ok(password_hash)
    }
}
