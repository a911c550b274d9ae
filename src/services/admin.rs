use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set};
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    config::AdminSeedConfig,
    db::DbPool,
    entities::user::{self, Entity as User, ROLE_ADMIN},
    errors::SeedError,
};

/// Hashes a password into an argon2 PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, SeedError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, SeedError> {
    let parsed = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminSeedOutcome {
    Created,
    ProfilePicSet,
    Unchanged,
}

/// Creates and repairs the storefront admin account
pub struct AdminService {
    db_pool: Arc<DbPool>,
    admin: AdminSeedConfig,
}

impl AdminService {
    pub fn new(db_pool: Arc<DbPool>, admin: AdminSeedConfig) -> Self {
        Self { db_pool, admin }
    }

    pub async fn find_admin(&self) -> Result<Option<user::Model>, SeedError> {
        User::find()
            .filter(user::Column::Email.eq(self.admin.email.as_str()))
            .one(&*self.db_pool)
            .await
            .map_err(SeedError::DatabaseError)
    }

    /// Ensures the admin user exists and has a profile picture.
    ///
    /// An existing admin keeps its password and any profile picture it
    /// already has.
    #[instrument(skip(self), fields(email = %self.admin.email))]
    pub async fn ensure_admin(&self) -> Result<AdminSeedOutcome, SeedError> {
        let db = &*self.db_pool;

        match self.find_admin().await? {
            None => {
                let admin = user::ActiveModel {
                    name: Set(self.admin.name.clone()),
                    email: Set(self.admin.email.clone()),
                    password: Set(hash_password(&self.admin.password)?),
                    role: Set(ROLE_ADMIN.to_string()),
                    profile_pic: Set(self.admin.profile_pic.clone()),
                    ..Default::default()
                };
                admin.insert(db).await?;
                info!("Admin user created");
                Ok(AdminSeedOutcome::Created)
            }
            Some(existing) if existing.profile_pic.is_none() && self.admin.profile_pic.is_some() => {
                let mut admin = existing.into_active_model();
                admin.profile_pic = Set(self.admin.profile_pic.clone());
                admin.update(db).await?;
                info!("Admin profile picture set");
                Ok(AdminSeedOutcome::ProfilePicSet)
            }
            Some(_) => {
                info!("Admin user already present");
                Ok(AdminSeedOutcome::Unchanged)
            }
        }
    }

    /// Re-hashes the configured password onto the admin user.
    ///
    /// Returns `false` when no admin user exists; nothing is created then.
    #[instrument(skip(self), fields(email = %self.admin.email))]
    pub async fn reset_password(&self) -> Result<bool, SeedError> {
        let Some(existing) = self.find_admin().await? else {
            info!("Admin user not found, nothing to reset");
            return Ok(false);
        };

        let mut admin = existing.into_active_model();
        admin.password = Set(hash_password(&self.admin.password)?);
        admin.update(&*self.db_pool).await?;
        info!("Admin password reset");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_salted_and_verifiable() {
        let first = hash_password("Admin123!").unwrap();
        let second = hash_password("Admin123!").unwrap();

        assert!(first.starts_with("$argon2"));
        assert_ne!(first, second);
        assert!(verify_password("Admin123!", &first).unwrap());
        assert!(!verify_password("wrong", &first).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let err = verify_password("x", "not-a-phc-string").unwrap_err();
        assert!(matches!(err, SeedError::HashError(_)));
    }
}
