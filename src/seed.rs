//! Bootstrap super admin, created at startup or from the `seed-admin`
//! command so a fresh database can be logged into.

use crate::api::admins::{create_admin, CreateAdminInput};
use crate::auth::models::AdminRole;
use crate::db::admin_repository::AdminRepository;
use crate::db::models::Admin;
use crate::error::AppError;
use crate::validation::normalize_email;

#[derive(Debug)]
pub enum SeedOutcome {
    Created(Admin),
    AlreadyExists,
}

/// Create a super admin unless an account with this email already exists.
pub async fn seed_super_admin(
    repo: &dyn AdminRepository,
    name: &str,
    email: &str,
    password: &str,
) -> Result<SeedOutcome, AppError> {
    if repo.find_by_email(&normalize_email(email)).await?.is_some() {
        tracing::info!(email, "super admin already exists, skipping seed");
        return Ok(SeedOutcome::AlreadyExists);
    }

    let input = CreateAdminInput {
        name: Some(name.to_string()),
        email: Some(email.to_string()),
        password: Some(password.to_string()),
        role: Some(AdminRole::SuperAdmin.to_string()),
    };
    match create_admin(repo, input).await {
        Ok(admin) => {
            tracing::info!(admin_id = %admin.id, email = %admin.email, "seeded super admin");
            Ok(SeedOutcome::Created(admin))
        }
        // Lost a race with another seeder
        Err(AppError::Conflict(_)) => Ok(SeedOutcome::AlreadyExists),
        Err(e) => Err(e),
    }
}
