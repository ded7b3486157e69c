//! Administrator accounts: login, own profile, and management of other
//! administrators.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bson::oid::ObjectId;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::extract::{ApiJson, ApiQuery};
use crate::api::response::{ApiResponse, Pagination};
use crate::auth::middleware::SuperAdmin;
use crate::auth::models::{AdminRole, AuthenticatedAdmin, Capability};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::TokenService;
use crate::db::admin_repository::AdminRepository;
use crate::db::models::{Admin, AdminView};
use crate::db::query::{AdminFilter, ListOptions, ListResult, ADMIN_SORT_FIELDS};
use crate::error::AppError;
use crate::state::AppState;
use crate::validation::{choice, Validator};

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const ACCOUNT_DEACTIVATED: &str = "Your account has been deactivated. Contact administrator.";
pub const ADMIN_NOT_FOUND: &str = "Admin not found";
pub const EMAIL_EXISTS: &str = "Admin with this email already exists";
pub const EMAIL_IN_USE: &str = "Email already in use";
pub const WRONG_CURRENT_PASSWORD: &str = "Current password is incorrect";
pub const OWN_PROFILE_ONLY: &str = "Access denied. You can only update your own profile";
pub const ROLE_CHANGE_DENIED: &str = "Access denied. Only super_admin can change role or status";
const ROLE_MESSAGE: &str = "Role must be either admin or super_admin";
const IS_ACTIVE_MESSAGE: &str = "isActive must be a boolean";

/// Parse a path id, rejecting anything that is not an ObjectId.
pub fn parse_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| AppError::InvalidId)
}

/// Booleans arrive as JSON booleans or, from query strings, as text.
fn boolean(v: &mut Validator, field: &str, value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => {
                v.error(field, IS_ACTIVE_MESSAGE);
                None
            }
        },
        _ => {
            v.error(field, IS_ACTIVE_MESSAGE);
            None
        }
    }
}

// -- Login --

#[derive(Debug, Default, Deserialize)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginAdmin {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: AdminRole,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginData {
    pub token: String,
    pub admin: LoginAdmin,
}

/// Login reply. Unlike other endpoints, `token` and `admin` sit beside
/// `success` and `message` instead of under `data`.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(flatten)]
    pub data: LoginData,
}

impl IntoResponse for LoginResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Verify credentials and issue a token.
///
/// An unknown email and a wrong password fail identically. A deactivated
/// account is refused before its password is checked.
pub async fn login(
    repo: &dyn AdminRepository,
    tokens: &TokenService,
    input: LoginInput,
) -> Result<LoginData, AppError> {
    let mut v = Validator::new();
    let email = v.email("email", input.email.as_deref());
    let password = v.required_text("password", "Password", input.password.as_deref(), None);
    v.finish()?;
    let (Some(email), Some(password)) = (email, password) else {
        return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
    };

    let Some(admin) = repo.find_by_email(&email).await? else {
        tracing::warn!(email = %email, "login attempt for unknown email");
        return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
    };

    if !admin.is_active {
        tracing::warn!(admin_id = %admin.id, "login refused for deactivated account");
        return Err(AppError::Forbidden(ACCOUNT_DEACTIVATED.into()));
    }

    if !verify_password(&password, &admin.password) {
        tracing::warn!(admin_id = %admin.id, "login attempt with wrong password");
        return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
    }

    let token = tokens.issue(admin.id, &admin.email, admin.role)?;
    tracing::info!(admin_id = %admin.id, role = %admin.role, "admin logged in");

    Ok(LoginData {
        token,
        admin: LoginAdmin {
            id: admin.id.to_hex(),
            name: admin.name,
            email: admin.email,
            role: admin.role,
        },
    })
}

// -- Create --

#[derive(Debug, Default, Deserialize)]
pub struct CreateAdminInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

pub async fn create_admin(
    repo: &dyn AdminRepository,
    input: CreateAdminInput,
) -> Result<Admin, AppError> {
    let mut v = Validator::new();
    let name = v.name(input.name.as_deref(), true);
    let email = v.email("email", input.email.as_deref());
    let password = v.password("password", "Password", input.password.as_deref());
    let role = choice(
        &mut v,
        "role",
        ROLE_MESSAGE,
        input.role.as_deref(),
        false,
        AdminRole::from_str_ci,
    );
    v.finish()?;

    let (Some(name), Some(email), Some(password)) = (name, email, password) else {
        return Err(AppError::Internal("validated admin is missing required fields".into()));
    };

    if repo.email_taken(&email, None).await? {
        return Err(AppError::Conflict(EMAIL_EXISTS.into()));
    }

    let now = Utc::now();
    let admin = Admin {
        id: ObjectId::new(),
        name,
        email,
        password: hash_password(&password)?,
        role: role.unwrap_or_default(),
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    let admin = repo
        .insert(admin)
        .await
        .map_err(|e| e.on_duplicate(|_| AppError::Conflict(EMAIL_EXISTS.into())))?;
    tracing::info!(admin_id = %admin.id, role = %admin.role, "admin created");
    Ok(admin)
}

// -- Update --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdminInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<Value>,
}

async fn find_admin(repo: &dyn AdminRepository, id: ObjectId) -> Result<Admin, AppError> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(ADMIN_NOT_FOUND.into()))
}

async fn save_admin(repo: &dyn AdminRepository, mut admin: Admin) -> Result<Admin, AppError> {
    admin.updated_at = Utc::now();
    repo.replace(admin)
        .await
        .map_err(|e| e.on_duplicate(|_| AppError::Conflict(EMAIL_IN_USE.into())))?
        .ok_or_else(|| AppError::NotFound(ADMIN_NOT_FOUND.into()))
}

/// Change an email, refusing one held by another account.
async fn set_email(
    repo: &dyn AdminRepository,
    admin: &mut Admin,
    email: String,
) -> Result<(), AppError> {
    if email != admin.email && repo.email_taken(&email, Some(admin.id)).await? {
        return Err(AppError::Conflict(EMAIL_IN_USE.into()));
    }
    admin.email = email;
    Ok(())
}

/// Update an administrator on behalf of `actor`.
///
/// Super admins may edit anyone. Other admins may edit only themselves and
/// never their role or active flag. Credentials are not changed here.
pub async fn update_admin(
    repo: &dyn AdminRepository,
    actor: &AuthenticatedAdmin,
    id: ObjectId,
    input: UpdateAdminInput,
) -> Result<Admin, AppError> {
    if actor.id != id && !actor.can(Capability::ManageAdmins) {
        return Err(AppError::Forbidden(OWN_PROFILE_ONLY.into()));
    }
    if (input.role.is_some() || input.is_active.is_some()) && !actor.can(Capability::ChangeRoles) {
        return Err(AppError::Forbidden(ROLE_CHANGE_DENIED.into()));
    }

    let mut v = Validator::new();
    let name = v.name(input.name.as_deref(), false);
    let email = match input.email.as_deref() {
        Some(raw) => v.email("email", Some(raw)),
        None => None,
    };
    let role = choice(
        &mut v,
        "role",
        ROLE_MESSAGE,
        input.role.as_deref(),
        false,
        AdminRole::from_str_ci,
    );
    let is_active = boolean(&mut v, "isActive", input.is_active.as_ref());
    v.finish()?;

    let mut admin = find_admin(repo, id).await?;
    if let Some(name) = name {
        admin.name = name;
    }
    if let Some(email) = email {
        set_email(repo, &mut admin, email).await?;
    }
    if let Some(role) = role {
        admin.role = role;
    }
    if let Some(is_active) = is_active {
        admin.is_active = is_active;
    }

    let admin = save_admin(repo, admin).await?;
    tracing::info!(admin_id = %admin.id, actor_id = %actor.id, "admin updated");
    Ok(admin)
}

/// Soft delete: the account stays stored but can no longer log in.
pub async fn deactivate_admin(repo: &dyn AdminRepository, id: ObjectId) -> Result<Admin, AppError> {
    let mut admin = find_admin(repo, id).await?;
    admin.is_active = false;
    let admin = save_admin(repo, admin).await?;
    tracing::info!(admin_id = %admin.id, "admin deactivated");
    Ok(admin)
}

// -- Own profile --

#[derive(Debug, Default, Deserialize)]
pub struct ProfileInput {
    pub name: Option<String>,
    pub email: Option<String>,
}

pub async fn update_profile(
    repo: &dyn AdminRepository,
    id: ObjectId,
    input: ProfileInput,
) -> Result<Admin, AppError> {
    let mut v = Validator::new();
    let name = v.name(input.name.as_deref(), false);
    let email = match input.email.as_deref() {
        Some(raw) => v.email("email", Some(raw)),
        None => None,
    };
    v.finish()?;

    let mut admin = find_admin(repo, id).await?;
    if let Some(name) = name {
        admin.name = name;
    }
    if let Some(email) = email {
        set_email(repo, &mut admin, email).await?;
    }
    save_admin(repo, admin).await
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeInput {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

pub async fn change_password(
    repo: &dyn AdminRepository,
    id: ObjectId,
    input: PasswordChangeInput,
) -> Result<(), AppError> {
    let mut v = Validator::new();
    let old = match input.old_password.filter(|p| !p.is_empty()) {
        Some(old) => Some(old),
        None => {
            v.error("oldPassword", "Current password is required");
            None
        }
    };
    let new = v.password("newPassword", "New password", input.new_password.as_deref());
    v.finish()?;
    let (Some(old), Some(new)) = (old, new) else {
        return Err(AppError::Internal("validated password change is incomplete".into()));
    };

    let mut admin = find_admin(repo, id).await?;
    if !verify_password(&old, &admin.password) {
        tracing::warn!(admin_id = %admin.id, "password change with wrong current password");
        return Err(AppError::Auth(WRONG_CURRENT_PASSWORD.into()));
    }

    admin.password = hash_password(&new)?;
    save_admin(repo, admin).await?;
    tracing::info!(admin_id = %id, "password changed");
    Ok(())
}

// -- List --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminListQuery {
    pub role: Option<String>,
    pub is_active: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
}

pub async fn list_admins(
    repo: &dyn AdminRepository,
    query: &AdminListQuery,
) -> Result<(ListResult<Admin>, ListOptions), AppError> {
    let mut v = Validator::new();
    let filter = AdminFilter {
        role: choice(
            &mut v,
            "role",
            ROLE_MESSAGE,
            query.role.as_deref(),
            false,
            AdminRole::from_str_ci,
        ),
        is_active: query
            .is_active
            .as_ref()
            .and_then(|raw| boolean(&mut v, "isActive", Some(&Value::String(raw.clone())))),
    };
    let options = v.finish_with(ListOptions::from_query(
        query.page.as_deref(),
        query.limit.as_deref(),
        query.sort.as_deref(),
        "-createdAt",
        ADMIN_SORT_FIELDS,
    ))?;

    let result = repo.list(&filter, &options).await?;
    Ok((result, options))
}

// -- Handlers --

/// Axum handler for `POST /api/admin/login`.
pub async fn login_handler(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginInput>,
) -> Result<LoginResponse, AppError> {
    let data = login(state.admin_repo.as_ref(), &state.tokens, input).await?;
    Ok(LoginResponse {
        success: true,
        message: "Login successful",
        data,
    })
}

pub async fn profile_handler(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
) -> Result<ApiResponse<AdminView>, AppError> {
    let admin = find_admin(state.admin_repo.as_ref(), admin.id).await?;
    Ok(ApiResponse::ok(
        "Profile retrieved successfully",
        AdminView::from(&admin),
    ))
}

pub async fn update_profile_handler(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    ApiJson(input): ApiJson<ProfileInput>,
) -> Result<ApiResponse<AdminView>, AppError> {
    let admin = update_profile(state.admin_repo.as_ref(), admin.id, input).await?;
    Ok(ApiResponse::ok(
        "Profile updated successfully",
        AdminView::from(&admin),
    ))
}

pub async fn change_password_handler(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    ApiJson(input): ApiJson<PasswordChangeInput>,
) -> Result<ApiResponse<()>, AppError> {
    change_password(state.admin_repo.as_ref(), admin.id, input).await?;
    Ok(ApiResponse::message("Password changed successfully"))
}

pub async fn create_admin_handler(
    State(state): State<AppState>,
    SuperAdmin(actor): SuperAdmin,
    ApiJson(input): ApiJson<CreateAdminInput>,
) -> Result<ApiResponse<AdminView>, AppError> {
    let admin = create_admin(state.admin_repo.as_ref(), input).await?;
    tracing::debug!(actor_id = %actor.id, admin_id = %admin.id, "create admin request served");
    Ok(ApiResponse::created(
        "Admin created successfully",
        AdminView::from(&admin),
    ))
}

pub async fn list_admins_handler(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    ApiQuery(query): ApiQuery<AdminListQuery>,
) -> Result<ApiResponse<Vec<AdminView>>, AppError> {
    let (result, options) = list_admins(state.admin_repo.as_ref(), &query).await?;
    let views = result.items.iter().map(AdminView::from).collect();
    Ok(
        ApiResponse::ok("Admins retrieved successfully", views).with_pagination(Pagination::new(
            options.paging.page,
            options.paging.limit,
            result.total,
        )),
    )
}

pub async fn get_admin_handler(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<String>,
) -> Result<ApiResponse<AdminView>, AppError> {
    let admin = find_admin(state.admin_repo.as_ref(), parse_id(&id)?).await?;
    Ok(ApiResponse::ok(
        "Admin retrieved successfully",
        AdminView::from(&admin),
    ))
}

pub async fn update_admin_handler(
    State(state): State<AppState>,
    actor: AuthenticatedAdmin,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<UpdateAdminInput>,
) -> Result<ApiResponse<AdminView>, AppError> {
    let admin = update_admin(state.admin_repo.as_ref(), &actor, parse_id(&id)?, input).await?;
    Ok(ApiResponse::ok(
        "Admin updated successfully",
        AdminView::from(&admin),
    ))
}

pub async fn deactivate_admin_handler(
    State(state): State<AppState>,
    SuperAdmin(actor): SuperAdmin,
    Path(id): Path<String>,
) -> Result<ApiResponse<AdminView>, AppError> {
    let admin = deactivate_admin(state.admin_repo.as_ref(), parse_id(&id)?).await?;
    tracing::debug!(actor_id = %actor.id, admin_id = %admin.id, "deactivate admin request served");
    Ok(ApiResponse::ok(
        "Admin deactivated successfully",
        AdminView::from(&admin),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryAdminRepository;
    use chrono::Duration;

    fn tokens() -> TokenService {
        TokenService::new("unit-test-secret", Duration::hours(1))
    }

    async fn seed(repo: &InMemoryAdminRepository, email: &str, role: &str) -> Admin {
        create_admin(
            repo,
            CreateAdminInput {
                name: Some("Test Admin".into()),
                email: Some(email.into()),
                password: Some("password123".into()),
                role: Some(role.into()),
            },
        )
        .await
        .unwrap()
    }

    fn actor(admin: &Admin) -> AuthenticatedAdmin {
        AuthenticatedAdmin {
            id: admin.id,
            email: admin.email.clone(),
            role: admin.role,
        }
    }

    fn login_input(email: &str, password: &str) -> LoginInput {
        LoginInput {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    #[tokio::test]
    async fn test_login_success_returns_verifiable_token() {
        let repo = InMemoryAdminRepository::new();
        let admin = seed(&repo, "boss@example.com", "super_admin").await;
        let tokens = tokens();

        let data = login(&repo, &tokens, login_input(" Boss@Example.com ", "password123"))
            .await
            .unwrap();
        assert_eq!(data.admin.id, admin.id.to_hex());
        assert_eq!(data.admin.role, AdminRole::SuperAdmin);
        assert_eq!(tokens.verify(&data.token).unwrap().id, admin.id);
    }

    #[tokio::test]
    async fn test_unknown_email_and_wrong_password_look_the_same() {
        let repo = InMemoryAdminRepository::new();
        seed(&repo, "a@example.com", "admin").await;
        let tokens = tokens();

        for input in [
            login_input("nobody@example.com", "password123"),
            login_input("a@example.com", "wrong-password"),
        ] {
            match login(&repo, &tokens, input).await {
                Err(AppError::Auth(msg)) => assert_eq!(msg, INVALID_CREDENTIALS),
                other => panic!("Expected auth error, got: {:?}", other.map(|d| d.token)),
            }
        }
    }

    #[tokio::test]
    async fn test_deactivated_account_refused_whatever_the_password() {
        let repo = InMemoryAdminRepository::new();
        let admin = seed(&repo, "gone@example.com", "admin").await;
        deactivate_admin(&repo, admin.id).await.unwrap();
        let tokens = tokens();

        for password in ["wrong-password", "password123"] {
            let err = login(&repo, &tokens, login_input("gone@example.com", password))
                .await
                .err()
                .unwrap();
            assert!(matches!(err, AppError::Forbidden(ref m) if m == ACCOUNT_DEACTIVATED));
        }
    }

    #[test]
    fn test_login_response_is_flat() {
        let body = serde_json::to_value(LoginResponse {
            success: true,
            message: "Login successful",
            data: LoginData {
                token: "abc".into(),
                admin: LoginAdmin {
                    id: "1".into(),
                    name: "Boss".into(),
                    email: "boss@example.com".into(),
                    role: AdminRole::SuperAdmin,
                },
            },
        })
        .unwrap();
        assert_eq!(body["token"], "abc");
        assert_eq!(body["admin"]["role"], "super_admin");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email_and_bad_role() {
        let repo = InMemoryAdminRepository::new();
        seed(&repo, "dup@example.com", "admin").await;

        let err = create_admin(
            &repo,
            CreateAdminInput {
                name: Some("Other".into()),
                email: Some("DUP@example.com".into()),
                password: Some("password123".into()),
                role: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m == EMAIL_EXISTS));

        let err = create_admin(
            &repo,
            CreateAdminInput {
                name: Some("X".into()),
                email: Some("bad".into()),
                password: Some("123".into()),
                role: Some("root".into()),
            },
        )
        .await
        .unwrap_err();
        match err {
            AppError::Validation(errors) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "email", "password", "role"]);
            }
            other => panic!("Expected validation error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_plain_admin_update_rules() {
        let repo = InMemoryAdminRepository::new();
        let me = seed(&repo, "me@example.com", "admin").await;
        let other = seed(&repo, "other@example.com", "admin").await;
        let me_actor = actor(&me);

        let rename = UpdateAdminInput {
            name: Some("New Name".into()),
            ..UpdateAdminInput::default()
        };
        let updated = update_admin(&repo, &me_actor, me.id, rename).await.unwrap();
        assert_eq!(updated.name, "New Name");

        let err = update_admin(&repo, &me_actor, other.id, UpdateAdminInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m == OWN_PROFILE_ONLY));

        let promote = UpdateAdminInput {
            role: Some("super_admin".into()),
            ..UpdateAdminInput::default()
        };
        let err = update_admin(&repo, &me_actor, me.id, promote).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m == ROLE_CHANGE_DENIED));
    }

    #[tokio::test]
    async fn test_super_admin_update_and_email_conflict() {
        let repo = InMemoryAdminRepository::new();
        let boss = seed(&repo, "boss@example.com", "super_admin").await;
        let target = seed(&repo, "target@example.com", "admin").await;
        let boss_actor = actor(&boss);

        let change = UpdateAdminInput {
            role: Some("super_admin".into()),
            is_active: Some(Value::Bool(false)),
            ..UpdateAdminInput::default()
        };
        let updated = update_admin(&repo, &boss_actor, target.id, change).await.unwrap();
        assert_eq!(updated.role, AdminRole::SuperAdmin);
        assert!(!updated.is_active);

        let steal = UpdateAdminInput {
            email: Some("boss@example.com".into()),
            ..UpdateAdminInput::default()
        };
        let err = update_admin(&repo, &boss_actor, target.id, steal).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m == EMAIL_IN_USE));

        let bad_flag = UpdateAdminInput {
            is_active: Some(Value::from(1)),
            ..UpdateAdminInput::default()
        };
        assert!(matches!(
            update_admin(&repo, &boss_actor, target.id, bad_flag).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_change_password() {
        let repo = InMemoryAdminRepository::new();
        let admin = seed(&repo, "pw@example.com", "admin").await;
        let tokens = tokens();

        let wrong = PasswordChangeInput {
            old_password: Some("nope-nope".into()),
            new_password: Some("newpassword".into()),
        };
        let err = change_password(&repo, admin.id, wrong).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(ref m) if m == WRONG_CURRENT_PASSWORD));

        let right = PasswordChangeInput {
            old_password: Some("password123".into()),
            new_password: Some("newpassword".into()),
        };
        change_password(&repo, admin.id, right).await.unwrap();

        assert!(login(&repo, &tokens, login_input("pw@example.com", "password123"))
            .await
            .is_err());
        assert!(login(&repo, &tokens, login_input("pw@example.com", "newpassword"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_list_filters_active_admins() {
        let repo = InMemoryAdminRepository::new();
        seed(&repo, "one@example.com", "admin").await;
        let two = seed(&repo, "two@example.com", "admin").await;
        seed(&repo, "three@example.com", "super_admin").await;
        deactivate_admin(&repo, two.id).await.unwrap();

        let query = AdminListQuery {
            role: Some("admin".into()),
            is_active: Some("true".into()),
            ..AdminListQuery::default()
        };
        let (result, _) = list_admins(&repo, &query).await.unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].email, "one@example.com");

        let bad = AdminListQuery {
            is_active: Some("maybe".into()),
            ..AdminListQuery::default()
        };
        assert!(matches!(list_admins(&repo, &bad).await, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_parse_id() {
        assert!(parse_id("507f1f77bcf86cd799439011").is_ok());
        assert!(matches!(parse_id("not-an-id"), Err(AppError::InvalidId)));
    }
}
