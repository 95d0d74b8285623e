use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use axum_extra::extract::cookie::Cookie;
use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, IntoActiveModel, QueryFilter, Set, SqlErr,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::auth::{LoginForm, RegisterCustomerForm, RegisterSellerForm, ResetPasswordRequest},
    entity::{Users, seller_profiles, users},
    error::{AppError, AppResult},
    middleware::policy::{ACCOUNT_NOT_APPROVED, Identity, safe_redirect},
    models::{AccountType, Role, User},
    response::{ActionOutcome, ApiResponse, Meta},
    state::AppState,
    validation::{
        FieldErrors, MIN_PASSWORD_LEN, check_new_password, checkbox, normalize_email, present,
        validate_email,
    },
};

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";
pub const EMAIL_TAKEN: &str = "A user already exists with this email";

/// A successful login: the session cookie and where to send the browser.
#[derive(Debug)]
pub struct LoginSuccess {
    pub cookie: Cookie<'static>,
    pub redirect_to: String,
    pub user: User,
}

/// Registration fields after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub phone_no: String,
    pub account_type: Option<AccountType>,
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Check credentials only. Approval is the caller's concern.
pub async fn verify_login(
    state: &AppState,
    email: &str,
    password: &str,
) -> AppResult<Option<users::Model>> {
    let user = Users::find()
        .filter(users::Column::Email.eq(normalize_email(email)))
        .one(&*state.orm)
        .await?;

    let Some(user) = user else {
        return Ok(None);
    };
    if !verify_password(password, &user.password_hash)? {
        return Ok(None);
    }
    Ok(Some(user))
}

pub fn validate_login(form: &LoginForm) -> Result<(String, String), FieldErrors> {
    let email = present(&form.email)
        .filter(|e| validate_email(e))
        .ok_or_else(|| FieldErrors::single("email", "Email is invalid"))?;
    let password = form
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| FieldErrors::single("password", "Password is required"))?;
    Ok((email.to_owned(), password.to_owned()))
}

pub async fn login(state: &AppState, form: LoginForm) -> AppResult<LoginSuccess> {
    let (email, password) = validate_login(&form).map_err(AppError::Validation)?;

    let Some(user) = verify_login(state, &email, &password).await? else {
        tracing::info!("login rejected: bad credentials");
        return Err(AppError::field("password", INVALID_CREDENTIALS));
    };

    if !user.approved {
        tracing::info!(user_id = %user.id, "login rejected: account not approved");
        return Err(AppError::field("password", ACCOUNT_NOT_APPROVED));
    }

    let cookie = state
        .sessions
        .create_session(user.id, user.role, checkbox(&form.remember))?;

    if let Err(err) = log_audit(
        &*state.orm,
        Some(user.id),
        "user_login",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(LoginSuccess {
        cookie,
        redirect_to: safe_redirect(form.redirect_to.as_deref()),
        user: user.into(),
    })
}

fn validate_identity_fields(
    name: &Option<String>,
    email: &Option<String>,
    password: &Option<String>,
    confirm_password: &Option<String>,
) -> Result<(String, String, String), FieldErrors> {
    let name = present(name).ok_or_else(|| FieldErrors::single("name", "Name is required"))?;
    let email = present(email)
        .filter(|e| validate_email(e))
        .ok_or_else(|| FieldErrors::single("email", "Email is invalid"))?;
    let password = check_new_password(
        &password.clone().filter(|p| !p.is_empty()),
        &confirm_password.clone().filter(|p| !p.is_empty()),
    )?;
    Ok((name.to_owned(), normalize_email(email), password))
}

fn validate_contact_fields(
    address: &Option<String>,
    phone_no: &Option<String>,
) -> Result<(String, String), FieldErrors> {
    let address =
        present(address).ok_or_else(|| FieldErrors::single("address", "Address is required"))?;
    let phone_no = present(phone_no)
        .ok_or_else(|| FieldErrors::single("phoneNo", "Phone Number is required"))?;
    Ok((address.to_owned(), phone_no.to_owned()))
}

/// Seller form rules, first failure wins.
pub fn validate_seller_registration(form: &RegisterSellerForm) -> Result<NewAccount, FieldErrors> {
    let (name, email, password) = validate_identity_fields(
        &form.name,
        &form.email,
        &form.password,
        &form.confirm_password,
    )?;
    let account_type = present(&form.account_type)
        .and_then(AccountType::parse)
        .ok_or_else(|| FieldErrors::single("type", "Type is required"))?;
    let (address, phone_no) = validate_contact_fields(&form.address, &form.phone_no)?;

    Ok(NewAccount {
        name,
        email,
        password,
        address,
        phone_no,
        account_type: Some(account_type),
    })
}

pub fn validate_customer_registration(
    form: &RegisterCustomerForm,
) -> Result<NewAccount, FieldErrors> {
    let (name, email, password) = validate_identity_fields(
        &form.name,
        &form.email,
        &form.password,
        &form.confirm_password,
    )?;
    let (address, phone_no) = validate_contact_fields(&form.address, &form.phone_no)?;

    Ok(NewAccount {
        name,
        email,
        password,
        address,
        phone_no,
        account_type: None,
    })
}

fn email_taken(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

async fn create_account(state: &AppState, account: NewAccount, role: Role) -> AppResult<users::Model> {
    let exists = Users::find()
        .filter(users::Column::Email.eq(account.email.as_str()))
        .one(&*state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::field("email", EMAIL_TAKEN));
    }

    let password_hash = hash_password(&account.password)?;
    let now = Utc::now();

    let txn = state.orm.begin().await?;
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(account.name),
        email: Set(account.email),
        password_hash: Set(password_hash),
        role: Set(role),
        approved: Set(role.approved_on_creation()),
        address: Set(account.address),
        phone_no: Set(account.phone_no),
        has_reset_password: Set(false),
        created_at: Set(now.into()),
    }
    .insert(&txn)
    .await
    .map_err(|err| {
        if email_taken(&err) {
            AppError::field("email", EMAIL_TAKEN)
        } else {
            AppError::OrmError(err)
        }
    })?;

    if let Some(account_type) = account.account_type {
        seller_profiles::ActiveModel {
            user_id: Set(user.id),
            account_type: Set(account_type),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;

    tracing::info!(user_id = %user.id, role = ?role, "account registered");
    if let Err(err) = log_audit(
        &*state.orm,
        Some(user.id),
        "user_register",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id, "role": role })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(user)
}

/// New sellers wait for an admin before they can sign in.
pub async fn register_seller(
    state: &AppState,
    form: RegisterSellerForm,
) -> AppResult<ApiResponse<ActionOutcome>> {
    let account = validate_seller_registration(&form).map_err(AppError::Validation)?;
    create_account(state, account, Role::Seller).await?;
    Ok(ApiResponse::success(
        "Seller registered",
        ActionOutcome::ok(),
        Some(Meta::empty()),
    ))
}

pub async fn register_customer(
    state: &AppState,
    form: RegisterCustomerForm,
) -> AppResult<ApiResponse<ActionOutcome>> {
    let account = validate_customer_registration(&form).map_err(AppError::Validation)?;
    create_account(state, account, Role::Customer).await?;
    Ok(ApiResponse::success(
        "Customer registered",
        ActionOutcome::ok(),
        Some(Meta::empty()),
    ))
}

pub async fn reset_password(
    state: &AppState,
    actor: &Identity,
    payload: ResetPasswordRequest,
) -> AppResult<ApiResponse<ActionOutcome>> {
    if actor.user_id != payload.user_id && actor.role != Role::Admin {
        return Err(AppError::Forbidden(
            "cannot reset another user's password".into(),
        ));
    }

    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::field("password", "Password is required"))?;
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::field("password", "Password is too short"));
    }

    let user = Users::find_by_id(payload.user_id)
        .one(&*state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active = user.into_active_model();
    active.password_hash = Set(hash_password(&password)?);
    active.has_reset_password = Set(true);
    let user = active.update(&*state.orm).await?;

    tracing::info!(user_id = %user.id, actor = %actor.user_id, "password reset");
    if let Err(err) = log_audit(
        &*state.orm,
        Some(actor.user_id),
        "password_reset",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Password updated",
        ActionOutcome::ok(),
        Some(Meta::empty()),
    ))
}

pub async fn current_user(state: &AppState, identity: &Identity) -> AppResult<ApiResponse<User>> {
    let user = Users::find_by_id(identity.user_id)
        .one(&*state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Me", user.into(), Some(Meta::empty())))
}
