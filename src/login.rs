use std::collections::HashMap;
use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::app::{AppState, json_error};
use crate::config::CONFIG;
use crate::mailer::{Mailer, generate_reset_code};

/// Access level of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// A registered application user, as stored in `users.json`.
///
/// Contains authentication details and password reset state. Never
/// serialize this directly into an API response; use [`UserView`].
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    /// Unique id, also the key in the user map.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Email address (login identifier, used for password recovery).
    pub email: String,

    /// Argon2 hash of the user's password.
    pub password_hash: String,

    pub role: Role,

    /// Deactivated accounts fail login and token verification.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    /// Password reset code (if a reset has been requested).
    pub reset_code: Option<String>,

    /// Expiration time for the reset code.
    pub reset_code_expires: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(name: &str, email: &str, password_hash: String) -> Self {
        User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            role: Role::User,
            is_active: true,
            created_at: Utc::now(),
            reset_code: None,
            reset_code_expires: None,
        }
    }
}

/// User shape safe to return from the API: no hash, no reset state.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        UserView {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// Authenticated caller context, inserted into request extensions by
/// [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

/// Bearer token claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

const TOKEN_DURATION_SECS: i64 = 24 * 60 * 60; // 24 hours
const RESET_CODE_DURATION_SECS: i64 = 3600; // 1 hour

/// Issue a signed access token for a user.
///
/// # Errors
/// * Returns an error if signing fails
pub fn issue_token(user: &User) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        role: user.role,
        iat: now,
        exp: now + TOKEN_DURATION_SECS,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(CONFIG.jwt_secret.as_bytes()),
    )
}

/// Verify a token's signature and expiry, returning its claims.
///
/// # Errors
/// * Returns an error for a bad signature, malformed token, or an
///   expired `exp`
pub fn verify_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(CONFIG.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

/// Hash a password using Argon2
///
/// Creates a cryptographically secure hash of a password using Argon2id.
///
/// # Errors
/// * Returns an error if the password hashing fails
fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    match argon2.hash_password(password.as_bytes(), &salt) {
        Ok(hash) => Ok(hash.to_string()),
        Err(_) => Err("Password hashing failed".to_string()),
    }
}

/// Verify a password against a stored hash
///
/// # Errors
/// * Returns an error if the hash is in an invalid format
fn verify_password(password: &str, hash: &str) -> Result<bool, String> {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(hash) => hash,
        Err(_) => return Err("Invalid password hash format".to_string()),
    };

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(_) => Ok(false), // Password didn't match
    }
}

fn find_by_email<'a>(users: &'a HashMap<String, User>, email: &str) -> Option<&'a User> {
    users.values().find(|u| u.email == email)
}

// Request bodies

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetConfirm {
    pub email: String,
    pub reset_code: String,
    pub new_password: String,
}

// Handlers

/// Handle user registration
///
/// Creates a new account with the `user` role. Emails are unique across
/// the user map.
pub async fn handle_register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Response {
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "Name, email and password cannot be empty",
        );
    }

    let mut users = match state.store.load_users() {
        Ok(users) => users,
        Err(e) => {
            log::error!("failed to load users: {}", e);
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
        }
    };

    if find_by_email(&users, &req.email).is_some() {
        return json_error(StatusCode::BAD_REQUEST, "User already exists");
    }

    let password_hash = match hash_password(&req.password) {
        Ok(hash) => hash,
        Err(_) => return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Password hashing failed"),
    };

    let user = User::new(req.name.trim(), req.email.trim(), password_hash);
    let user_id = user.id.clone();
    users.insert(user_id.clone(), user);

    if let Err(e) = state.store.save_users(&users) {
        log::error!("failed to save users: {}", e);
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save user");
    }

    log::info!("registered user {}", user_id);
    (
        StatusCode::CREATED,
        Json(json!({ "message": "User registered", "user_id": user_id })),
    )
        .into_response()
}

/// Handle user login
///
/// Validates credentials and returns a bearer token plus a trimmed
/// user object. Deactivated accounts are rejected the same way bad
/// credentials are, with a distinct message.
pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Response {
    let users = match state.store.load_users() {
        Ok(users) => users,
        Err(e) => {
            log::error!("failed to load users: {}", e);
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
        }
    };

    let Some(user) = find_by_email(&users, &req.email) else {
        return json_error(StatusCode::UNAUTHORIZED, "Invalid credentials");
    };

    match verify_password(&req.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => return json_error(StatusCode::UNAUTHORIZED, "Invalid credentials"),
        Err(_) => return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Authentication error"),
    }

    if !user.is_active {
        return json_error(StatusCode::UNAUTHORIZED, "Account is deactivated");
    }

    let token = match issue_token(user) {
        Ok(token) => token,
        Err(e) => {
            log::error!("failed to issue token: {}", e);
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to issue token");
        }
    };

    log::info!("user {} logged in", user.id);
    Json(json!({
        "token": token,
        "user": { "id": user.id, "email": user.email, "role": user.role },
    }))
    .into_response()
}

/// Handle password reset requests
///
/// Generates an 8-character reset code with a one hour expiry and
/// emails it to the account's address.
pub async fn handle_forgot_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PasswordResetRequest>,
) -> Response {
    let mut users = match state.store.load_users() {
        Ok(users) => users,
        Err(_) => return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error"),
    };

    let Some(user) = users.values_mut().find(|u| u.email == req.email) else {
        return json_error(StatusCode::NOT_FOUND, "Email not found");
    };

    let reset_code = generate_reset_code();
    user.reset_code = Some(reset_code.clone());
    user.reset_code_expires =
        Some(Utc::now() + Duration::seconds(RESET_CODE_DURATION_SECS));
    let to_email = user.email.clone();

    if state.store.save_users(&users).is_err() {
        return json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to generate reset code",
        );
    }

    match Mailer::new() {
        Ok(mailer) => {
            if let Err(e) = mailer.send_password_reset(&to_email, &reset_code) {
                log::error!("failed to send reset email: {}", e);
                return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to send email");
            }
        }
        Err(e) => {
            log::error!("failed to initialize mailer: {}", e);
            return json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to initialize mailer",
            );
        }
    }

    Json(json!({ "message": "Reset code sent" })).into_response()
}

/// Handle password reset confirmation
///
/// Verifies the emailed code and its expiry, then replaces the stored
/// password hash and clears the reset state.
pub async fn handle_reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PasswordResetConfirm>,
) -> Response {
    let mut users = match state.store.load_users() {
        Ok(users) => users,
        Err(_) => return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error"),
    };

    let Some(user) = users.values_mut().find(|u| u.email == req.email) else {
        return json_error(StatusCode::NOT_FOUND, "Email not found");
    };

    let Some(stored_code) = &user.reset_code else {
        return json_error(StatusCode::BAD_REQUEST, "No reset code found");
    };

    let Some(expires) = user.reset_code_expires else {
        return json_error(StatusCode::BAD_REQUEST, "Reset code expired");
    };

    if Utc::now() > expires {
        return json_error(StatusCode::BAD_REQUEST, "Reset code expired");
    }

    if stored_code != &req.reset_code {
        return json_error(StatusCode::BAD_REQUEST, "Invalid reset code");
    }

    match hash_password(&req.new_password) {
        Ok(hash) => {
            user.password_hash = hash;
            user.reset_code = None;
            user.reset_code_expires = None;

            if state.store.save_users(&users).is_err() {
                return json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to save new password",
                );
            }

            Json(json!({ "message": "Password reset successful" })).into_response()
        }
        Err(_) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password"),
    }
}

/// Authentication middleware
///
/// Verifies the `Authorization: Bearer` token, checks the account is
/// still present and active, and inserts an [`AuthUser`] into request
/// extensions for downstream handlers.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let Some(token) = token else {
        return json_error(StatusCode::UNAUTHORIZED, "Missing authorization token");
    };

    let claims = match verify_token(token) {
        Ok(claims) => claims,
        Err(_) => return json_error(StatusCode::UNAUTHORIZED, "Invalid or expired token"),
    };

    // The token must still map onto a live account.
    let users = match state.store.load_users() {
        Ok(users) => users,
        Err(_) => return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Authentication error"),
    };

    let user = match users.get(&claims.sub) {
        Some(user) if user.is_active => user,
        Some(_) => return json_error(StatusCode::UNAUTHORIZED, "Account is deactivated"),
        None => return json_error(StatusCode::UNAUTHORIZED, "User not found"),
    };

    request.extensions_mut().insert(AuthUser {
        id: user.id.clone(),
        email: user.email.clone(),
        role: user.role,
    });

    next.run(request).await
}

/// Role middleware for admin routes; layered after [`require_auth`].
pub async fn require_admin(request: Request, next: Next) -> Response {
    match request.extensions().get::<AuthUser>() {
        Some(user) if user.role == Role::Admin => next.run(request).await,
        Some(_) => json_error(StatusCode::FORBIDDEN, "Access denied: insufficient role"),
        None => json_error(StatusCode::UNAUTHORIZED, "Missing authentication context"),
    }
}
